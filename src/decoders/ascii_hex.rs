//! ASCIIHexDecode implementation.
//!
//! Whitespace is ignored, `>` terminates the data, and an odd final digit is
//! padded with an implicit '0'.

use crate::decoders::StreamDecoder;
use crate::error::{Error, Result};

/// ASCIIHexDecode filter implementation.
pub struct AsciiHexDecoder;

impl StreamDecoder for AsciiHexDecoder {
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        let digits: Vec<u8> = input
            .iter()
            .copied()
            .take_while(|&c| c != b'>')
            .filter(|c| !c.is_ascii_whitespace())
            .collect();

        digits
            .chunks(2)
            .map(|pair| {
                let high = hex_value(pair[0])?;
                let low = pair.get(1).map_or(Ok(0), |&c| hex_value(c))?;
                Ok((high << 4) | low)
            })
            .collect()
    }

    fn name(&self) -> &str {
        "ASCIIHexDecode"
    }
}

fn hex_value(digit: u8) -> Result<u8> {
    (digit as char)
        .to_digit(16)
        .map(|v| v as u8)
        .ok_or_else(|| Error::Decode(format!("ASCIIHexDecode: invalid hex digit '{}'", digit as char)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_hex_decode_with_whitespace() {
        let output = AsciiHexDecoder.decode(b"48 65 6C\n6C 6F>").unwrap();
        assert_eq!(output, b"Hello");
    }

    #[test]
    fn test_ascii_hex_decode_odd_length() {
        let output = AsciiHexDecoder.decode(b"486").unwrap();
        assert_eq!(output, vec![0x48, 0x60]);
    }

    #[test]
    fn test_ascii_hex_decode_invalid_digit() {
        assert!(AsciiHexDecoder.decode(b"4G").is_err());
    }
}
