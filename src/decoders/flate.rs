//! FlateDecode (zlib/deflate) implementation.

use crate::decoders::StreamDecoder;
use crate::error::{Error, Result};
use flate2::read::{DeflateDecoder, ZlibDecoder};
use std::io::Read;

/// FlateDecode filter implementation.
///
/// Tries a zlib-wrapped stream first and falls back to raw deflate, which some
/// producers emit without the two-byte header.
pub struct FlateDecoder;

impl StreamDecoder for FlateDecoder {
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        match ZlibDecoder::new(input).read_to_end(&mut output) {
            Ok(_) => Ok(output),
            Err(e) => {
                if !output.is_empty() {
                    log::warn!(
                        "FlateDecode partial recovery: extracted {} bytes before corruption: {}",
                        output.len(),
                        e
                    );
                    return Ok(output);
                }

                log::debug!("Zlib decode failed, trying raw deflate");
                output.clear();
                DeflateDecoder::new(input)
                    .read_to_end(&mut output)
                    .map_err(|raw_err| Error::Decode(format!("FlateDecode: {} / {}", e, raw_err)))?;
                Ok(output)
            },
        }
    }

    fn name(&self) -> &str {
        "FlateDecode"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_flate_decode_zlib() {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"0 0 1 rg").unwrap();
        let compressed = encoder.finish().unwrap();

        let output = FlateDecoder.decode(&compressed).unwrap();
        assert_eq!(output, b"0 0 1 rg");
    }

    #[test]
    fn test_flate_decode_garbage() {
        assert!(FlateDecoder.decode(b"not deflate data at all").is_err());
    }
}
