//! Stream decoders for the filters the checker needs to read content.
//!
//! Content streams, form XObjects and XMP packets are decoded before they are
//! inspected. Only the general-purpose filters are implemented:
//! - FlateDecode (zlib/deflate)
//! - ASCIIHexDecode (hexadecimal encoding)
//!
//! Image codecs (DCT, JPX, CCITT, JBIG2) are never decoded; the checker only
//! looks at their headers.

use crate::error::{Error, Result};

mod ascii_hex;
mod flate;

pub use ascii_hex::AsciiHexDecoder;
pub use flate::FlateDecoder;

/// Trait for PDF stream decoders.
pub trait StreamDecoder {
    /// Decode the input data.
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>>;

    /// Get the name of this decoder (e.g., "FlateDecode").
    fn name(&self) -> &str;
}

/// Decode stream data using a filter pipeline.
///
/// Filters are applied in the order they are listed in the stream dictionary.
pub fn decode_stream(data: &[u8], filters: &[String]) -> Result<Vec<u8>> {
    let mut current = data.to_vec();

    for filter_name in filters {
        let decoder: Box<dyn StreamDecoder> = match filter_name.as_str() {
            "FlateDecode" | "Fl" => Box::new(FlateDecoder),
            "ASCIIHexDecode" | "AHx" => Box::new(AsciiHexDecoder),
            _ => return Err(Error::UnsupportedFilter(filter_name.clone())),
        };
        log::trace!("Applying {} to {} bytes", decoder.name(), current.len());
        current = decoder.decode(&current)?;
    }

    Ok(current)
}
