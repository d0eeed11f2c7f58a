//! ICC profile header inspection.
//!
//! Only the 128-byte header is read; tag data is never interpreted.

use byteorder::{BigEndian, ByteOrder};

/// Size of the fixed ICC header.
pub const ICC_HEADER_LEN: usize = 128;

/// Fields of an ICC profile header relevant to PDF/A.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IccHeader {
    /// Declared profile size
    pub size: u32,
    /// Major version byte
    pub major_version: u8,
    /// Minor version nibble
    pub minor_version: u8,
    /// Profile/device class (`prtr`, `mntr`, `scnr`, ...)
    pub device_class: [u8; 4],
    /// Data color space (`RGB `, `CMYK`, `GRAY`, ...)
    pub color_space: [u8; 4],
}

impl IccHeader {
    /// Parse the header, or explain why it is not an ICC profile.
    pub fn parse(data: &[u8]) -> std::result::Result<Self, String> {
        if data.len() < ICC_HEADER_LEN {
            return Err(format!("profile is {} bytes, shorter than the header", data.len()));
        }
        if &data[36..40] != b"acsp" {
            return Err("missing 'acsp' signature".to_string());
        }
        let mut device_class = [0u8; 4];
        device_class.copy_from_slice(&data[12..16]);
        let mut color_space = [0u8; 4];
        color_space.copy_from_slice(&data[16..20]);
        Ok(Self {
            size: BigEndian::read_u32(&data[0..4]),
            major_version: data[8],
            minor_version: data[9] >> 4,
            device_class,
            color_space,
        })
    }

    /// Number of color components implied by the data color space.
    pub fn components(&self) -> Option<u32> {
        match &self.color_space {
            b"GRAY" => Some(1),
            b"RGB " | b"Lab " | b"XYZ " => Some(3),
            b"CMYK" => Some(4),
            _ => None,
        }
    }

    /// Whether the profile may serve as an output intent.
    pub fn is_output_class(&self) -> bool {
        matches!(&self.device_class, b"prtr" | b"mntr")
    }

    /// Printable color space signature.
    pub fn color_space_name(&self) -> String {
        String::from_utf8_lossy(&self.color_space).trim_end().to_string()
    }
}

#[cfg(test)]
pub(crate) fn test_profile(color_space: &[u8; 4], major: u8) -> Vec<u8> {
    let mut data = vec![0u8; ICC_HEADER_LEN];
    BigEndian::write_u32(&mut data[0..4], ICC_HEADER_LEN as u32);
    data[8] = major;
    data[12..16].copy_from_slice(b"prtr");
    data[16..20].copy_from_slice(color_space);
    data[36..40].copy_from_slice(b"acsp");
    data
}
