//! JPEG2000 (JP2) box inspection for `JPXDecode` images.

use byteorder::{BigEndian, ByteOrder};

/// Facts read from a JP2 header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JpxInfo {
    /// Number of components from `ihdr`
    pub components: u16,
    /// Bits per component from `ihdr` (1-based, sign bit stripped)
    pub bits_per_component: u8,
    /// `APPROX` values of every `colr` box
    pub colr_approx: Vec<u8>,
    /// Enumerated color space of the first enumerated `colr` box
    pub enumerated_color_space: Option<u32>,
}

struct BoxHeader<'a> {
    kind: &'a [u8],
    body: &'a [u8],
    total: usize,
}

fn read_box(data: &[u8]) -> Option<BoxHeader<'_>> {
    if data.len() < 8 {
        return None;
    }
    let len = BigEndian::read_u32(&data[0..4]) as usize;
    let kind = &data[4..8];
    let (header_len, total) = match len {
        0 => (8, data.len()),
        1 => {
            if data.len() < 16 {
                return None;
            }
            (16, usize::try_from(BigEndian::read_u64(&data[8..16])).ok()?)
        },
        n => (8, n),
    };
    if total < header_len || total > data.len() {
        return None;
    }
    Some(BoxHeader {
        kind,
        body: &data[header_len..total],
        total,
    })
}

fn boxes(mut data: &[u8]) -> impl Iterator<Item = BoxHeader<'_>> {
    std::iter::from_fn(move || {
        let b = read_box(data)?;
        data = &data[b.total..];
        Some(b)
    })
}

/// Read the image header of a JP2 file.
///
/// Raw codestreams (no JP2 wrapper) carry no `jp2h` box and yield `Ok(None)`.
pub fn inspect(data: &[u8]) -> std::result::Result<Option<JpxInfo>, String> {
    if data.starts_with(&[0xFF, 0x4F, 0xFF, 0x51]) {
        return Ok(None);
    }
    let header = boxes(data)
        .find(|b| b.kind == b"jp2h")
        .ok_or_else(|| "no JP2 header box".to_string())?;

    let mut info = JpxInfo::default();
    let mut seen_ihdr = false;
    for b in boxes(header.body) {
        match b.kind {
            b"ihdr" => {
                if b.body.len() < 14 {
                    return Err("truncated ihdr box".to_string());
                }
                info.components = BigEndian::read_u16(&b.body[8..10]);
                info.bits_per_component = (b.body[10] & 0x7F) + 1;
                seen_ihdr = true;
            },
            b"colr" => {
                if b.body.len() < 3 {
                    return Err("truncated colr box".to_string());
                }
                info.colr_approx.push(b.body[2]);
                if b.body[0] == 1 && b.body.len() >= 7 && info.enumerated_color_space.is_none() {
                    info.enumerated_color_space = Some(BigEndian::read_u32(&b.body[3..7]));
                }
            },
            _ => {},
        }
    }
    if !seen_ihdr {
        return Err("no ihdr box".to_string());
    }
    Ok(Some(info))
}

/// Validate the JP2 constraints that PDF/A places on `JPXDecode` data.
pub fn validate(info: &JpxInfo) -> std::result::Result<(), String> {
    if !matches!(info.components, 1 | 3 | 4) {
        return Err(format!("{} color channels, expected 1, 3 or 4", info.components));
    }
    if !(1..=38).contains(&info.bits_per_component) {
        return Err(format!("bit depth {} outside 1 to 38", info.bits_per_component));
    }
    if info.colr_approx.len() > 1 {
        let exact = info.colr_approx.iter().filter(|&&a| a == 1).count();
        if exact != 1 {
            return Err("exactly one colr box shall have APPROX equal to 1".to_string());
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn test_jp2(components: u16, bpc: u8, approx: &[u8]) -> Vec<u8> {
    fn push_box(out: &mut Vec<u8>, kind: &[u8; 4], body: &[u8]) {
        let mut len = [0u8; 4];
        BigEndian::write_u32(&mut len, (body.len() + 8) as u32);
        out.extend_from_slice(&len);
        out.extend_from_slice(kind);
        out.extend_from_slice(body);
    }
    let mut ihdr = vec![0u8; 14];
    BigEndian::write_u16(&mut ihdr[8..10], components);
    ihdr[10] = bpc - 1;
    let mut header = Vec::new();
    push_box(&mut header, b"ihdr", &ihdr);
    for &a in approx {
        push_box(&mut header, b"colr", &[1, 0, a, 0, 0, 0, 16]);
    }
    let mut file = Vec::new();
    push_box(&mut file, b"jP  ", &[0x0D, 0x0A, 0x87, 0x0A]);
    push_box(&mut file, b"jp2h", &header);
    file
}
