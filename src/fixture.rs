//! JSON document fixtures.
//!
//! A fixture describes a [`PdfDocument`] as JSON so documents can be written
//! by hand for tests and fed to the `check_pdfa` tool:
//!
//! ```json
//! {
//!   "version": "1.7",
//!   "trailer": { "Root": {"ref": [1, 0]}, "ID": [{"hex": "00ff"}, {"hex": "00ff"}] },
//!   "objects": {
//!     "1 0": { "Type": "/Catalog", "Pages": {"ref": [2, 0]} },
//!     "4 0": { "stream": { "Length": 9 }, "data": "0 0 1 rg " }
//!   },
//!   "flushed": [[4, 0]]
//! }
//! ```
//!
//! Values map as follows: `null`, booleans and numbers are themselves
//! (integers stay integers); a string starting with `/` is a name and any
//! other string a PDF string; `{"ref": [n, g]}` is an indirect reference;
//! `{"hex": "..."}` is a binary string; `{"stream": {...}, "data": "..."}`
//! (or `"data_hex"`) is a stream; any other object is a dictionary.

use crate::decoders::{AsciiHexDecoder, StreamDecoder};
use crate::document::PdfDocument;
use crate::error::{Error, Result};
use crate::object::{Dictionary, Object, ObjectRef};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Top-level layout of a fixture file.
#[derive(Debug, Deserialize)]
struct FixtureFile {
    #[serde(default = "default_version")]
    version: String,
    #[serde(default)]
    trailer: Map<String, Value>,
    #[serde(default)]
    objects: BTreeMap<String, Value>,
    #[serde(default)]
    flushed: Vec<(u32, u16)>,
}

fn default_version() -> String {
    "1.7".to_string()
}

fn parse_version(version: &str) -> Result<(u8, u8)> {
    let (major, minor) = version
        .split_once('.')
        .ok_or_else(|| Error::Fixture(format!("version {} is not of the form major.minor", version)))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<u8>()
            .map_err(|_| Error::Fixture(format!("invalid version number {}", version)))
    };
    Ok((parse(major)?, parse(minor)?))
}

/// `"12 0"` to an object reference.
fn parse_object_key(key: &str) -> Result<ObjectRef> {
    let mut parts = key.split_whitespace();
    let id = parts.next().and_then(|p| p.parse::<u32>().ok());
    let gen = parts.next().map_or(Some(0), |p| p.parse::<u16>().ok());
    match (id, gen, parts.next()) {
        (Some(id), Some(gen), None) => Ok(ObjectRef::new(id, gen)),
        _ => Err(Error::Fixture(format!("invalid object key '{}'", key))),
    }
}

fn decode_hex(text: &str) -> Result<Vec<u8>> {
    AsciiHexDecoder.decode(text.as_bytes())
}

fn dictionary_from_json(map: &Map<String, Value>) -> Result<Dictionary> {
    map.iter()
        .map(|(key, value)| Ok((key.clone(), object_from_json(value)?)))
        .collect()
}

/// Convert one JSON value to a PDF object.
pub fn object_from_json(value: &Value) -> Result<Object> {
    Ok(match value {
        Value::Null => Object::Null,
        Value::Bool(b) => Object::Boolean(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Object::Integer(i),
            None => Object::Real(n.as_f64().unwrap_or(0.0)),
        },
        Value::String(s) => match s.strip_prefix('/') {
            Some(name) => Object::Name(name.to_string()),
            None => Object::String(s.as_bytes().to_vec()),
        },
        Value::Array(items) => Object::Array(items.iter().map(object_from_json).collect::<Result<_>>()?),
        Value::Object(map) => {
            if let Some(reference) = map.get("ref") {
                let pair = reference
                    .as_array()
                    .filter(|pair| pair.len() == 2)
                    .and_then(|pair| Some((pair[0].as_u64()?, pair[1].as_u64()?)));
                return match pair {
                    Some((id, gen)) => Ok(Object::Reference(ObjectRef::new(
                        u32::try_from(id).map_err(|_| Error::Fixture(format!("object number {} too large", id)))?,
                        u16::try_from(gen).map_err(|_| Error::Fixture(format!("generation {} too large", gen)))?,
                    ))),
                    None => Err(Error::Fixture(format!("invalid reference {}", reference))),
                };
            }
            if let (Some(Value::String(hex)), 1) = (map.get("hex"), map.len()) {
                return Ok(Object::String(decode_hex(hex)?));
            }
            if let Some(stream) = map.get("stream") {
                let dict = match stream {
                    Value::Object(entries) => dictionary_from_json(entries)?,
                    other => return Err(Error::Fixture(format!("stream dictionary must be an object, found {}", other))),
                };
                let data = match (map.get("data"), map.get("data_hex")) {
                    (Some(Value::String(text)), _) => text.as_bytes().to_vec(),
                    (None, Some(Value::String(hex))) => decode_hex(hex)?,
                    (None, None) => Vec::new(),
                    _ => return Err(Error::Fixture("stream data must be a string".to_string())),
                };
                return Ok(Object::stream(dict, data));
            }
            Object::Dictionary(dictionary_from_json(map)?)
        },
    })
}

/// Build a document from fixture JSON text.
pub fn document_from_json(text: &str) -> Result<PdfDocument> {
    let file: FixtureFile = serde_json::from_str(text)?;
    let mut doc = PdfDocument::new(parse_version(&file.version)?);

    for (key, value) in &file.objects {
        doc.set_object(parse_object_key(key)?, object_from_json(value)?);
    }
    *doc.trailer_mut() = dictionary_from_json(&file.trailer)?;
    for (id, gen) in file.flushed {
        doc.mark_flushed(ObjectRef::new(id, gen));
    }
    log::debug!("Loaded fixture with {} objects", doc.object_count());
    Ok(doc)
}

/// Load a fixture file.
pub fn load_document(path: impl AsRef<Path>) -> Result<PdfDocument> {
    let text = std::fs::read_to_string(path)?;
    document_from_json(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_mapping() {
        assert_eq!(object_from_json(&json!(null)).unwrap(), Object::Null);
        assert_eq!(object_from_json(&json!(7)).unwrap(), Object::Integer(7));
        assert_eq!(object_from_json(&json!(0.5)).unwrap(), Object::Real(0.5));
        assert_eq!(object_from_json(&json!("/Font")).unwrap(), Object::name("Font"));
        assert_eq!(object_from_json(&json!("text")).unwrap(), Object::string("text"));
        assert_eq!(object_from_json(&json!({"hex": "00ff"})).unwrap(), Object::String(vec![0x00, 0xff]));
        assert_eq!(
            object_from_json(&json!({"ref": [3, 0]})).unwrap(),
            Object::Reference(ObjectRef::new(3, 0))
        );
    }

    #[test]
    fn test_stream_mapping() {
        let obj = object_from_json(&json!({"stream": {"Length": 3}, "data_hex": "414243"})).unwrap();
        assert_eq!(obj.stream_data(), Some(&b"ABC"[..]));
        assert_eq!(obj.as_dict().and_then(|d| d.get("Length")), Some(&Object::Integer(3)));
    }

    #[test]
    fn test_invalid_reference() {
        let err = object_from_json(&json!({"ref": [3]})).unwrap_err();
        assert!(matches!(err, Error::Fixture(_)));
    }

    #[test]
    fn test_document_from_json() {
        let doc = document_from_json(
            r#"{
                "version": "1.4",
                "trailer": {"Root": {"ref": [1, 0]}},
                "objects": {"1 0": {"Type": "/Catalog"}, "5 0": {"stream": {}, "data": "q Q"}},
                "flushed": [[5, 0]]
            }"#,
        )
        .unwrap();
        assert_eq!(doc.version(), (1, 4));
        assert_eq!(doc.object_count(), 2);
        assert!(doc.is_flushed(ObjectRef::new(5, 0)));
        assert!(doc.catalog().is_ok());
    }

    #[test]
    fn test_bad_object_key() {
        assert!(matches!(
            document_from_json(r#"{"objects": {"one": null}}"#),
            Err(Error::Fixture(_))
        ));
        assert!(matches!(document_from_json("not json"), Err(Error::Json(_))));
    }
}
