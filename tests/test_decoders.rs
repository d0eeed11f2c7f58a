//! Integration tests for stream decoders.
//!
//! Covers the decoders the checker reads content with, filter pipelines,
//! and decoding through `Object::decode_stream_data()`.

mod common;

use bytes::Bytes;
use common::DocumentBuilder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use pdfa_oxide::compliance::{ErrorCode, PdfALevel, PdfAValidator, WarningCode};
use pdfa_oxide::decoders::{decode_stream, AsciiHexDecoder, FlateDecoder, StreamDecoder};
use pdfa_oxide::object::{Dictionary, Object};
use pdfa_oxide::Error;
use std::io::Write;

fn compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn to_hex(data: &[u8]) -> String {
    data.iter().map(|b| format!("{:02X}", b)).collect()
}

#[test]
fn test_flate_decoder_integration() {
    let original = b"This is a test of FlateDecode compression in a PDF stream.";
    let decoded = FlateDecoder.decode(&compress(original)).unwrap();
    assert_eq!(decoded, original);
}

#[test]
fn test_ascii_hex_decoder_integration() {
    let test_cases = vec![
        (b"48656C6C6F20576F726C64".as_slice(), b"Hello World".as_slice()),
        (b"54657374".as_slice(), b"Test".as_slice()),
        (b"414243444546".as_slice(), b"ABCDEF".as_slice()),
    ];

    for (input, expected) in test_cases {
        let decoded = AsciiHexDecoder.decode(input).unwrap();
        assert_eq!(decoded, expected);
    }
}

#[test]
fn test_filter_pipeline_multiple() {
    let original = b"Hello, World!";
    let hex_encoded = to_hex(&compress(original));

    let filters = vec!["ASCIIHexDecode".to_string(), "FlateDecode".to_string()];
    let decoded = decode_stream(hex_encoded.as_bytes(), &filters).unwrap();
    assert_eq!(decoded, original);
}

#[test]
fn test_filter_pipeline_unsupported() {
    let filters = vec!["LZWDecode".to_string()];
    let result = decode_stream(b"test", &filters);
    assert!(matches!(result, Err(Error::UnsupportedFilter(name)) if name == "LZWDecode"));
}

#[test]
fn test_object_stream_decode_with_multiple_filters() {
    let original = b"Test data";
    let hex_encoded = to_hex(&compress(original));

    let mut dict = Dictionary::new();
    dict.insert(
        "Filter".to_string(),
        Object::Array(vec![Object::name("ASCIIHexDecode"), Object::name("FlateDecode")]),
    );
    let stream = Object::Stream {
        dict,
        data: Bytes::from(hex_encoded.into_bytes()),
    };

    assert_eq!(stream.decode_stream_data().unwrap(), original);
    assert!(Object::Integer(42).decode_stream_data().is_err());
}

#[test]
fn test_decoder_names() {
    assert_eq!(FlateDecoder.name(), "FlateDecode");
    assert_eq!(AsciiHexDecoder.name(), "ASCIIHexDecode");
}

#[test]
fn test_compressed_content_is_checked() {
    let stream = Object::stream(
        [("Filter".to_string(), Object::name("FlateDecode"))].into_iter().collect(),
        compress(b"1 0 0 rg 0 0 10 10 re f"),
    );
    let doc = DocumentBuilder::pdf_a1b().object(common::CONTENT, stream).build();

    let result = PdfAValidator::new().validate(&doc, PdfALevel::A1b).unwrap();
    assert_eq!(result.error.map(|e| e.code), Some(ErrorCode::DeviceRgbWithoutProfile));
}

#[test]
fn test_content_with_unsupported_filter_is_skipped_with_warning() {
    let stream = Object::stream(
        [("Filter".to_string(), Object::name("RunLengthDecode"))].into_iter().collect(),
        b"\x80".to_vec(),
    );
    let doc = DocumentBuilder::pdf_a2b()
        .output_intent(b"RGB ", 3)
        .object(common::CONTENT, stream)
        .build();

    let result = PdfAValidator::new().validate(&doc, PdfALevel::A2b).unwrap();
    assert!(result.is_compliant, "unexpected violation: {:?}", result.error);
    assert!(result.warnings.iter().any(|w| w.code == WarningCode::UndecodableStream));
}
