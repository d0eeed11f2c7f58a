//! Content stream parser.
//!
//! Content streams use postfix notation: operands come before their operator.
//!
//! ```text
//! BT
//!   /F1 12 Tf
//!   100 700 Td
//!   (Hello, World!) Tj
//! ET
//! ```
//!
//! Unlike a rendering parser, this one never skips bytes it does not
//! understand. Malformed input (an unterminated array or dictionary, operands
//! left over at the end of the stream, an inline image without `EI`) is
//! reported as [`Error::ParseError`] with the byte offset of the problem.

use crate::content::operators::ContentOperation;
use crate::error::{Error, Result};
use crate::lexer::{is_delimiter, is_whitespace, skip_ws, token, Token};
use crate::object::{Dictionary, Object};
use crate::parser::{object_from_token, parse_object};

/// Parse a decoded content stream into its operations.
///
/// # Examples
///
/// ```
/// use pdfa_oxide::content::parse_content_stream;
///
/// let ops = parse_content_stream(b"BT /F1 12 Tf 100 700 Td (Hello) Tj ET").unwrap();
/// assert_eq!(ops.len(), 5);
/// assert_eq!(ops[1].operator(), "Tf");
/// ```
///
/// # Errors
///
/// Returns [`Error::ParseError`] when the token stream is malformed.
pub fn parse_content_stream(data: &[u8]) -> Result<Vec<ContentOperation>> {
    let mut operations = Vec::new();
    let mut operands = Vec::new();
    let mut input = data;

    loop {
        input = skip_ws(input);
        if input.is_empty() {
            break;
        }
        let offset = offset_of(data, input);

        let (rest, tok) = token(input).map_err(|_| parse_error(offset, "unrecognised token"))?;
        match tok {
            Token::Keyword("BI") => {
                if !operands.is_empty() {
                    return Err(parse_error(offset, "operands before inline image"));
                }
                let (rest, dict, image_data) = parse_inline_image(data, rest)?;
                operations.push(ContentOperation::InlineImage {
                    dict,
                    data: image_data,
                    offset,
                });
                input = rest;
            },
            Token::Keyword(word) if !matches!(word, "true" | "false" | "null") => {
                operations.push(ContentOperation::Operator {
                    name: word.to_string(),
                    operands: std::mem::take(&mut operands),
                    offset,
                });
                input = rest;
            },
            Token::ArrayEnd | Token::DictEnd => {
                return Err(parse_error(offset, "unbalanced closing delimiter"));
            },
            other => {
                let what = match other {
                    Token::ArrayStart => "unterminated array",
                    Token::DictStart => "unterminated dictionary",
                    _ => "malformed operand",
                };
                let (rest, obj) =
                    object_from_token(other, rest).map_err(|e| nom_error(data, offset, what, e))?;
                operands.push(obj);
                input = rest;
            },
        }
    }

    if !operands.is_empty() {
        return Err(parse_error(data.len(), "operands without an operator at end of stream"));
    }

    Ok(operations)
}

/// Parse `<key value>* ID <data> EI` following a `BI` operator.
fn parse_inline_image<'a>(data: &'a [u8], mut input: &'a [u8]) -> Result<(&'a [u8], Dictionary, Vec<u8>)> {
    let mut dict = Dictionary::new();

    loop {
        input = skip_ws(input);
        let offset = offset_of(data, input);
        if input.is_empty() {
            return Err(parse_error(offset, "inline image without ID"));
        }
        if input.starts_with(b"ID") && input.get(2).map_or(true, |&c| is_whitespace(c)) {
            input = &input[2..];
            break;
        }

        let key = match token(input) {
            Ok((rest, Token::Name(key))) => {
                input = rest;
                key
            },
            _ => return Err(parse_error(offset, "inline image key is not a name")),
        };
        let (rest, value) =
            parse_object(input).map_err(|e| nom_error(data, offset, "malformed inline image value", e))?;
        dict.insert(key, value);
        input = rest;
    }

    // A single whitespace byte separates ID from the image data.
    if input.first().is_some_and(|&c| is_whitespace(c)) {
        input = &input[1..];
    }

    let (end, resume) =
        find_end_of_image(input).ok_or_else(|| parse_error(data.len(), "inline image without EI"))?;
    let image_data = input[..end].to_vec();
    Ok((&input[resume..], dict, image_data))
}

/// Locate `EI`: returns the end of the image data and the position just past `EI`.
///
/// `EI` must be preceded by whitespace (or start the data) and followed by
/// whitespace, a delimiter or the end of the stream.
fn find_end_of_image(input: &[u8]) -> Option<(usize, usize)> {
    let ends_token = |at: usize| input.get(at).map_or(true, |&c| is_whitespace(c) || is_delimiter(c));
    if input.starts_with(b"EI") && ends_token(2) {
        return Some((0, 2));
    }
    (0..input.len().saturating_sub(2))
        .find(|&i| is_whitespace(input[i]) && &input[i + 1..i + 3] == b"EI" && ends_token(i + 3))
        .map(|i| (i, i + 3))
}

fn offset_of(data: &[u8], rest: &[u8]) -> usize {
    data.len() - rest.len()
}

fn parse_error(offset: usize, reason: &str) -> Error {
    Error::ParseError {
        offset,
        reason: reason.to_string(),
    }
}

fn nom_error(data: &[u8], fallback: usize, reason: &str, err: nom::Err<nom::error::Error<&[u8]>>) -> Error {
    let offset = match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => offset_of(data, e.input),
        nom::Err::Incomplete(_) => fallback,
    };
    parse_error(offset, reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_text() {
        let ops = parse_content_stream(b"BT /F1 12 Tf (Hello) Tj ET").unwrap();
        assert_eq!(ops.len(), 4);
        assert_eq!(ops[1].operator(), "Tf");
        assert_eq!(ops[1].operands(), &[Object::name("F1"), Object::Integer(12)]);
        assert_eq!(ops[2].operands(), &[Object::string("Hello")]);
    }

    #[test]
    fn test_parse_color_operators() {
        let ops = parse_content_stream(b"1 0 0 RG 0 0 1 rg 0.5 g").unwrap();
        let names: Vec<_> = ops.iter().map(ContentOperation::operator).collect();
        assert_eq!(names, vec!["RG", "rg", "g"]);
        assert_eq!(ops[0].operands().len(), 3);
    }

    #[test]
    fn test_parse_tj_array() {
        let ops = parse_content_stream(b"[(A) -120 (B)] TJ").unwrap();
        assert_eq!(ops[0].operands()[0].as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn test_parse_inline_image() {
        let ops = parse_content_stream(b"q BI /W 2 /H 1 /CS /G /BPC 8 /F /AHx ID 00FF> EI Q").unwrap();
        assert_eq!(ops.len(), 3);
        match &ops[1] {
            ContentOperation::InlineImage { dict, data, .. } => {
                assert_eq!(dict.get("F").and_then(Object::as_name), Some("AHx"));
                assert_eq!(data.as_slice(), b"00FF>");
            },
            other => panic!("expected inline image, got {:?}", other),
        }
        assert_eq!(ops[2].operator(), "Q");
    }

    #[test]
    fn test_inline_image_binary_data_containing_ei_letters() {
        let ops = parse_content_stream(b"BI /W 1 /H 1 ID xEIy EI").unwrap();
        match &ops[0] {
            ContentOperation::InlineImage { data, .. } => assert_eq!(data.as_slice(), b"xEIy"),
            other => panic!("expected inline image, got {:?}", other),
        }
    }

    #[test]
    fn test_inline_image_without_ei_fails() {
        let err = parse_content_stream(b"BI /W 1 /H 1 ID abc").unwrap_err();
        assert!(matches!(err, Error::ParseError { .. }));
    }

    #[test]
    fn test_unterminated_array_fails() {
        match parse_content_stream(b"q [1 2 3") {
            Err(Error::ParseError { reason, .. }) => assert_eq!(reason, "unterminated array"),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_unterminated_dictionary_fails() {
        assert!(matches!(
            parse_content_stream(b"/P << /MCID 0 BDC"),
            Err(Error::ParseError { .. })
        ));
    }

    #[test]
    fn test_trailing_operands_fail() {
        match parse_content_stream(b"q 1 2") {
            Err(Error::ParseError { offset, .. }) => assert_eq!(offset, 5),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_booleans_are_operands() {
        let ops = parse_content_stream(b"/OC true BDC EMC").unwrap();
        assert_eq!(ops[0].operands(), &[Object::name("OC"), Object::Boolean(true)]);
    }

    #[test]
    fn test_comments_and_empty_stream() {
        assert!(parse_content_stream(b"").unwrap().is_empty());
        assert!(parse_content_stream(b"% nothing here\n").unwrap().is_empty());
    }
}
