//! PDF object parser.
//!
//! Combines lexer tokens into complete objects (arrays, dictionaries,
//! indirect references). Used for content-stream operands and inline-image
//! dictionaries; the checker never parses whole files.
//!
//! All parsing functions return `IResult` from nom so callers can keep the
//! remaining input and report the byte offset of a failure.

use crate::lexer::{token, Token};
use crate::object::{Dictionary, Object, ObjectRef};
use nom::IResult;

/// Decode escape sequences in PDF literal strings.
///
/// ISO 32000-1:2008, Section 7.3.4.2: `\n \r \t \b \f \( \) \\`, octal
/// `\ddd`, and backslash-newline line continuation. Unknown escapes keep the
/// escaped character and drop the backslash.
///
/// ```
/// # use pdfa_oxide::parser::decode_literal_string_escapes;
/// assert_eq!(decode_literal_string_escapes(b"Section \\247 71"), b"Section \xa7 71");
/// ```
pub fn decode_literal_string_escapes(raw: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        if raw[i] != b'\\' || i + 1 >= raw.len() {
            result.push(raw[i]);
            i += 1;
            continue;
        }
        let escaped = raw[i + 1];
        i += 2;
        match escaped {
            b'n' => result.push(b'\n'),
            b'r' => result.push(b'\r'),
            b't' => result.push(b'\t'),
            b'b' => result.push(8),
            b'f' => result.push(12),
            b'\n' => {},
            b'\r' => {
                if raw.get(i) == Some(&b'\n') {
                    i += 1;
                }
            },
            b'0'..=b'7' => {
                let mut octal = (escaped - b'0') as u32;
                let mut digits = 1;
                while digits < 3 && matches!(raw.get(i), Some(b'0'..=b'7')) {
                    octal = octal * 8 + (raw[i] - b'0') as u32;
                    i += 1;
                    digits += 1;
                }
                result.push((octal & 0xFF) as u8);
            },
            other => result.push(other),
        }
    }

    result
}

/// Decode the digits of a hexadecimal string. An odd final digit is padded
/// with 0; non-hex characters are ignored.
pub fn decode_hex(hex_bytes: &[u8]) -> Vec<u8> {
    let nibbles: Vec<u8> = hex_bytes
        .iter()
        .filter_map(|&c| (c as char).to_digit(16).map(|v| v as u8))
        .collect();
    nibbles
        .chunks(2)
        .map(|pair| (pair[0] << 4) | pair.get(1).copied().unwrap_or(0))
        .collect()
}

fn parse_error(input: &[u8]) -> nom::Err<nom::error::Error<&[u8]>> {
    nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Tag))
}

/// Parse a PDF object from input bytes.
///
/// ```
/// use pdfa_oxide::parser::parse_object;
///
/// let (_, obj) = parse_object(b"[ 1 2 /Name ]").unwrap();
/// assert_eq!(obj.as_array().map(Vec::len), Some(3));
/// ```
pub fn parse_object(input: &[u8]) -> IResult<&[u8], Object> {
    let (rest, tok) = token(input)?;
    object_from_token(tok, rest)
}

/// Complete an object whose first token has already been read.
///
/// Bare keywords other than `true`, `false` and `null` are not objects and
/// produce an error; the content-stream walker treats them as operators before
/// calling this.
pub fn object_from_token<'a>(tok: Token<'a>, input: &'a [u8]) -> IResult<&'a [u8], Object> {
    match tok {
        Token::Keyword("null") => Ok((input, Object::Null)),
        Token::Keyword("true") => Ok((input, Object::Boolean(true))),
        Token::Keyword("false") => Ok((input, Object::Boolean(false))),
        Token::Keyword(_) => Err(parse_error(input)),
        Token::Integer(i) => {
            // Could be the start of an indirect reference (obj_num gen R)
            if let Ok((after_gen, Token::Integer(gen))) = token(input) {
                if let Ok((after_r, Token::Keyword("R"))) = token(after_gen) {
                    if let (Ok(id), Ok(gen)) = (u32::try_from(i), u16::try_from(gen)) {
                        return Ok((after_r, Object::Reference(ObjectRef::new(id, gen))));
                    }
                }
            }
            Ok((input, Object::Integer(i)))
        },
        Token::Real(r) => Ok((input, Object::Real(r))),
        Token::LiteralString(bytes) => Ok((input, Object::String(decode_literal_string_escapes(bytes)))),
        Token::HexString(bytes) => Ok((input, Object::String(decode_hex(bytes)))),
        Token::Name(name) => Ok((input, Object::Name(name))),
        Token::ArrayStart => parse_array(input),
        Token::DictStart => parse_dictionary(input),
        Token::ArrayEnd | Token::DictEnd => Err(parse_error(input)),
    }
}

/// Parse array elements after `[` up to and including `]`.
fn parse_array(mut input: &[u8]) -> IResult<&[u8], Object> {
    let mut items = Vec::new();
    loop {
        let (rest, tok) = token(input)?;
        if tok == Token::ArrayEnd {
            return Ok((rest, Object::Array(items)));
        }
        let (rest, obj) = object_from_token(tok, rest)?;
        items.push(obj);
        input = rest;
    }
}

/// Parse dictionary entries after `<<` up to and including `>>`.
fn parse_dictionary(mut input: &[u8]) -> IResult<&[u8], Object> {
    let mut dict = Dictionary::new();
    loop {
        let (rest, tok) = token(input)?;
        let key = match tok {
            Token::DictEnd => return Ok((rest, Object::Dictionary(dict))),
            Token::Name(key) => key,
            _ => return Err(parse_error(input)),
        };
        let (rest, value) = parse_object(rest)?;
        dict.insert(key, value);
        input = rest;
    }
}
