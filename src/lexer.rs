//! PDF lexer (tokenizer).
//!
//! Low-level tokenization of PDF byte streams, shared by the object parser and
//! the content-stream walker.
//!
//! # PDF Syntax Overview
//!
//! - Numbers: integers (42, -123) and reals (3.14, -2.5, .5)
//! - Strings: literal ((Hello)) and hexadecimal (<48656C6C6F>)
//! - Names: identifiers starting with / (/Type, /Pages)
//! - Delimiters: `[`, `]`, `<<`, `>>`
//! - Keywords: any other run of regular characters (`true`, `null`, `R`,
//!   and every content-stream operator such as `re`, `RG`, `T*`, `'`)
//!
//! Whitespace (space, \t, \r, \n, \0, \f) and comments (% to EOL) are skipped.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_till, take_while, take_while1},
    character::complete::{char, digit1, one_of},
    combinator::{map, opt, value},
    sequence::{delimited, preceded},
    IResult,
};

/// Token types recognized by the PDF lexer.
#[derive(Debug, PartialEq, Clone)]
pub enum Token<'a> {
    /// Integer number (e.g., 42, -123)
    Integer(i64),

    /// Real (floating-point) number (e.g., 3.14, -2.5, .5)
    Real(f64),

    /// Literal string bytes, escape sequences not yet decoded
    LiteralString(&'a [u8]),

    /// Hexadecimal string digits, whitespace preserved
    HexString(&'a [u8]),

    /// Name with `#XX` escapes decoded (e.g., "Type" from "/Type")
    Name(String),

    /// Array start delimiter [
    ArrayStart,

    /// Array end delimiter ]
    ArrayEnd,

    /// Dictionary start delimiter <<
    DictStart,

    /// Dictionary end delimiter >>
    DictEnd,

    /// Bare keyword: `true`, `false`, `null`, `R`, `obj`, or a content operator
    Keyword(&'a str),
}

/// PDF whitespace (ISO 32000-1:2008, Table 1).
pub fn is_whitespace(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\r' | b'\n' | 0x00 | 0x0C)
}

/// PDF delimiter characters (ISO 32000-1:2008, Table 2).
pub fn is_delimiter(c: u8) -> bool {
    matches!(c, b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%')
}

/// A regular character is anything that is neither whitespace nor a delimiter.
pub fn is_regular(c: u8) -> bool {
    !is_whitespace(c) && !is_delimiter(c)
}

fn whitespace(input: &[u8]) -> IResult<&[u8], ()> {
    value((), take_while1(is_whitespace))(input)
}

fn comment(input: &[u8]) -> IResult<&[u8], ()> {
    value((), preceded(char('%'), take_till(|c| c == b'\r' || c == b'\n')))(input)
}

/// Skip all whitespace and comments.
pub fn skip_ws(input: &[u8]) -> &[u8] {
    let mut remaining = input;
    loop {
        if let Ok((rest, _)) = whitespace(remaining) {
            remaining = rest;
        } else if let Ok((rest, _)) = comment(remaining) {
            remaining = rest;
        } else {
            return remaining;
        }
    }
}

fn number_error(input: &[u8]) -> nom::Err<nom::error::Error<&[u8]>> {
    nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit))
}

/// Parse an integer or real number.
///
/// PDF allows leading +/- signs and numbers starting or ending with a decimal
/// point. A number must not run straight into a regular character (`12abc` is
/// a keyword, not a number).
fn parse_number(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    let start = input;
    let (input, sign) = opt(one_of("+-"))(input)?;
    let (input, int_part) = opt(digit1)(input)?;
    let (input, frac_part) = opt(preceded(char('.'), opt(digit1)))(input)?;

    if int_part.is_none() && !matches!(frac_part, Some(Some(_))) {
        return Err(number_error(start));
    }
    if input.first().is_some_and(|&c| is_regular(c)) {
        return Err(number_error(start));
    }

    let consumed = &start[..start.len() - input.len()];
    let text = std::str::from_utf8(consumed).map_err(|_| number_error(start))?;

    if frac_part.is_some() {
        let normalized = text.trim_start_matches('+');
        let num: f64 = if normalized.ends_with('.') {
            normalized.trim_end_matches('.').parse()
        } else {
            normalized.parse()
        }
        .map_err(|_| number_error(start))?;
        Ok((input, Token::Real(num)))
    } else {
        let magnitude = int_part.ok_or_else(|| number_error(start))?;
        let digits = std::str::from_utf8(magnitude).map_err(|_| number_error(start))?;
        // Integers too large for i64 are kept as reals so range checks still see them.
        match digits.parse::<i64>() {
            Ok(n) => Ok((input, Token::Integer(if sign == Some('-') { -n } else { n }))),
            Err(_) => {
                let n: f64 = digits.parse().map_err(|_| number_error(start))?;
                Ok((input, Token::Real(if sign == Some('-') { -n } else { n })))
            },
        }
    }
}

/// Parse a literal string enclosed in parentheses.
///
/// Balanced nested parentheses are allowed; escapes are skipped but not
/// decoded here.
fn parse_literal_string(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    let (remaining, _) = char('(')(input)?;
    let mut depth = 1;
    let mut pos = 0;

    while depth > 0 && pos < remaining.len() {
        match remaining[pos] {
            b'\\' => pos += 2,
            b'(' => {
                depth += 1;
                pos += 1;
            },
            b')' => {
                depth -= 1;
                pos += 1;
            },
            _ => pos += 1,
        }
    }

    if depth != 0 || pos > remaining.len() {
        return Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Tag)));
    }

    Ok((&remaining[pos..], Token::LiteralString(&remaining[..pos - 1])))
}

/// Parse a hexadecimal string enclosed in angle brackets.
fn parse_hex_string(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    if input.starts_with(b"<<") {
        return Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Tag)));
    }

    delimited(
        char('<'),
        map(
            take_while(|c: u8| c.is_ascii_hexdigit() || is_whitespace(c)),
            Token::HexString,
        ),
        char('>'),
    )(input)
}

/// Decode #XX escape sequences in PDF names.
///
/// PDF Spec: ISO 32000-1:2008, Section 7.3.5 - Name Objects
///
/// ```
/// # use pdfa_oxide::lexer::decode_name_escapes;
/// assert_eq!(decode_name_escapes(b"A#20B#23C"), "A B#C");
/// assert_eq!(decode_name_escapes(b"A#"), "A#");
/// ```
pub fn decode_name_escapes(raw: &[u8]) -> String {
    let mut bytes = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == b'#' {
            let hex = raw.get(i + 1..i + 3).and_then(|h| std::str::from_utf8(h).ok());
            if let Some(byte) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                bytes.push(byte);
                i += 3;
                continue;
            }
        }
        bytes.push(raw[i]);
        i += 1;
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Parse a name starting with /.
fn parse_name(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    preceded(char('/'), map(take_while(is_regular), |bytes| Token::Name(decode_name_escapes(bytes))))(
        input,
    )
}

fn parse_delimiter(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    alt((
        value(Token::DictStart, tag(b"<<")),
        value(Token::DictEnd, tag(b">>")),
        value(Token::ArrayStart, tag(b"[")),
        value(Token::ArrayEnd, tag(b"]")),
    ))(input)
}

fn parse_keyword(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    let (rest, word) = take_while1(is_regular)(input)?;
    let word = std::str::from_utf8(word)
        .map_err(|_| nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Char)))?;
    Ok((rest, Token::Keyword(word)))
}

/// Parse a single PDF token, skipping leading whitespace and comments.
///
/// Order matters: delimiters before hex strings (`<<` vs `<`), numbers before
/// keywords (`-1` vs a keyword starting with `-`).
pub fn token(input: &[u8]) -> IResult<&[u8], Token<'_>> {
    let input = skip_ws(input);
    alt((
        parse_delimiter,
        parse_name,
        parse_number,
        parse_literal_string,
        parse_hex_string,
        parse_keyword,
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integers() {
        assert_eq!(token(b"42"), Ok((&b""[..], Token::Integer(42))));
        assert_eq!(token(b"-123"), Ok((&b""[..], Token::Integer(-123))));
        assert_eq!(token(b"+17"), Ok((&b""[..], Token::Integer(17))));
    }

    #[test]
    fn test_parse_reals() {
        assert_eq!(token(b"-2.5"), Ok((&b""[..], Token::Real(-2.5))));
        assert_eq!(token(b".5"), Ok((&b""[..], Token::Real(0.5))));
        assert_eq!(token(b"5."), Ok((&b""[..], Token::Real(5.0))));
        assert_eq!(token(b"-.002"), Ok((&b""[..], Token::Real(-0.002))));
    }

    #[test]
    fn test_oversized_integer_becomes_real() {
        let (_, tok) = token(b"99999999999999999999").unwrap();
        assert!(matches!(tok, Token::Real(r) if r > 9.0e18));
    }

    #[test]
    fn test_parse_literal_strings() {
        assert_eq!(token(b"(Hello (nested) World)"), Ok((&b""[..], Token::LiteralString(b"Hello (nested) World"))));
        assert_eq!(token(b"(Open \\( Close)"), Ok((&b""[..], Token::LiteralString(b"Open \\( Close"))));
        assert_eq!(token(b"()"), Ok((&b""[..], Token::LiteralString(b""))));
    }

    #[test]
    fn test_unterminated_literal_string_fails() {
        assert!(token(b"(never closed").is_err());
    }

    #[test]
    fn test_parse_hex_string() {
        assert_eq!(token(b"<48 65>"), Ok((&b""[..], Token::HexString(b"48 65"))));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(token(b"/Type"), Ok((&b""[..], Token::Name("Type".to_string()))));
        assert_eq!(token(b"/A#20B"), Ok((&b""[..], Token::Name("A B".to_string()))));
        assert_eq!(token(b"/A#ZZ"), Ok((&b""[..], Token::Name("A#ZZ".to_string()))));
        assert_eq!(token(b"/ "), Ok((&b" "[..], Token::Name(String::new()))));
    }

    #[test]
    fn test_operators_are_keywords() {
        assert_eq!(token(b"RG"), Ok((&b""[..], Token::Keyword("RG"))));
        assert_eq!(token(b"T*"), Ok((&b""[..], Token::Keyword("T*"))));
        assert_eq!(token(b"'"), Ok((&b""[..], Token::Keyword("'"))));
        assert_eq!(token(b"true"), Ok((&b""[..], Token::Keyword("true"))));
    }

    #[test]
    fn test_operator_stops_at_delimiter() {
        assert_eq!(token(b"Tj/F1"), Ok((&b"/F1"[..], Token::Keyword("Tj"))));
    }

    #[test]
    fn test_dict_vs_hex_string() {
        assert_eq!(token(b"<<"), Ok((&b""[..], Token::DictStart)));
        assert_eq!(token(b"<ABC>"), Ok((&b""[..], Token::HexString(b"ABC"))));
    }

    #[test]
    fn test_skip_comments() {
        assert_eq!(token(b"  % Comment\n  \t% Another\n  42"), Ok((&b""[..], Token::Integer(42))));
    }

    #[test]
    fn test_content_snippet() {
        let mut input: &[u8] = b"q 1 0 0 RG /GS1 gs Q";
        let mut toks = Vec::new();
        while !skip_ws(input).is_empty() {
            let (rest, tok) = token(input).unwrap();
            toks.push(tok);
            input = rest;
        }
        assert_eq!(toks.len(), 8);
        assert_eq!(toks[4], Token::Keyword("RG"));
        assert_eq!(toks[5], Token::Name("GS1".to_string()));
    }
}
