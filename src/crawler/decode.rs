//! Body decoding
//!
//! Turns response bytes into text using the character encoding the page
//! declares. The encoding is taken from, in order:
//! 1. A byte order mark
//! 2. The `charset` parameter of the Content-Type header
//! 3. A `<meta charset>` or `<meta http-equiv="Content-Type">` in the first
//!    1024 bytes
//!
//! Undeclared bodies are read as UTF-8 when they are valid UTF-8 and as
//! windows-1252 otherwise.

use crate::crawler::extractor::ParseError;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252};

/// How far into the body `<meta>` declarations are looked for
const META_PRESCAN_BYTES: usize = 1024;

/// Decodes a response body to text
///
/// Fails only when the body is malformed for an encoding it declares.
pub(crate) fn decode_body(
    body: &[u8],
    content_type: Option<&str>,
) -> Result<String, ParseError> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(body) {
        return decode_declared(&body[bom_len..], encoding);
    }

    let declared = content_type
        .and_then(charset_from_content_type)
        .or_else(|| charset_from_meta(body));

    match declared {
        Some(encoding) => decode_declared(body, encoding),
        None => Ok(match std::str::from_utf8(body) {
            Ok(text) => text.to_string(),
            Err(_) => {
                tracing::debug!("Undeclared non-UTF-8 body, reading as windows-1252");
                let (text, _) = WINDOWS_1252.decode_without_bom_handling(body);
                text.into_owned()
            }
        }),
    }
}

fn decode_declared(body: &[u8], encoding: &'static Encoding) -> Result<String, ParseError> {
    let (text, had_errors) = encoding.decode_without_bom_handling(body);
    if had_errors {
        return Err(ParseError::InvalidEncoding {
            encoding: encoding.name(),
        });
    }
    Ok(text.into_owned())
}

/// Reads the `charset` parameter of a Content-Type value
fn charset_from_content_type(content_type: &str) -> Option<&'static Encoding> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        Encoding::for_label(value.trim().trim_matches(|c| c == '"' || c == '\'').as_bytes())
    })
}

/// Finds a charset declared by a `<meta>` element near the start of the body
fn charset_from_meta(body: &[u8]) -> Option<&'static Encoding> {
    let head = &body[..body.len().min(META_PRESCAN_BYTES)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();

    let mut rest = head.as_str();
    while let Some(start) = rest.find("<meta") {
        let tag = &rest[start..];
        let tag = &tag[..tag.find('>').unwrap_or(tag.len())];

        if let Some(pos) = tag.find("charset=") {
            let value = tag[pos + "charset=".len()..].trim_start_matches(['"', '\'', ' ']);
            let end = value
                .find(|c: char| matches!(c, '"' | '\'' | ';' | '/' | '>') || c.is_whitespace())
                .unwrap_or(value.len());
            if let Some(encoding) = Encoding::for_label(value[..end].as_bytes()) {
                // A document that could be prescanned as ASCII is not UTF-16
                return Some(if encoding == UTF_16LE || encoding == UTF_16BE {
                    UTF_8
                } else {
                    encoding
                });
            }
        }

        rest = &rest[start + "<meta".len()..];
    }
    None
}
