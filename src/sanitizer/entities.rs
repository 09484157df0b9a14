//! Entity decoding to reveal obfuscated content
//! Normalizes HTML/XML character references into literal text so that
//! encoded payloads become visible to the pattern ruleset. The output is
//! only ever re-scanned, never stored.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref HEX_REFERENCE: Regex = Regex::new(r"(?i)&#x([0-9a-f]+);").unwrap();
    static ref DEC_REFERENCE: Regex = Regex::new(r"&#([0-9]+);").unwrap();
}

/// Decode HTML entities to reveal obfuscated content.
///
/// Runs three passes in sequence: HTML5 named entities (quotes, ampersands
/// and the rest of the named set), hexadecimal numeric character references,
/// then decimal ones. Malformed or out-of-range numeric escapes are dropped
/// rather than rejected; the decoded text is input to the ruleset, not a
/// replacement for the document.
pub fn decode(content: &str) -> String {
    // Out-of-range references must decode to the empty string. Drop them up
    // front so the general pass below cannot substitute a replacement
    // character for them.
    let stripped = drop_invalid_references(content);

    let decoded = html_escape::decode_html_entities(&stripped).into_owned();

    let decoded = HEX_REFERENCE
        .replace_all(&decoded, |caps: &Captures| {
            codepoint_to_string(u32::from_str_radix(&caps[1], 16).ok())
        })
        .into_owned();

    DEC_REFERENCE
        .replace_all(&decoded, |caps: &Captures| {
            codepoint_to_string(caps[1].parse::<u32>().ok())
        })
        .into_owned()
}

/// Remove numeric references whose code point exceeds the Unicode maximum
/// (0x10FFFF) or does not fit in 32 bits at all.
fn drop_invalid_references(content: &str) -> String {
    let stripped = HEX_REFERENCE
        .replace_all(content, |caps: &Captures| {
            match u32::from_str_radix(&caps[1], 16) {
                Ok(cp) if cp <= 0x10FFFF => caps[0].to_string(),
                _ => String::new(),
            }
        })
        .into_owned();

    DEC_REFERENCE
        .replace_all(&stripped, |caps: &Captures| match caps[1].parse::<u32>() {
            Ok(cp) if cp <= 0x10FFFF => caps[0].to_string(),
            _ => String::new(),
        })
        .into_owned()
}

/// Unrepresentable code points (surrogates) decode to the empty string.
fn codepoint_to_string(codepoint: Option<u32>) -> String {
    codepoint
        .filter(|cp| *cp <= 0x10FFFF)
        .and_then(char::from_u32)
        .map(String::from)
        .unwrap_or_default()
}
