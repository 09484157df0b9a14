//! SVG content sanitization
//! Produces a binary accept/reject verdict over untrusted SVG content. The
//! document is never rewritten or stripped to make it safe; ambiguity always
//! resolves to rejection.

pub mod entities;
pub mod rules;
pub mod xml;

use tracing::debug;

/// Validates SVG content before it is persisted or served.
pub struct Sanitizer;

impl Sanitizer {
    /// Validate raw file bytes. Content is assumed UTF-8; bytes that do not
    /// decode are rejected outright.
    pub fn is_valid_bytes(content: &[u8]) -> bool {
        match std::str::from_utf8(content) {
            Ok(text) => Self::is_valid(text),
            Err(_) => {
                debug!("Content is not valid UTF-8");
                false
            }
        }
    }

    /// Validate SVG content.
    ///
    /// Checks run cheapest-first and short-circuit: empty content, textual
    /// `<svg>`/`</svg>` pre-filter, pattern ruleset on the raw text, pattern
    /// ruleset on the entity-decoded text, and finally the full XML parse.
    /// The parse runs last both because it is the most expensive check and
    /// because a misconfigured parser is itself an attack surface.
    pub fn is_valid(content: &str) -> bool {
        if content.is_empty() {
            return false;
        }

        if !content.contains("<svg") || !content.contains("</svg>") {
            debug!("Missing <svg> open or close tag");
            return false;
        }

        if rules::matches_any(content) {
            return false;
        }

        let decoded = entities::decode(content);
        if rules::matches_any(&decoded) {
            debug!("Dangerous pattern revealed by entity decoding");
            return false;
        }

        xml::parses_safely(content)
    }
}
