//! Dangerous-content pattern ruleset
//! Denylist of constructs that can execute or exfiltrate when an SVG is
//! rendered in a browser context. A single match anywhere disqualifies the
//! whole document; there is no scoring and no allowlist override.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

/// A single dangerous-content matcher.
#[derive(Debug)]
pub struct Rule {
    /// Stable identifier, used only for logging.
    pub id: &'static str,
    pattern: Regex,
}

impl Rule {
    fn new(id: &'static str, pattern: &str) -> Self {
        Self {
            id,
            // Patterns are compile-time constants; a failure here is a
            // programming error, not an input error.
            pattern: Regex::new(pattern).unwrap(),
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Rule definitions, grouped by threat category. Order has no semantic
/// effect (first match wins and every rule alone is disqualifying), only a
/// performance one.
const PATTERNS: &[(&str, &str)] = &[
    // Script tags and JavaScript.
    ("script-element", r"(?i)<script\b"),
    ("namespaced-script", r"(?i)<[\w:]+:script\b"),
    ("script-attribute", r"(?i)<\w+\s[^>]*script\w*\s*="),
    ("javascript-uri", r"(?i)javascript:"),
    // Event handlers.
    ("event-handler", r"(?i)\bon\w+\s*="),
    // Dangerous elements.
    ("iframe-element", r"(?i)<iframe\b"),
    ("object-element", r"(?i)<object\b"),
    ("embed-element", r"(?i)<embed\b"),
    ("foreignobject-element", r"(?i)<[\w:]*foreignobject\b"),
    // External references. SVG must be self-contained; no network fetch
    // vector is permitted even for otherwise benign images.
    ("remote-use-href", r#"(?i)<use\s+href\s*=\s*["']?https?:"#),
    ("remote-image-href", r#"(?i)<image\s+href\s*=\s*["']?https?:"#),
    ("remote-xlink-href", r#"(?i)xlink:href\s*=\s*["']?https?:"#),
    // Style-related threats.
    ("style-element", r"(?is)<style\b[^>]*>.*?</style>"),
    ("namespaced-style", r"(?is)<[\w:]+:style\b[^>]*>.*?</[\w:]+:style>"),
    ("css-expression", r"(?i)expression\s*\("),
    ("css-import", r"(?i)@import"),
    ("css-url-javascript", r#"(?i)url\s*\(\s*["']?javascript:"#),
    ("style-attr-expression", r#"(?i)style\s*=\s*["'][^"']*expression\s*\("#),
    ("style-attr-javascript", r#"(?i)style\s*=\s*["'][^"']*javascript:"#),
    ("css-behavior", r"(?i)behavior\s*:"),
    // Data URL threats. Base64 payloads are opaque to the scanner and
    // therefore untrusted regardless of declared type.
    ("data-uri-script", r"(?i)data:\s*[^,]*(?:script|javascript)"),
    ("data-uri-html", r"(?i)data:\s*text/html"),
    ("base64-data-href", r#"(?i)href\s*=\s*["']?data:.*base64"#),
    // XML/DTD threats. Entity-expansion risk (XXE, billion laughs) exists at
    // declaration time, so presence alone is disqualifying.
    ("doctype", r"(?i)<!DOCTYPE\b"),
    ("entity-declaration", r"(?i)<!ENTITY\b"),
    ("entity-reference", r"&\w+;"),
    ("parameter-entity-reference", r"%\w+;"),
    // CDATA with malicious content.
    ("cdata-script", r"(?is)<!\[CDATA\[.*?(?:script|javascript).*?\]\]>"),
    // Obfuscation patterns.
    ("unicode-escape", r"(?i)\\u[0-9a-f]{4}"),
    ("hex-escape", r"(?i)\\x[0-9a-f]{2}"),
    ("eval-call", r"(?i)eval\s*\("),
    ("settimeout-call", r"(?i)setTimeout\s*\("),
    ("setinterval-call", r"(?i)setInterval\s*\("),
    ("function-call", r"(?i)Function\s*\("),
    ("octal-escape", r"\\[0-9]{1,3}"),
];

lazy_static! {
    static ref RULESET: Vec<Rule> = PATTERNS
        .iter()
        .map(|(id, pattern)| Rule::new(id, pattern))
        .collect();
}

/// Identifier of the first rule matching `text`, if any.
pub fn first_match(text: &str) -> Option<&'static str> {
    RULESET.iter().find(|rule| rule.is_match(text)).map(|rule| rule.id)
}

/// Check whether any rule in the set matches `text`.
pub fn matches_any(text: &str) -> bool {
    match first_match(text) {
        Some(id) => {
            debug!("Dangerous pattern matched: {}", id);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ruleset_compiles() {
        assert_eq!(RULESET.len(), PATTERNS.len());
    }

    #[test]
    fn test_script_elements() {
        assert_eq!(first_match("<script>alert(1)</script>"), Some("script-element"));
        assert_eq!(first_match("<svg:script href='x'/>"), Some("namespaced-script"));
        assert_eq!(first_match("<rect data-script=\"1\">"), Some("script-attribute"));
        assert!(matches_any("<a href=\"javascript:alert(1)\">"));
    }

    #[test]
    fn test_event_handlers() {
        assert!(matches_any("<rect onload=\"evil()\"/>"));
        assert!(matches_any("<circle ONCLICK = 'x'/>"));
        // "on" inside a longer word is not an event handler
        assert!(!matches_any("<stop stop-opacity=\"0.5\"/>"));
    }

    #[test]
    fn test_dangerous_elements() {
        assert!(matches_any("<iframe src=\"x\"/>"));
        assert!(matches_any("<object data=\"x\"/>"));
        assert!(matches_any("<embed src=\"x\"/>"));
        assert!(matches_any("<foreignObject><div/></foreignObject>"));
        assert!(matches_any("<svg:foreignObject/>"));
    }

    #[test]
    fn test_remote_references() {
        assert!(matches_any("<use href=\"https://example.com/x.svg#id\"/>"));
        assert!(matches_any("<image href=\"http://example.com/x.png\"/>"));
        assert!(matches_any("<use xlink:href=\"https://example.com/x\"/>"));
        // Local fragment references stay legal
        assert!(!matches_any("<use href=\"#icon\"/>"));
    }

    #[test]
    fn test_style_threats() {
        assert!(matches_any("<style>body{}</style>"));
        assert!(matches_any("<rect style=\"width:expression(alert(1))\"/>"));
        assert!(matches_any("@import url(evil.css)"));
        assert!(matches_any("background: url( 'javascript:alert(1)' )"));
        assert!(matches_any("behavior: url(x.htc)"));
    }

    #[test]
    fn test_data_uri_threats() {
        assert!(matches_any("data:text/html,<b>x</b>"));
        assert!(matches_any("data: application/javascript,alert(1)"));
        assert!(matches_any("<a href=\"data:image/png;base64,AAAA\">"));
    }

    #[test]
    fn test_dtd_threats() {
        assert!(matches_any("<!DOCTYPE svg>"));
        assert!(matches_any("<!ENTITY x \"y\">"));
        assert!(matches_any("text with &xxe; reference"));
        assert!(matches_any("%param; reference"));
        // Numeric character references are not general entity references;
        // they are handled by the entity decoding pass instead.
        assert_ne!(first_match("&#x3c;"), Some("entity-reference"));
    }

    #[test]
    fn test_cdata_smuggling() {
        assert!(matches_any("<![CDATA[ <script>alert(1)</script> ]]>"));
        assert!(!matches_any("<![CDATA[ plain text ]]>"));
    }

    #[test]
    fn test_obfuscation_signatures() {
        assert!(matches_any("\\u0061lert"));
        assert!(matches_any("\\x61lert"));
        assert!(matches_any("eval (payload)"));
        assert!(matches_any("setTimeout(fn, 0)"));
        assert!(matches_any("setInterval(fn, 0)"));
        assert!(matches_any("Function(body)"));
        assert!(matches_any("\\141"));
    }

    #[test]
    fn test_benign_svg_content() {
        assert!(!matches_any(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"10\" height=\"10\">\
             <rect width=\"10\" height=\"10\" fill=\"red\"/></svg>"
        ));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(matches_any("<SCRIPT>x</SCRIPT>"));
        assert!(matches_any("<IfRaMe>"));
        assert!(matches_any("JAVASCRIPT:void(0)"));
    }
}
