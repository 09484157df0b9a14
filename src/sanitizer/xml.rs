//! XML structural validation with XXE protection
//! A tolerant parse of broken markup is never treated as success: the event
//! loop walks the whole document and any parser error is a rejection. No
//! external entity resolution and no entity substitution happen at any
//! point; quick-xml leaves references untouched.

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

/// Check whether `content` parses as well-formed XML whose root element is
/// `<svg>`.
///
/// Parser errors are recorded and translated into a `false` verdict, never
/// propagated. Document size is not a rejection criterion here; legitimate
/// large SVGs must survive this check.
pub fn parses_safely(content: &str) -> bool {
    let mut reader = Reader::from_str(content);
    reader.check_end_names(true);

    let mut depth = 0usize;
    let mut roots = 0usize;
    let mut root_is_svg = false;

    loop {
        match reader.read_event() {
            Err(e) => {
                debug!(
                    "XML parse error at position {}: {}",
                    reader.buffer_position(),
                    e
                );
                return false;
            }
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => {
                if depth == 0 {
                    roots += 1;
                    if roots == 1 {
                        root_is_svg = e.name().local_name().as_ref() == b"svg";
                    }
                }
                depth += 1;
            }
            Ok(Event::Empty(e)) => {
                if depth == 0 {
                    roots += 1;
                    if roots == 1 {
                        root_is_svg = e.name().local_name().as_ref() == b"svg";
                    }
                }
            }
            Ok(Event::End(_)) => {
                if depth == 0 {
                    debug!("Unbalanced closing tag outside root element");
                    return false;
                }
                depth -= 1;
            }
            Ok(Event::Text(t)) => {
                // Non-whitespace character data outside the root is malformed
                if depth == 0 && !t.as_ref().iter().all(u8::is_ascii_whitespace) {
                    debug!("Character data outside root element");
                    return false;
                }
            }
            // Decl, comments, PIs, DOCTYPE and CDATA carry no structure;
            // dangerous ones are already rejected by the pattern ruleset.
            Ok(_) => {}
        }
    }

    if depth != 0 {
        debug!("Document ended with {} unclosed element(s)", depth);
        return false;
    }
    if roots != 1 {
        debug!("Expected exactly one root element, found {}", roots);
        return false;
    }
    if !root_is_svg {
        debug!("Root element is not <svg>");
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_svg() {
        assert!(parses_safely(
            "<svg xmlns=\"http://www.w3.org/2000/svg\"><rect width=\"10\" height=\"10\"/></svg>"
        ));
    }

    #[test]
    fn test_xml_declaration_allowed() {
        assert!(parses_safely(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<svg xmlns=\"http://www.w3.org/2000/svg\"/>"
        ));
    }

    #[test]
    fn test_unclosed_root_rejected() {
        assert!(!parses_safely("<svg><rect/>"));
    }

    #[test]
    fn test_mismatched_tags_rejected() {
        assert!(!parses_safely("<svg><g></svg></g>"));
    }

    #[test]
    fn test_truncated_document_rejected() {
        assert!(!parses_safely("<svg><rect width=\"10"));
    }

    #[test]
    fn test_non_svg_root_rejected() {
        assert!(!parses_safely("<html><svg/></html>"));
    }

    #[test]
    fn test_multiple_roots_rejected() {
        assert!(!parses_safely("<svg/><svg/>"));
    }

    #[test]
    fn test_text_outside_root_rejected() {
        assert!(!parses_safely("garbage<svg/>"));
    }

    #[test]
    fn test_empty_root_element() {
        assert!(parses_safely("<svg xmlns=\"http://www.w3.org/2000/svg\"/>"));
    }
}
