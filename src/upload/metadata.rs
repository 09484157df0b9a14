//! SVG attachment metadata generation
//! Derives width/height for attachment metadata from the root `<svg>`
//! element: explicit attributes first, `viewBox` as fallback. A zero or
//! negative size is never persisted; no trustworthy dimension means no
//! dimension at all.

use std::collections::BTreeMap;

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::upload::{AttachmentId, AttachmentStore};

/// A generated raster variant of an attachment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizeVariant {
    pub file: String,
    pub width: u32,
    pub height: u32,
    pub mime_type: String,
}

/// Host-side attachment metadata the generator merges dimensions into.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttachmentMetadata {
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(default)]
    pub sizes: BTreeMap<String, SizeVariant>,
}

/// Width/height and viewBox attributes of the document's root element.
struct RootAttributes {
    width: Option<String>,
    height: Option<String>,
    viewbox: Option<String>,
}

/// Derive (width, height) from SVG content, or `None` when no trustworthy
/// dimension pair exists.
pub fn extract_dimensions(content: &str) -> Option<(u32, u32)> {
    let root = root_svg_attributes(content)?;
    from_attributes(&root).or_else(|| from_viewbox(&root))
}

/// Merge extracted dimensions into the attachment metadata for SVG
/// attachments. Non-SVG attachments and unreadable files leave the metadata
/// untouched; dimension extraction is best-effort, unlike validation.
pub async fn generate(
    store: &dyn AttachmentStore,
    id: AttachmentId,
    metadata: &mut AttachmentMetadata,
) -> Result<()> {
    let Some(mime) = store.attachment_mime(id).await else {
        return Ok(());
    };
    if !mime.ends_with("svg+xml") {
        return Ok(());
    }

    let Some(path) = store.attachment_path(id).await else {
        return Ok(());
    };
    let Ok(bytes) = tokio::fs::read(&path).await else {
        debug!("Cannot read attachment {} for metadata", id);
        return Ok(());
    };
    let Ok(content) = String::from_utf8(bytes) else {
        return Ok(());
    };

    if let Some((width, height)) = extract_dimensions(&content) {
        metadata.width = Some(width);
        metadata.height = Some(height);
    }

    Ok(())
}

/// Parse up to the root element and collect its dimension attributes.
/// Returns `None` when the document has no elements or the root is not
/// `<svg>`.
fn root_svg_attributes(content: &str) -> Option<RootAttributes> {
    let mut reader = Reader::from_str(content);

    loop {
        match reader.read_event() {
            Err(_) | Ok(Event::Eof) => return None,
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.name().local_name().as_ref() != b"svg" {
                    return None;
                }

                let mut root = RootAttributes {
                    width: None,
                    height: None,
                    viewbox: None,
                };
                for attr in e.attributes().flatten() {
                    let value = std::str::from_utf8(&attr.value).unwrap_or("").to_string();
                    match attr.key.as_ref() {
                        b"width" => root.width = Some(value),
                        b"height" => root.height = Some(value),
                        b"viewBox" => root.viewbox = Some(value),
                        _ => {}
                    }
                }
                return Some(root);
            }
            Ok(_) => {}
        }
    }
}

/// Preferred source: explicit width/height attributes, with non-numeric
/// characters stripped before parsing. Both must be positive or the pair is
/// rejected as a source.
fn from_attributes(root: &RootAttributes) -> Option<(u32, u32)> {
    let width = parse_dimension(root.width.as_deref()?);
    let height = parse_dimension(root.height.as_deref()?);
    (width > 0 && height > 0).then_some((width, height))
}

/// Fallback source: the 3rd and 4th tokens of `viewBox` (`min-x min-y width
/// height`).
fn from_viewbox(root: &RootAttributes) -> Option<(u32, u32)> {
    let viewbox = root.viewbox.as_deref()?;
    let tokens: Vec<&str> = viewbox
        .trim()
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.len() < 4 {
        return None;
    }

    // Values that do not fit u32 are untrustworthy, not truncatable
    let width = u32::try_from(parse_signed(tokens[2])).ok().filter(|w| *w > 0)?;
    let height = u32::try_from(parse_signed(tokens[3])).ok().filter(|h| *h > 0)?;
    Some((width, height))
}

/// Strip unit suffixes and other non-numeric characters, then truncate to a
/// whole number. Anything unparseable becomes zero and is rejected by the
/// positivity check in the caller.
fn parse_dimension(raw: &str) -> u32 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse::<f64>().map(|v| v as u32).unwrap_or(0)
}

fn parse_signed(token: &str) -> i64 {
    token.parse::<f64>().map(|v| v as i64).unwrap_or(0)
}
