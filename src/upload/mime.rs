//! MIME registration surface
//! Teaches the host platform that `.svg` maps to `image/svg+xml` and
//! adjusts downstream image-pipeline assumptions: the MIME participates in
//! size extraction, but vector content gets no responsive raster variants.

use std::collections::HashMap;

use crate::upload::metadata::AttachmentMetadata;

/// Canonical MIME type for SVG content.
pub const SVG_MIME: &str = "image/svg+xml";

/// Canonical SVG file extension.
pub const SVG_EXT: &str = "svg";

/// Result of the host's filetype-and-extension resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FiletypeCheck {
    pub ext: Option<String>,
    pub mime: Option<String>,
    pub proper_filename: Option<String>,
}

/// Add SVG to the host's allowed upload MIME types (extension → MIME).
pub fn register(mimes: &mut HashMap<String, String>) {
    mimes.insert(SVG_EXT.to_string(), SVG_MIME.to_string());
}

/// Resolve filetype data for `.svg` names, overriding whatever the host's
/// generic detection produced. Non-SVG names pass through untouched.
pub fn check_filetype(data: FiletypeCheck, filename: &str) -> FiletypeCheck {
    let is_svg = std::path::Path::new(filename)
        .extension()
        .map(|ext| ext == SVG_EXT)
        .unwrap_or(false);
    if !is_svg {
        return data;
    }

    FiletypeCheck {
        ext: Some(SVG_EXT.to_string()),
        mime: Some(SVG_MIME.to_string()),
        proper_filename: Some(filename.to_string()),
    }
}

/// Allow the SVG MIME type for size-extraction purposes (MIME → extension).
pub fn add_image_size_ext(mimes: &mut HashMap<String, String>) {
    mimes.insert(SVG_MIME.to_string(), SVG_EXT.to_string());
}

/// SVG filenames count as images even when the host's raster probe says
/// otherwise.
pub fn allow_image_mime(result: bool, filename: &str) -> bool {
    filename.ends_with(".svg") || result
}

/// Suppress responsive-size metadata for vector content; there are no
/// raster variants to pick from.
pub fn disable_srcset(metadata: &mut AttachmentMetadata, mime: &str) {
    if mime == SVG_MIME {
        metadata.sizes.clear();
    }
}
