//! SVG upload sanitization library
//! Decides, before an untrusted SVG file is persisted or served, whether its
//! content is safe to store and later render in a browser context. Verdicts
//! are strictly accept/reject; the file is never rewritten to make it safe.

// Configuration and errors
pub mod config;
pub mod error;

// Content sanitization: pattern ruleset, entity decoding, XML validation
pub mod sanitizer;

// Upload lifecycle: guard checkpoints, MIME registration, metadata
pub mod lifecycle;
pub mod upload;

// Re-exports for crate consumers
pub use config::Options;
pub use error::{Error, Result, UploadError};
pub use lifecycle::{wire, LifecycleDispatcher, SvgUploadHooks, UploadHooks};
pub use sanitizer::Sanitizer;
pub use upload::guard::{UploadFile, UploadGuard};
pub use upload::metadata::{extract_dimensions, AttachmentMetadata, SizeVariant};
pub use upload::mime::{FiletypeCheck, SVG_EXT, SVG_MIME};
pub use upload::{AttachmentId, AttachmentStore};
