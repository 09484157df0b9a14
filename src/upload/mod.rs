//! Upload-side surfaces: guard checkpoints, MIME registration and
//! attachment metadata generation.

pub mod guard;
pub mod metadata;
pub mod mime;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::Result;

/// Host-assigned identity of a persisted attachment record.
pub type AttachmentId = u64;

/// Host-side storage of persisted attachment records.
///
/// The post-insert checkpoint reads stored files by attachment identity
/// through this seam, and deletes the record when stored content fails
/// re-validation.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Declared MIME type of the attachment, if it exists.
    async fn attachment_mime(&self, id: AttachmentId) -> Option<String>;

    /// Path of the stored file backing the attachment, if any.
    async fn attachment_path(&self, id: AttachmentId) -> Option<PathBuf>;

    /// Remove the attachment record from the host's storage.
    async fn delete_attachment(&self, id: AttachmentId) -> Result<()>;
}
