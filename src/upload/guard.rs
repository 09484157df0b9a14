//! Upload guard checkpoints
//! Three independent checkpoints (pre-filter, post-move, post-insert) guard
//! against any single one being bypassed by a race, a direct API call, or a
//! plugin that sideloads files without going through the declared pipeline.
//! Content is re-read from disk at every checkpoint; the file may have
//! changed in between, so re-reading is the correctness mechanism, not an
//! optimization.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::error::{Result, UploadError};
use crate::sanitizer::Sanitizer;
use crate::upload::mime::SVG_MIME;
use crate::upload::{AttachmentId, AttachmentStore};

/// Transient upload record handed over by the host before the file is moved
/// into place. Mutated only to set `error`; the host surfaces the error to
/// the end user and aborts persistence.
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Temporary path the uploaded bytes were spooled to.
    pub tmp_path: PathBuf,
    /// Declared file name.
    pub name: String,
    /// Declared MIME type.
    pub mime: String,
    /// Declared size in bytes.
    pub size: u64,
    /// Rejection slot; once set, no later check overwrites it.
    pub error: Option<UploadError>,
}

impl UploadFile {
    pub fn new(
        tmp_path: impl Into<PathBuf>,
        name: impl Into<String>,
        mime: impl Into<String>,
        size: u64,
    ) -> Self {
        Self {
            tmp_path: tmp_path.into(),
            name: name.into(),
            mime: mime.into(),
            size,
            error: None,
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.error.is_some()
    }
}

/// Mediates the host's upload lifecycle for SVG files.
#[derive(Debug, Default)]
pub struct UploadGuard;

impl UploadGuard {
    /// Maximum SVG file size in bytes (5MB).
    pub const MAX_SIZE: u64 = 5_242_880;

    pub fn new() -> Self {
        Self
    }

    /// Pre-filter checkpoint, before the host moves the file into place.
    ///
    /// Applies only to uploads declared as `image/svg+xml`. Checks run in
    /// order: extension, size, content. The size and extension gates run
    /// strictly before content inspection, so rejected input never pays the
    /// parse cost. First rejection wins.
    #[instrument(skip(self, file), fields(name = %file.name))]
    pub async fn prefilter(&self, file: &mut UploadFile) {
        if file.mime != SVG_MIME || file.error.is_some() {
            return;
        }

        if !has_svg_extension(&file.name) {
            debug!("Rejected upload: extension is not .svg");
            file.error = Some(UploadError::InvalidFileType);
            return;
        }

        if file.size > Self::MAX_SIZE {
            debug!("Rejected upload: {} bytes exceeds limit", file.size);
            file.error = Some(UploadError::ExceedsSizeLimit);
            return;
        }

        if !self.validate_content(&file.tmp_path).await {
            info!("Rejected upload {}: dangerous content", file.name);
            file.error = Some(UploadError::DangerousContent);
        }
    }

    /// Post-move checkpoint, run against the moved file's real path.
    ///
    /// Re-verifies content after the host has moved the file, defending
    /// against races and symlink tricks between pre-filter time and the
    /// final path. On content rejection the file is deleted before the
    /// error is returned. Returns the resolved path on success.
    #[instrument(skip(self))]
    pub async fn verify_moved(&self, path: &Path) -> Result<PathBuf> {
        let real = tokio::fs::canonicalize(path)
            .await
            .map_err(|_| UploadError::InvalidFilePath)?;

        let meta = tokio::fs::metadata(&real)
            .await
            .map_err(|_| UploadError::InvalidFilePath)?;
        if !meta.is_file() {
            return Err(UploadError::InvalidFilePath.into());
        }

        let content = tokio::fs::read(&real)
            .await
            .map_err(|_| UploadError::InvalidFilePath)?;

        if !Sanitizer::is_valid_bytes(&content) {
            info!("Post-move verification failed, deleting {:?}", real);
            if let Err(e) = tokio::fs::remove_file(&real).await {
                warn!("Failed to delete rejected file {:?}: {}", real, e);
            }
            return Err(UploadError::DangerousContent.into());
        }

        Ok(real)
    }

    /// Post-insert checkpoint, after the host has created its persisted
    /// attachment record.
    ///
    /// Re-reads the stored file by attachment identity and re-runs the
    /// sanitizer. On failure both the file and the attachment record are
    /// deleted and a forbidden-class error terminates the request; at this
    /// point unsafe content may already be referenced elsewhere.
    #[instrument(skip(self, store))]
    pub async fn validate_attachment(
        &self,
        store: &dyn AttachmentStore,
        id: AttachmentId,
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
        if tokio::fs::metadata(&path).await.is_err() {
            // Nothing stored on disk, nothing reachable
            return Ok(());
        }

        // Absence of evidence of safety is evidence of danger: an unreadable
        // stored file is treated exactly like dangerous content.
        let valid = match tokio::fs::read(&path).await {
            Ok(content) => Sanitizer::is_valid_bytes(&content),
            Err(e) => {
                warn!("Cannot re-read attachment {}: {}", id, e);
                false
            }
        };

        if !valid {
            info!("Post-insert verification failed, deleting attachment {}", id);
            if let Err(e) = tokio::fs::remove_file(&path).await {
                warn!("Failed to delete rejected file {:?}: {}", path, e);
            }
            store.delete_attachment(id).await?;
            return Err(UploadError::Forbidden.into());
        }

        Ok(())
    }

    /// Resolve the candidate path and run the sanitizer over its content.
    /// Any I/O failure is a rejection, never a pass-through.
    async fn validate_content(&self, path: &Path) -> bool {
        let Ok(real) = tokio::fs::canonicalize(path).await else {
            debug!("Cannot resolve upload path {:?}", path);
            return false;
        };
        let Ok(content) = tokio::fs::read(&real).await else {
            debug!("Cannot read upload {:?}", real);
            return false;
        };
        Sanitizer::is_valid_bytes(&content)
    }
}

fn has_svg_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("svg"))
        .unwrap_or(false)
}
