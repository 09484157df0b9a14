//! Typed upload-lifecycle dispatcher
//! The host exposes three named, ordered extension points around its upload
//! handling. Hooks are explicit trait implementations registered up front,
//! not string-keyed callbacks; with the feature flag off, nothing registers
//! and uploads behave exactly as the unmodified host platform.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::Options;
use crate::error::Result;
use crate::upload::guard::{UploadFile, UploadGuard};
use crate::upload::mime::SVG_MIME;
use crate::upload::{AttachmentId, AttachmentStore};

/// Extension points around the host's upload lifecycle, invoked in
/// registration order.
#[async_trait]
pub trait UploadHooks: Send + Sync {
    /// Before the host moves the uploaded file into place. Rejections are
    /// recorded on the upload record; the host aborts the move.
    async fn pre_move(&self, file: &mut UploadFile);

    /// After the host moved the file to its final path. `mime` is the
    /// upload's declared MIME type; hooks not interested in it return `Ok`.
    async fn post_move(&self, path: &Path, mime: &str) -> Result<()>;

    /// After the host created its persisted attachment record.
    async fn post_insert(&self, store: &dyn AttachmentStore, id: AttachmentId) -> Result<()>;
}

/// Dispatches lifecycle events to registered hooks, in order. Post-move and
/// post-insert short-circuit on the first error; pre-move runs every hook,
/// relying on the first-rejection-wins rule of the upload record.
#[derive(Default)]
pub struct LifecycleDispatcher {
    hooks: Vec<Arc<dyn UploadHooks>>,
}

impl LifecycleDispatcher {
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    pub fn register(&mut self, hook: Arc<dyn UploadHooks>) {
        self.hooks.push(hook);
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub async fn pre_move(&self, file: &mut UploadFile) {
        for hook in &self.hooks {
            hook.pre_move(file).await;
        }
    }

    pub async fn post_move(&self, path: &Path, mime: &str) -> Result<()> {
        for hook in &self.hooks {
            hook.post_move(path, mime).await?;
        }
        Ok(())
    }

    pub async fn post_insert(&self, store: &dyn AttachmentStore, id: AttachmentId) -> Result<()> {
        for hook in &self.hooks {
            hook.post_insert(store, id).await?;
        }
        Ok(())
    }
}

/// SVG validation hooks backed by the upload guard's three checkpoints.
#[derive(Debug, Default)]
pub struct SvgUploadHooks {
    guard: UploadGuard,
}

impl SvgUploadHooks {
    pub fn new() -> Self {
        Self {
            guard: UploadGuard::new(),
        }
    }
}

#[async_trait]
impl UploadHooks for SvgUploadHooks {
    async fn pre_move(&self, file: &mut UploadFile) {
        self.guard.prefilter(file).await;
    }

    async fn post_move(&self, path: &Path, mime: &str) -> Result<()> {
        if mime != SVG_MIME {
            return Ok(());
        }
        self.guard.verify_moved(path).await.map(|_| ())
    }

    async fn post_insert(&self, store: &dyn AttachmentStore, id: AttachmentId) -> Result<()> {
        self.guard.validate_attachment(store, id).await
    }
}

/// Wire up the pipeline according to the feature flags. With `svg` disabled
/// the dispatcher stays empty and SVG uploads fall back to the host's
/// default MIME policy (rejected).
pub fn wire(options: &Options) -> LifecycleDispatcher {
    let mut dispatcher = LifecycleDispatcher::new();
    if options.svg {
        info!("SVG upload validation enabled");
        dispatcher.register(Arc::new(SvgUploadHooks::new()));
    }
    dispatcher
}
