//! Upload guard checkpoint and lifecycle integration tests

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use svguard::{
    wire, AttachmentId, AttachmentMetadata, AttachmentStore, Error, Options, UploadError,
    UploadFile, UploadGuard, SVG_MIME,
};

const SAFE_SVG: &str = "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"24\" height=\"24\">\
                        <circle cx=\"12\" cy=\"12\" r=\"10\"/></svg>";
const UNSAFE_SVG: &str = "<svg xmlns=\"http://www.w3.org/2000/svg\">\
                          <script>fetch('https://evil.example')</script></svg>";

/// In-memory attachment store with a single record.
struct SingleAttachmentStore {
    mime: String,
    path: PathBuf,
    deleted: AtomicBool,
}

impl SingleAttachmentStore {
    fn new(mime: &str, path: PathBuf) -> Self {
        Self {
            mime: mime.to_string(),
            path,
            deleted: AtomicBool::new(false),
        }
    }

    fn is_deleted(&self) -> bool {
        self.deleted.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AttachmentStore for SingleAttachmentStore {
    async fn attachment_mime(&self, _id: AttachmentId) -> Option<String> {
        if self.is_deleted() {
            None
        } else {
            Some(self.mime.clone())
        }
    }

    async fn attachment_path(&self, _id: AttachmentId) -> Option<PathBuf> {
        if self.is_deleted() {
            None
        } else {
            Some(self.path.clone())
        }
    }

    async fn delete_attachment(&self, _id: AttachmentId) -> svguard::Result<()> {
        self.deleted.store(true, Ordering::SeqCst);
        Ok(())
    }
}

fn write_svg(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn full_pipeline_accepts_safe_upload() {
    let dir = tempfile::tempdir().unwrap();
    let tmp_path = write_svg(&dir, "upload.svg", SAFE_SVG);

    let mut options = Options::default();
    options.set("svg", true).unwrap();
    let dispatcher = wire(&options);

    // Pre-move
    let mut upload = UploadFile::new(&tmp_path, "upload.svg", SVG_MIME, SAFE_SVG.len() as u64);
    dispatcher.pre_move(&mut upload).await;
    assert!(!upload.is_rejected());

    // Post-move (the "move" keeps the same directory here)
    let moved = write_svg(&dir, "moved.svg", SAFE_SVG);
    dispatcher.post_move(&moved, SVG_MIME).await.unwrap();
    assert!(moved.exists());

    // Post-insert
    let store = SingleAttachmentStore::new(SVG_MIME, moved.clone());
    dispatcher.post_insert(&store, 1).await.unwrap();
    assert!(!store.is_deleted());
    assert!(moved.exists());
}

#[tokio::test]
async fn post_insert_deletes_file_and_record() {
    let dir = tempfile::tempdir().unwrap();
    let stored = write_svg(&dir, "stored.svg", UNSAFE_SVG);

    let guard = UploadGuard::new();
    let store = SingleAttachmentStore::new(SVG_MIME, stored.clone());

    let result = guard.validate_attachment(&store, 7).await;
    match result {
        Err(Error::UploadError(e)) => {
            assert_eq!(e, UploadError::Forbidden);
            assert!(e.is_hard_failure());
            assert_eq!(e.http_status(), 403);
        }
        other => panic!("expected Forbidden, got {:?}", other),
    }
    assert!(store.is_deleted());
    assert!(!stored.exists());
}

#[tokio::test]
async fn post_move_ignores_non_svg_uploads() {
    // The host dispatches every lifecycle event regardless of type; a PNG
    // reaching post-move must pass through unread and undeleted.
    let dir = tempfile::tempdir().unwrap();
    let moved = write_svg(&dir, "photo.png", "not an svg, and not checked");

    let mut options = Options::default();
    options.set("svg", true).unwrap();
    let dispatcher = wire(&options);

    dispatcher.post_move(&moved, "image/png").await.unwrap();
    assert!(moved.exists());
}

#[tokio::test]
async fn post_insert_ignores_non_svg_attachments() {
    let dir = tempfile::tempdir().unwrap();
    let stored = write_svg(&dir, "photo.png", "not an svg, and not checked");

    let guard = UploadGuard::new();
    let store = SingleAttachmentStore::new("image/png", stored.clone());

    guard.validate_attachment(&store, 7).await.unwrap();
    assert!(!store.is_deleted());
    assert!(stored.exists());
}

#[tokio::test]
async fn checkpoints_reread_from_disk() {
    // Content swapped after the pre-filter passed must still be caught by
    // the post-move checkpoint.
    let dir = tempfile::tempdir().unwrap();
    let path = write_svg(&dir, "race.svg", SAFE_SVG);

    let guard = UploadGuard::new();
    let mut upload = UploadFile::new(&path, "race.svg", SVG_MIME, SAFE_SVG.len() as u64);
    guard.prefilter(&mut upload).await;
    assert!(!upload.is_rejected());

    std::fs::write(&path, UNSAFE_SVG).unwrap();

    let result = guard.verify_moved(&path).await;
    assert!(result.is_err());
    assert!(!path.exists());
}

#[tokio::test]
async fn disabled_feature_flag_wires_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let tmp_path = write_svg(&dir, "upload.svg", UNSAFE_SVG);

    let dispatcher = wire(&Options::default());
    assert!(dispatcher.is_empty());

    // Even dangerous content passes through untouched: with the flag off
    // the host's own MIME policy is what rejects SVG uploads.
    let mut upload = UploadFile::new(&tmp_path, "upload.svg", SVG_MIME, UNSAFE_SVG.len() as u64);
    dispatcher.pre_move(&mut upload).await;
    assert!(!upload.is_rejected());
}

#[tokio::test]
async fn metadata_generation_merges_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    let stored = write_svg(&dir, "logo.svg", SAFE_SVG);
    let store = SingleAttachmentStore::new(SVG_MIME, stored);

    let mut metadata = AttachmentMetadata::default();
    svguard::upload::metadata::generate(&store, 3, &mut metadata)
        .await
        .unwrap();
    assert_eq!(metadata.width, Some(24));
    assert_eq!(metadata.height, Some(24));
}

#[tokio::test]
async fn metadata_generation_skips_non_svg() {
    let dir = tempfile::tempdir().unwrap();
    let stored = write_svg(&dir, "photo.png", "raster bytes");
    let store = SingleAttachmentStore::new("image/png", stored);

    let mut metadata = AttachmentMetadata::default();
    svguard::upload::metadata::generate(&store, 3, &mut metadata)
        .await
        .unwrap();
    assert_eq!(metadata.width, None);
    assert_eq!(metadata.height, None);
}
