//! Batch upload workflow for project assets
//!
//! An `UploadSession` stages user-chosen files in memory, then uploads them
//! strictly sequentially: derive a randomized storage key, upload the bytes
//! with write-once semantics, resolve a thumbnail URL for raster images, and
//! insert one metadata row per file. The first failing step halts the whole
//! batch; files before the failure point are already durable and are not
//! rolled back. The session keeps the full pending list on failure so a
//! manual re-submit re-attempts every file under fresh keys.
//!
//! Collaborators are injected (`ObjectStorage`, `AssetSink`) so the session
//! runs unchanged against the real backends or the in-crate mocks.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use designbase_common::{Error, Result, StateError};
use designbase_storage::keys::sanitize_file_name;
use designbase_storage::{ObjectStorage, UploadOptions};

use crate::domain::entities::{asset_storage_key, is_raster_image, Asset};
use crate::domain::state::{SessionEvent, SessionState, SessionStateMachine};

/// Error reported when submit is called with nothing staged.
pub const NO_FILES_MESSAGE: &str = "No files to upload.";

/// Error surfaced when a submit is canceled between files.
pub const CANCELED_MESSAGE: &str = "Upload canceled.";

/// Cache-control hint applied to every asset upload.
const UPLOAD_CACHE_CONTROL: Duration = Duration::from_secs(3600);

/// A file chosen for upload, before staging.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// One staged file. Exists only for the duration of a session; never
/// persisted.
#[derive(Debug, Clone)]
pub struct PendingFile {
    pub id: Uuid,
    pub name: String,
    pub bytes: Vec<u8>,
    pub selected: bool,
}

/// Insert seam for asset metadata rows. Implemented by the Postgres
/// repository and by `MockAssetSink` for tests.
#[async_trait::async_trait]
pub trait AssetSink: Send + Sync {
    /// Insert one asset row, returning the stored row.
    async fn insert(&self, asset: &Asset) -> Result<Asset>;
}

type ProgressFn = Box<dyn Fn(&str) + Send + Sync>;
type CompleteFn = Box<dyn Fn() + Send + Sync>;

/// One batch upload workflow instance targeting a single project.
pub struct UploadSession {
    project_id: Uuid,
    storage: Arc<dyn ObjectStorage>,
    sink: Arc<dyn AssetSink>,
    pending: Vec<PendingFile>,
    state: SessionState,
    progress: Option<String>,
    last_error: Option<String>,
    on_progress: Option<ProgressFn>,
    on_complete: Option<CompleteFn>,
    cancel: CancellationToken,
}

impl UploadSession {
    /// Create a session for a project with injected collaborators.
    pub fn new(project_id: Uuid, storage: Arc<dyn ObjectStorage>, sink: Arc<dyn AssetSink>) -> Self {
        Self {
            project_id,
            storage,
            sink,
            pending: Vec::new(),
            state: SessionState::Idle,
            progress: None,
            last_error: None,
            on_progress: None,
            on_complete: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Observe progress text (`Uploading i/N: name`) as the batch advances.
    pub fn on_progress(mut self, observer: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Box::new(observer));
        self
    }

    /// Invoke a callback once after a fully successful batch.
    pub fn on_complete(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Token that cancels an in-flight submit between files.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn project_id(&self) -> Uuid {
        self.project_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Staged files, in staging order.
    pub fn pending(&self) -> &[PendingFile] {
        &self.pending
    }

    pub fn file_count(&self) -> usize {
        self.pending.len()
    }

    /// Last progress text, if a submit is (or was) running.
    pub fn progress_text(&self) -> Option<&str> {
        self.progress.as_deref()
    }

    /// Last surfaced error, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Stage files for upload. Each file gets a fresh random identifier and
    /// starts unselected; order is preserved and duplicate names are
    /// permitted. An empty selection is a no-op, as is any call while a
    /// submit is running or after the session closed.
    pub fn add_files(&mut self, files: Vec<FileUpload>) {
        if self.state == SessionState::Submitting || self.state == SessionState::Done {
            return;
        }
        if files.is_empty() {
            return;
        }
        for file in files {
            self.pending.push(PendingFile {
                id: Uuid::new_v4(),
                name: file.name,
                bytes: file.bytes,
                selected: false,
            });
        }
        // Idle -> Staged or Staged -> Staged; both always valid here
        let _ = self.apply(SessionEvent::AddFiles);
    }

    /// Flip one entry's selected flag. Unknown identifiers are a silent
    /// no-op.
    pub fn toggle_selected(&mut self, id: Uuid) {
        if self.state == SessionState::Submitting || self.state == SessionState::Done {
            return;
        }
        for file in &mut self.pending {
            if file.id == id {
                file.selected = !file.selected;
            }
        }
    }

    /// Drop every selected entry, preserving the order of survivors. A
    /// no-op when nothing is selected.
    pub fn remove_selected(&mut self) {
        if self.state == SessionState::Submitting || self.state == SessionState::Done {
            return;
        }
        if !self.pending.iter().any(|f| f.selected) {
            return;
        }
        self.pending.retain(|f| !f.selected);
        if self.pending.is_empty() {
            // Staged -> Idle; always valid here
            let _ = self.apply(SessionEvent::ClearPending);
        }
    }

    /// Upload the staged batch, strictly sequentially and in staging order.
    ///
    /// Per file: advance progress, derive the storage key, upload with
    /// write-once semantics and a 1-hour cache hint, resolve a thumbnail
    /// URL for raster images, insert the metadata row. The first failure
    /// halts the batch and returns the session to `Staged` with the entire
    /// pending list intact and the backend's message surfaced. On success
    /// the pending list is cleared, the completion callback fires once, and
    /// the session closes.
    pub async fn submit(&mut self) -> Result<Vec<Asset>> {
        if self.pending.is_empty() {
            self.last_error = Some(NO_FILES_MESSAGE.to_string());
            return Err(Error::Validation(NO_FILES_MESSAGE.to_string()));
        }

        self.apply(SessionEvent::Submit)?;
        self.progress = None;
        self.last_error = None;

        let total = self.pending.len();
        let mut inserted = Vec::with_capacity(total);

        for index in 0..total {
            if self.cancel.is_cancelled() {
                tracing::info!(project_id = %self.project_id, "Upload batch canceled");
                self.halt(SessionEvent::Cancel, CANCELED_MESSAGE.to_string());
                return Err(Error::Canceled(CANCELED_MESSAGE.to_string()));
            }

            let (name, bytes) = {
                let file = &self.pending[index];
                (file.name.clone(), file.bytes.clone())
            };
            self.report_progress(index + 1, total, &name);

            let key = asset_storage_key(
                self.project_id,
                Utc::now().date_naive(),
                Uuid::new_v4(),
                &name,
            );
            let size = bytes.len() as i64;
            let options = UploadOptions {
                overwrite: false,
                cache_control: Some(UPLOAD_CACHE_CONTROL),
            };

            if let Err(e) = self.storage.upload(&key, bytes, &options).await {
                let message = e.to_string();
                tracing::warn!(
                    project_id = %self.project_id,
                    key = %key,
                    error = %message,
                    "Asset upload failed; halting batch"
                );
                self.halt(SessionEvent::Fail, message.clone());
                return Err(Error::Storage(message));
            }

            let thumb_url = is_raster_image(&name).then(|| self.storage.public_url(&key));

            let asset = Asset::new(
                self.project_id,
                sanitize_file_name(&name),
                key.clone(),
                Some(size),
                thumb_url,
                None,
            );
            let asset = match asset {
                Ok(asset) => asset,
                Err(e) => {
                    let message = e.to_string();
                    tracing::warn!(
                        project_id = %self.project_id,
                        key = %key,
                        error = %message,
                        "Asset row rejected; uploaded object is orphaned"
                    );
                    self.halt(SessionEvent::Fail, message);
                    return Err(e);
                }
            };

            match self.sink.insert(&asset).await {
                Ok(stored) => inserted.push(stored),
                Err(e) => {
                    let message = e.to_string();
                    // The object at `key` stays behind; no compensating delete.
                    tracing::warn!(
                        project_id = %self.project_id,
                        key = %key,
                        error = %message,
                        "Asset insert failed; uploaded object is orphaned"
                    );
                    self.halt(SessionEvent::Fail, message);
                    return Err(e);
                }
            }
        }

        self.pending.clear();
        self.progress = None;
        self.last_error = None;
        self.apply(SessionEvent::Complete)?;
        if let Some(on_complete) = &self.on_complete {
            on_complete();
        }
        tracing::info!(project_id = %self.project_id, count = total, "Upload batch completed");
        Ok(inserted)
    }

    fn report_progress(&mut self, current: usize, total: usize, name: &str) {
        let text = format!("Uploading {}/{}: {}", current, total, name);
        tracing::info!(project_id = %self.project_id, "{}", text);
        if let Some(on_progress) = &self.on_progress {
            on_progress(&text);
        }
        self.progress = Some(text);
    }

    /// Halt a running submit: clear progress, surface the error, and step
    /// the state machine back out of `Submitting`.
    fn halt(&mut self, event: SessionEvent, message: String) {
        self.progress = None;
        self.last_error = Some(message);
        // Submitting -> Staged via Fail or Cancel; always valid mid-submit
        let _ = self.apply(event);
    }

    fn apply(&mut self, event: SessionEvent) -> Result<()> {
        let next = SessionStateMachine::transition(self.state, event).map_err(|e| match e {
            StateError::InvalidTransition { from, event } => Error::Validation(format!(
                "Invalid session transition: cannot apply '{}' event from '{}' state",
                event, from
            )),
            StateError::TerminalState(state) => Error::Validation(format!(
                "Session is in terminal state '{}' and cannot transition",
                state
            )),
        })?;
        self.state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockAssetSink;
    use designbase_storage::mock::MockObjectStorage;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn file(name: &str, bytes: &[u8]) -> FileUpload {
        FileUpload {
            name: name.to_string(),
            bytes: bytes.to_vec(),
        }
    }

    fn session() -> (UploadSession, MockObjectStorage, MockAssetSink) {
        let storage = MockObjectStorage::new();
        let sink = MockAssetSink::new();
        let session = UploadSession::new(
            Uuid::new_v4(),
            Arc::new(storage.clone()),
            Arc::new(sink.clone()),
        );
        (session, storage, sink)
    }

    // ========================================================================
    // Staging: add files
    // ========================================================================

    #[test]
    fn test_add_files_appends_preserving_order() {
        let (mut session, _storage, _sink) = session();

        session.add_files(vec![file("a.png", b"a"), file("b.txt", b"b")]);
        session.add_files(vec![file("c.gif", b"c")]);

        let names: Vec<&str> = session.pending().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.txt", "c.gif"]);
        assert_eq!(session.file_count(), 3);
        assert_eq!(session.state(), SessionState::Staged);
        assert!(session.pending().iter().all(|f| !f.selected));
    }

    #[test]
    fn test_add_files_empty_is_noop() {
        let (mut session, _storage, _sink) = session();
        session.add_files(Vec::new());
        assert_eq!(session.file_count(), 0);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_add_files_permits_duplicate_names() {
        let (mut session, _storage, _sink) = session();
        session.add_files(vec![file("a.png", b"1"), file("a.png", b"2")]);

        assert_eq!(session.file_count(), 2);
        assert_ne!(session.pending()[0].id, session.pending()[1].id);
    }

    // ========================================================================
    // Staging: toggle selection
    // ========================================================================

    #[test]
    fn test_toggle_twice_restores_selection() {
        let (mut session, _storage, _sink) = session();
        session.add_files(vec![file("a.png", b"a"), file("b.txt", b"b")]);
        let id = session.pending()[0].id;

        session.toggle_selected(id);
        assert!(session.pending()[0].selected);
        assert!(!session.pending()[1].selected);

        session.toggle_selected(id);
        assert!(!session.pending()[0].selected);
    }

    #[test]
    fn test_toggle_unknown_id_is_noop() {
        let (mut session, _storage, _sink) = session();
        session.add_files(vec![file("a.png", b"a")]);

        session.toggle_selected(Uuid::new_v4());

        assert_eq!(session.file_count(), 1);
        assert!(!session.pending()[0].selected);
    }

    // ========================================================================
    // Staging: remove selected
    // ========================================================================

    #[test]
    fn test_remove_selected_preserves_order_of_survivors() {
        let (mut session, _storage, _sink) = session();
        session.add_files(vec![
            file("a.png", b"a"),
            file("b.txt", b"b"),
            file("c.gif", b"c"),
        ]);
        let middle = session.pending()[1].id;

        session.toggle_selected(middle);
        session.remove_selected();

        let names: Vec<&str> = session.pending().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "c.gif"]);
    }

    #[test]
    fn test_remove_selected_is_idempotent() {
        let (mut session, _storage, _sink) = session();
        session.add_files(vec![file("a.png", b"a"), file("b.txt", b"b")]);
        session.toggle_selected(session.pending()[0].id);

        session.remove_selected();
        let after_first: Vec<Uuid> = session.pending().iter().map(|f| f.id).collect();

        session.remove_selected();
        let after_second: Vec<Uuid> = session.pending().iter().map(|f| f.id).collect();

        assert_eq!(after_first, after_second);
    }

    #[test]
    fn test_remove_all_returns_to_idle() {
        let (mut session, _storage, _sink) = session();
        session.add_files(vec![file("a.png", b"a")]);
        session.toggle_selected(session.pending()[0].id);

        session.remove_selected();

        assert_eq!(session.file_count(), 0);
        assert_eq!(session.state(), SessionState::Idle);
    }

    // ========================================================================
    // Submit: empty batch
    // ========================================================================

    #[tokio::test]
    async fn test_submit_empty_performs_no_io() {
        let (mut session, storage, sink) = session();

        let err = session.submit().await.unwrap_err();

        assert!(err.to_string().contains(NO_FILES_MESSAGE));
        assert_eq!(session.last_error(), Some(NO_FILES_MESSAGE));
        assert_eq!(storage.upload_call_count(), 0);
        assert_eq!(sink.insert_call_count(), 0);
        assert_eq!(session.state(), SessionState::Idle);
    }

    // ========================================================================
    // Submit: success
    // ========================================================================

    #[tokio::test]
    async fn test_submit_uploads_and_inserts_every_file_in_order() {
        let (session, storage, sink) = session();
        let completions = Arc::new(AtomicUsize::new(0));
        let counter = completions.clone();
        let mut session = session.on_complete(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        session.add_files(vec![
            file("floor plan.png", b"plan"),
            file("notes.txt", b"notes"),
            file("site.webp", b"site"),
        ]);
        let project_id = session.project_id();

        let assets = session.submit().await.unwrap();

        // N upload calls and N insert calls, interleaved per file, in order
        assert_eq!(storage.upload_call_count(), 3);
        assert_eq!(sink.insert_call_count(), 3);
        let keys = storage.uploaded_keys();
        for (asset, key) in assets.iter().zip(&keys) {
            assert_eq!(&asset.storage_key, key);
        }

        // Keys carry the project prefix and the sanitized file name
        assert!(keys[0].starts_with(&format!("{}/", project_id)));
        assert!(keys[0].ends_with("_floor_plan.png"));
        assert!(keys[1].ends_with("_notes.txt"));

        // File names stored sanitized, sizes recorded
        assert_eq!(assets[0].file_name, "floor_plan.png");
        assert_eq!(assets[0].file_size, Some(4));

        // Session closed
        assert_eq!(session.file_count(), 0);
        assert_eq!(session.state(), SessionState::Done);
        assert!(session.progress_text().is_none());
        assert!(session.last_error().is_none());
        assert_eq!(completions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_submit_reports_progress_before_each_file() {
        let (session, _storage, _sink) = session();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = seen.clone();
        let mut session = session.on_progress(move |text| {
            sink_seen.lock().unwrap().push(text.to_string());
        });

        session.add_files(vec![file("a.png", b"a"), file("b.txt", b"b")]);
        session.submit().await.unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["Uploading 1/2: a.png", "Uploading 2/2: b.txt"]
        );
    }

    #[tokio::test]
    async fn test_thumbnail_present_iff_raster_extension() {
        let (mut session, storage, _sink) = session();
        session.add_files(vec![
            file("photo.PNG", b"p"),
            file("doc.pdf", b"d"),
            file("anim.gif", b"g"),
            file("archive.tar.gz", b"z"),
        ]);

        let assets = session.submit().await.unwrap();

        assert_eq!(
            assets[0].thumb_url.as_deref(),
            Some(storage.public_url(&assets[0].storage_key).as_str())
        );
        assert!(assets[1].thumb_url.is_none());
        assert!(assets[2].thumb_url.is_some());
        assert!(assets[3].thumb_url.is_none());
    }

    // ========================================================================
    // Submit: upload failure at file k
    // ========================================================================

    #[tokio::test]
    async fn test_upload_failure_halts_batch_and_keeps_pending() {
        let (mut session, storage, sink) = session();
        storage.fail_uploads_matching("boom");

        session.add_files(vec![
            file("a.png", b"a"),
            file("boom.txt", b"b"),
            file("c.gif", b"c"),
        ]);

        let err = session.submit().await.unwrap_err();

        // Exactly k upload calls and k-1 insert calls
        assert_eq!(storage.upload_call_count(), 2);
        assert_eq!(sink.insert_call_count(), 1);

        // All N files still pending, session back to Staged
        assert_eq!(session.file_count(), 3);
        assert_eq!(session.state(), SessionState::Staged);
        assert!(session.progress_text().is_none());

        // Displayed error equals the backend's reported message
        let backend_message = format!(
            "Upload failed for {}: injected storage failure",
            storage.attempted_keys()[1]
        );
        assert_eq!(session.last_error(), Some(backend_message.as_str()));
        assert_eq!(err.to_string(), format!("Storage error: {backend_message}"));
    }

    #[tokio::test]
    async fn test_resubmit_after_failure_reattempts_every_file() {
        let (mut session, storage, sink) = session();
        storage.fail_uploads_matching("boom");

        session.add_files(vec![file("a.png", b"a"), file("boom.txt", b"b")]);
        session.submit().await.unwrap_err();

        storage.clear_upload_failures();
        let assets = session.submit().await.unwrap();

        // At-least-once: the first file was re-uploaded under a fresh key
        assert_eq!(assets.len(), 2);
        assert_eq!(storage.upload_call_count(), 4);
        assert_eq!(sink.inserted_assets().len(), 3);
        assert_eq!(session.state(), SessionState::Done);
    }

    // ========================================================================
    // Submit: metadata insert failure
    // ========================================================================

    #[tokio::test]
    async fn test_insert_failure_halts_batch_and_orphans_object() {
        let (mut session, storage, sink) = session();
        sink.fail_inserts_matching("b.png");

        session.add_files(vec![file("a.png", b"a"), file("b.png", b"b")]);

        let err = session.submit().await.unwrap_err();

        // Both uploads happened; only the first row landed
        assert_eq!(storage.upload_call_count(), 2);
        assert_eq!(sink.insert_call_count(), 2);
        assert_eq!(sink.inserted_assets().len(), 1);

        // The second object was uploaded and is now orphaned
        let orphan_key = &storage.uploaded_keys()[1];
        assert!(storage.object(orphan_key).is_some());

        assert_eq!(session.file_count(), 2);
        assert_eq!(session.state(), SessionState::Staged);
        assert_eq!(session.last_error(), Some(err.to_string().as_str()));
    }

    // ========================================================================
    // Submit: cancellation
    // ========================================================================

    #[tokio::test]
    async fn test_canceled_submit_halts_before_processing() {
        let (mut session, storage, sink) = session();
        session.add_files(vec![file("a.png", b"a"), file("b.txt", b"b")]);

        session.cancellation_token().cancel();
        let err = session.submit().await.unwrap_err();

        assert!(matches!(err, Error::Canceled(_)));
        assert_eq!(storage.upload_call_count(), 0);
        assert_eq!(sink.insert_call_count(), 0);
        assert_eq!(session.file_count(), 2);
        assert_eq!(session.state(), SessionState::Staged);
        assert_eq!(session.last_error(), Some(CANCELED_MESSAGE));
    }

    // ========================================================================
    // Submitting guards
    // ========================================================================

    #[tokio::test]
    async fn test_done_session_rejects_further_submits() {
        let (mut session, _storage, _sink) = session();
        session.add_files(vec![file("a.png", b"a")]);
        session.submit().await.unwrap();

        session.add_files(vec![file("b.txt", b"b")]);
        assert_eq!(session.file_count(), 0);

        let err = session.submit().await.unwrap_err();
        assert!(err.to_string().contains(NO_FILES_MESSAGE));
    }
}
