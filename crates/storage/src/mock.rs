//! Mock object storage implementation
//!
//! Stores objects in memory for test assertions. Thread-safe via
//! `Arc<Mutex<>>`. Every upload attempt is recorded (successful or not) so
//! tests can assert on call counts and sequencing, and individual keys can
//! be made to fail.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::{ObjectStorage, StorageError, UploadOptions};

/// Base URL used for mock public URL resolution.
const MOCK_PUBLIC_BASE: &str = "https://storage.mock.designbase.app/public";

/// One object held by the mock store.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub cache_control: Option<Duration>,
}

/// Mock object storage that records uploads for test assertions.
#[derive(Debug, Clone, Default)]
pub struct MockObjectStorage {
    objects: Arc<Mutex<HashMap<String, StoredObject>>>,
    stored_order: Arc<Mutex<Vec<String>>>,
    attempts: Arc<Mutex<Vec<String>>>,
    fail_matching: Arc<Mutex<Option<String>>>,
}

impl MockObjectStorage {
    /// Create a new empty mock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every upload whose key contains `pattern` fail.
    pub fn fail_uploads_matching(&self, pattern: &str) {
        *self
            .fail_matching
            .lock()
            .expect("fail pattern lock poisoned — prior test panicked") = Some(pattern.to_string());
    }

    /// Stop injecting upload failures.
    pub fn clear_upload_failures(&self) {
        *self
            .fail_matching
            .lock()
            .expect("fail pattern lock poisoned — prior test panicked") = None;
    }

    /// Keys of successful uploads, in upload order.
    pub fn uploaded_keys(&self) -> Vec<String> {
        self.stored_order
            .lock()
            .expect("stored order lock poisoned — prior test panicked")
            .clone()
    }

    /// Keys of every upload attempt, successful or not, in call order.
    pub fn attempted_keys(&self) -> Vec<String> {
        self.attempts
            .lock()
            .expect("attempts lock poisoned — prior test panicked")
            .clone()
    }

    /// Number of upload calls made, including failed ones.
    pub fn upload_call_count(&self) -> usize {
        self.attempted_keys().len()
    }

    /// Fetch a stored object by key.
    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .expect("objects lock poisoned — prior test panicked")
            .get(key)
            .cloned()
    }

    /// Clear all stored objects, recorded calls, and injected failures.
    pub fn reset(&self) {
        self.objects
            .lock()
            .expect("objects lock poisoned — prior test panicked")
            .clear();
        self.stored_order
            .lock()
            .expect("stored order lock poisoned — prior test panicked")
            .clear();
        self.attempts
            .lock()
            .expect("attempts lock poisoned — prior test panicked")
            .clear();
        self.clear_upload_failures();
    }
}

#[async_trait::async_trait]
impl ObjectStorage for MockObjectStorage {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        options: &UploadOptions,
    ) -> Result<(), StorageError> {
        self.attempts
            .lock()
            .map_err(|e| StorageError::Upload {
                key: key.to_string(),
                message: format!("attempts lock poisoned: {e}"),
            })?
            .push(key.to_string());

        if let Some(pattern) = self
            .fail_matching
            .lock()
            .map_err(|e| StorageError::Upload {
                key: key.to_string(),
                message: format!("fail pattern lock poisoned: {e}"),
            })?
            .as_deref()
        {
            if key.contains(pattern) {
                return Err(StorageError::Upload {
                    key: key.to_string(),
                    message: "injected storage failure".to_string(),
                });
            }
        }

        let mut objects = self.objects.lock().map_err(|e| StorageError::Upload {
            key: key.to_string(),
            message: format!("objects lock poisoned: {e}"),
        })?;

        if !options.overwrite && objects.contains_key(key) {
            return Err(StorageError::AlreadyExists {
                key: key.to_string(),
            });
        }

        tracing::debug!(key, size = bytes.len(), "Mock storage: recording upload");
        objects.insert(
            key.to_string(),
            StoredObject {
                bytes,
                cache_control: options.cache_control,
            },
        );
        self.stored_order
            .lock()
            .map_err(|e| StorageError::Upload {
                key: key.to_string(),
                message: format!("stored order lock poisoned: {e}"),
            })?
            .push(key.to_string());
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", MOCK_PUBLIC_BASE, key)
    }
}
