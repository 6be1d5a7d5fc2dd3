//! Mock asset sink implementation
//!
//! Records inserted rows in memory for test assertions. Thread-safe via
//! `Arc<Mutex<>>`. Individual file names can be made to fail so tests can
//! drive the workflow's halt-on-insert-failure path.

use std::sync::{Arc, Mutex};

use designbase_common::{Error, Result};

use crate::domain::entities::Asset;
use crate::domain::session::AssetSink;

/// Mock asset sink that records inserts for test assertions.
#[derive(Debug, Clone, Default)]
pub struct MockAssetSink {
    inserted: Arc<Mutex<Vec<Asset>>>,
    calls: Arc<Mutex<usize>>,
    fail_matching: Arc<Mutex<Option<String>>>,
}

impl MockAssetSink {
    /// Create a new empty mock sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every insert whose file name contains `pattern` fail.
    pub fn fail_inserts_matching(&self, pattern: &str) {
        *self
            .fail_matching
            .lock()
            .expect("fail pattern lock poisoned — prior test panicked") = Some(pattern.to_string());
    }

    /// Stop injecting insert failures.
    pub fn clear_insert_failures(&self) {
        *self
            .fail_matching
            .lock()
            .expect("fail pattern lock poisoned — prior test panicked") = None;
    }

    /// Rows inserted so far, in insert order.
    pub fn inserted_assets(&self) -> Vec<Asset> {
        self.inserted
            .lock()
            .expect("inserted lock poisoned — prior test panicked")
            .clone()
    }

    /// Number of insert calls made, including failed ones.
    pub fn insert_call_count(&self) -> usize {
        *self
            .calls
            .lock()
            .expect("calls lock poisoned — prior test panicked")
    }

    /// Clear all recorded rows, calls, and injected failures.
    pub fn reset(&self) {
        self.inserted
            .lock()
            .expect("inserted lock poisoned — prior test panicked")
            .clear();
        *self
            .calls
            .lock()
            .expect("calls lock poisoned — prior test panicked") = 0;
        self.clear_insert_failures();
    }
}

#[async_trait::async_trait]
impl AssetSink for MockAssetSink {
    async fn insert(&self, asset: &Asset) -> Result<Asset> {
        *self
            .calls
            .lock()
            .map_err(|e| Error::Internal(format!("calls lock poisoned: {e}")))? += 1;

        if let Some(pattern) = self
            .fail_matching
            .lock()
            .map_err(|e| Error::Internal(format!("fail pattern lock poisoned: {e}")))?
            .as_deref()
        {
            if asset.file_name.contains(pattern) {
                return Err(Error::Internal("injected insert failure".to_string()));
            }
        }

        tracing::debug!(file_name = %asset.file_name, "Mock sink: recording insert");
        self.inserted
            .lock()
            .map_err(|e| Error::Internal(format!("inserted lock poisoned: {e}")))?
            .push(asset.clone());
        Ok(asset.clone())
    }
}
