//! In-process [`RecordStore`] keyed by [`RecordRef`].
//!
//! Keeps every patch it receives so callers can inspect exactly what was
//! written, and can be told to reject the next N patches.

use std::collections::HashMap;

use async_trait::async_trait;
use genbatch_core::types::RecordRef;
use tokio::sync::Mutex;

use crate::store::{Fields, RecordError, RecordStore};

#[derive(Default)]
struct Inner {
    records: HashMap<String, Fields>,
    patches: Vec<(RecordRef, Fields)>,
    failing_patches: usize,
}

#[derive(Default)]
pub struct MemoryRecordStore {
    inner: Mutex<Inner>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a record.
    pub async fn insert(&self, record: &RecordRef, fields: Fields) {
        self.inner
            .lock()
            .await
            .records
            .insert(record.to_string(), fields);
    }

    /// Current fields of a record, if it exists.
    pub async fn fields(&self, record: &RecordRef) -> Option<Fields> {
        self.inner.lock().await.records.get(&record.to_string()).cloned()
    }

    /// Every accepted patch in arrival order.
    pub async fn patches(&self) -> Vec<(RecordRef, Fields)> {
        self.inner.lock().await.patches.clone()
    }

    /// Reject the next `n` patch calls with [`RecordError::Unavailable`].
    pub async fn fail_next_patches(&self, n: usize) {
        self.inner.lock().await.failing_patches = n;
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(&self, record: &RecordRef) -> Result<Fields, RecordError> {
        self.inner
            .lock()
            .await
            .records
            .get(&record.to_string())
            .cloned()
            .ok_or_else(|| RecordError::NotFound(record.to_string()))
    }

    async fn patch(&self, record: &RecordRef, fields: Fields) -> Result<(), RecordError> {
        let mut inner = self.inner.lock().await;
        if inner.failing_patches > 0 {
            inner.failing_patches -= 1;
            return Err(RecordError::Unavailable("patch rejected".to_string()));
        }

        let stored = inner
            .records
            .get_mut(&record.to_string())
            .ok_or_else(|| RecordError::NotFound(record.to_string()))?;
        for (name, value) in &fields {
            stored.insert(name.clone(), value.clone());
        }
        inner.patches.push((record.clone(), fields));
        Ok(())
    }
}
