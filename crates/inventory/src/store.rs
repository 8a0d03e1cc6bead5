//! Line storage abstraction.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use tallyscan_core::LineId;

use crate::line::{InventoryLine, LineKey};

/// Storage error.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be opened. Only returned at startup; nothing can
    /// be recorded until it is resolved.
    #[error("storage initialization failed: {0}")]
    Initialization(String),
    /// A single read or write failed; the triggering scan was not committed.
    #[error("storage operation failed: {0}")]
    Operation(String),
}

impl StoreError {
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }

    pub fn initialization(msg: impl Into<String>) -> Self {
        Self::Initialization(msg.into())
    }
}

/// Persistent home of inventory lines.
///
/// Calls are awaited one at a time by the ledger; implementations do not need
/// to guard against two concurrent writes to the same line.
#[async_trait]
pub trait LineStore: Send + Sync {
    /// All lines, oldest first.
    async fn get_all(&self) -> Result<Vec<InventoryLine>, StoreError>;

    /// Insert or replace the line with `line.id`.
    async fn put(&self, line: InventoryLine) -> Result<(), StoreError>;

    /// Remove a line. Removing a missing id is not an error.
    async fn delete(&self, id: LineId) -> Result<(), StoreError>;

    async fn clear(&self) -> Result<(), StoreError>;

    /// Lines with exactly `key` (0 or 1 in practice).
    async fn find_by_key(&self, key: &LineKey) -> Result<Vec<InventoryLine>, StoreError>;
}

#[async_trait]
impl<S> LineStore for Arc<S>
where
    S: LineStore + ?Sized,
{
    async fn get_all(&self) -> Result<Vec<InventoryLine>, StoreError> {
        (**self).get_all().await
    }

    async fn put(&self, line: InventoryLine) -> Result<(), StoreError> {
        (**self).put(line).await
    }

    async fn delete(&self, id: LineId) -> Result<(), StoreError> {
        (**self).delete(id).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        (**self).clear().await
    }

    async fn find_by_key(&self, key: &LineKey) -> Result<Vec<InventoryLine>, StoreError> {
        (**self).find_by_key(key).await
    }
}

/// In-memory line store for tests/dev.
///
/// Ordered by [`LineId`], which is time-ordered, so `get_all` returns lines
/// in creation order.
#[derive(Debug, Default)]
pub struct InMemoryLineStore {
    lines: RwLock<BTreeMap<LineId, InventoryLine>>,
}

impl InMemoryLineStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn poisoned() -> StoreError {
        StoreError::operation("lock poisoned")
    }
}

#[async_trait]
impl LineStore for InMemoryLineStore {
    async fn get_all(&self) -> Result<Vec<InventoryLine>, StoreError> {
        let lines = self.lines.read().map_err(|_| Self::poisoned())?;
        Ok(lines.values().cloned().collect())
    }

    async fn put(&self, line: InventoryLine) -> Result<(), StoreError> {
        let mut lines = self.lines.write().map_err(|_| Self::poisoned())?;
        lines.insert(line.id, line);
        Ok(())
    }

    async fn delete(&self, id: LineId) -> Result<(), StoreError> {
        let mut lines = self.lines.write().map_err(|_| Self::poisoned())?;
        lines.remove(&id);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut lines = self.lines.write().map_err(|_| Self::poisoned())?;
        lines.clear();
        Ok(())
    }

    async fn find_by_key(&self, key: &LineKey) -> Result<Vec<InventoryLine>, StoreError> {
        let lines = self.lines.read().map_err(|_| Self::poisoned())?;
        Ok(lines.values().filter(|l| &l.key == key).cloned().collect())
    }
}
