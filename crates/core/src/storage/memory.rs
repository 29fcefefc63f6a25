use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::profile::UserRecord;

use super::store::ProfileStore;

/// In-memory [`ProfileStore`] for tests and shells that don't persist
/// across runs.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    records: RwLock<HashMap<Uuid, UserRecord>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records stored.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get(&self, id: Uuid) -> Result<Option<UserRecord>, CoreError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn put(&self, record: &UserRecord) -> Result<(), CoreError> {
        self.records.write().await.insert(record.id, record.clone());
        Ok(())
    }
}
