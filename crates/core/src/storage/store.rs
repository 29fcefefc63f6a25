use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::profile::UserRecord;

/// The persistent-storage collaborator: a key-value store of user
/// records, keyed by identity id.
///
/// The core writes the FULL current record synchronously after every
/// ledger mutation, so later writes can never be overtaken by earlier
/// ones. Write failures are reported upward and not retried — in-memory
/// state stays authoritative until the next successful write.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch a user record by identity id, if one is stored.
    async fn get(&self, id: Uuid) -> Result<Option<UserRecord>, CoreError>;

    /// Store (or replace) the full user record.
    async fn put(&self, record: &UserRecord) -> Result<(), CoreError>;
}
