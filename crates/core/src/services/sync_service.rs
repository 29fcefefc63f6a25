use std::sync::Arc;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::portfolio::PortfolioState;
use crate::models::profile::{Profile, UserRecord};
use crate::storage::store::ProfileStore;

/// Bridges ledger state to the identity/storage collaborator.
///
/// Holds the full credentialed [`UserRecord`] internally but only ever
/// hands out the public [`Profile`] — the credential never reaches
/// session state. Loads on identity change, persists after every
/// mutation.
pub struct SyncService {
    store: Arc<dyn ProfileStore>,
    current: Option<UserRecord>,
}

impl SyncService {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self {
            store,
            current: None,
        }
    }

    /// Create and store a brand new user with a fresh portfolio at the
    /// given starting balance. The new user becomes the current identity.
    pub async fn sign_up(
        &mut self,
        username: impl Into<String>,
        credential: impl Into<String>,
        starting_cash: f64,
    ) -> Result<Profile, CoreError> {
        let record = UserRecord::with_portfolio(
            username,
            credential,
            PortfolioState::with_starting_cash(starting_cash),
        );
        self.store.put(&record).await?;
        let profile = Profile::from(&record);
        self.current = Some(record);
        Ok(profile)
    }

    /// Switch to a stored identity, returning its portfolio state.
    /// Returns `None` (and clears the current identity) when no record
    /// exists for the id.
    pub async fn set_identity(
        &mut self,
        id: Uuid,
    ) -> Result<Option<PortfolioState>, CoreError> {
        match self.store.get(id).await? {
            Some(record) => {
                let state = record.portfolio.clone();
                tracing::info!(user = %record.username, "identity established, portfolio loaded");
                self.current = Some(record);
                Ok(Some(state))
            }
            None => {
                self.current = None;
                Ok(None)
            }
        }
    }

    /// Drop the current identity (sign-out).
    pub fn clear_identity(&mut self) {
        self.current = None;
    }

    /// The session-visible profile of the current identity, if any.
    #[must_use]
    pub fn current_profile(&self) -> Option<Profile> {
        self.current.as_ref().map(Profile::from)
    }

    /// Write the full current state to the store.
    ///
    /// Called synchronously after each ledger mutation, so writes are
    /// ordered by construction. Failures are returned to the caller and
    /// never retried here; the in-memory state stays authoritative.
    pub async fn persist(&mut self, state: &PortfolioState) -> Result<(), CoreError> {
        let record = match self.current.as_mut() {
            Some(record) => record,
            None => return Ok(()), // nothing to persist without an identity
        };
        record.portfolio = state.clone();
        self.store.put(record).await
    }
}

impl std::fmt::Debug for SyncService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncService")
            .field("current", &self.current_profile())
            .finish()
    }
}
