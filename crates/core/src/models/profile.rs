use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::portfolio::PortfolioState;

/// The full user record as held by the storage collaborator.
///
/// Carries the credential, so it must never cross into session state —
/// the session sees a [`Profile`] instead. Keeping these as two distinct
/// types (rather than stripping a field at runtime) makes a credential
/// leak a type error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,

    pub username: String,

    /// Opaque credential (hash or token — owned by the identity
    /// collaborator, never interpreted here)
    pub credential: String,

    /// The user's ledger state
    pub portfolio: PortfolioState,
}

impl UserRecord {
    pub fn new(username: impl Into<String>, credential: impl Into<String>) -> Self {
        Self::with_portfolio(username, credential, PortfolioState::new())
    }

    /// New record around an explicit initial portfolio (configured
    /// starting cash).
    pub fn with_portfolio(
        username: impl Into<String>,
        credential: impl Into<String>,
        portfolio: PortfolioState,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            credential: credential.into(),
            portfolio,
        }
    }
}

/// The session-visible identity: everything a shell may show or log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
}

impl From<&UserRecord> for Profile {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id,
            username: record.username.clone(),
        }
    }
}
