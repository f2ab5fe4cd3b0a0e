use super::record::{OwnerId, PredictionRecord, RecordId, UserAccount};

/// Maximum number of records returned by history listings.
pub const HISTORY_LIMIT: usize = 50;

/// Append-only store of scored predictions.
pub trait PredictionRepository: Send + Sync {
    fn insert(&self, record: PredictionRecord) -> Result<RecordId, RepositoryError>;

    /// Records owned by `owner`, newest first, truncated to `limit` when given.
    fn list_by_owner(
        &self,
        owner: &OwnerId,
        limit: Option<usize>,
    ) -> Result<Vec<PredictionRecord>, RepositoryError>;
}

/// Account lookups used to resolve bearer-token identities.
pub trait IdentityStore: Send + Sync {
    /// Fails with `Conflict` when the username is already taken.
    fn insert_user(&self, account: UserAccount) -> Result<UserAccount, RepositoryError>;
    fn find_user(&self, id: &OwnerId) -> Result<Option<UserAccount>, RepositoryError>;
    fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, RepositoryError>;
}

/// A concrete store holding both predictions and accounts, with an explicit connection lifecycle.
pub trait StorageBackend: PredictionRepository + IdentityStore {
    fn label(&self) -> &'static str;

    /// Open the underlying connection if needed and check it answers.
    fn ping(&self) -> Result<(), RepositoryError>;

    /// Release the underlying connection.
    fn close(&self) {}
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("stored record is corrupt: {0}")]
    Corrupt(String),
}
