//! Prediction history and account persistence.

mod connection;
mod memory;
pub mod record;
pub mod repository;
mod sqlite;

pub use connection::StorageHandle;
pub use memory::InMemoryStore;
pub use record::{OwnerId, PredictionRecord, RecordId, UserAccount};
pub use repository::{
    IdentityStore, PredictionRepository, RepositoryError, StorageBackend, HISTORY_LIMIT,
};
pub use sqlite::SqliteStore;

use crate::config::StorageConfig;

/// Backend selected from configuration at startup.
pub enum Backend {
    Memory(InMemoryStore),
    Sqlite(SqliteStore),
}

impl Backend {
    pub fn from_config(config: &StorageConfig) -> Self {
        match &config.database_path {
            Some(path) => Backend::Sqlite(SqliteStore::new(path.clone())),
            None => Backend::Memory(InMemoryStore::new()),
        }
    }
}

impl PredictionRepository for Backend {
    fn insert(&self, record: PredictionRecord) -> Result<RecordId, RepositoryError> {
        match self {
            Backend::Memory(store) => store.insert(record),
            Backend::Sqlite(store) => store.insert(record),
        }
    }

    fn list_by_owner(
        &self,
        owner: &OwnerId,
        limit: Option<usize>,
    ) -> Result<Vec<PredictionRecord>, RepositoryError> {
        match self {
            Backend::Memory(store) => store.list_by_owner(owner, limit),
            Backend::Sqlite(store) => store.list_by_owner(owner, limit),
        }
    }
}

impl IdentityStore for Backend {
    fn insert_user(&self, account: UserAccount) -> Result<UserAccount, RepositoryError> {
        match self {
            Backend::Memory(store) => store.insert_user(account),
            Backend::Sqlite(store) => store.insert_user(account),
        }
    }

    fn find_user(&self, id: &OwnerId) -> Result<Option<UserAccount>, RepositoryError> {
        match self {
            Backend::Memory(store) => store.find_user(id),
            Backend::Sqlite(store) => store.find_user(id),
        }
    }

    fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, RepositoryError> {
        match self {
            Backend::Memory(store) => store.find_by_username(username),
            Backend::Sqlite(store) => store.find_by_username(username),
        }
    }
}

impl StorageBackend for Backend {
    fn label(&self) -> &'static str {
        match self {
            Backend::Memory(store) => store.label(),
            Backend::Sqlite(store) => store.label(),
        }
    }

    fn ping(&self) -> Result<(), RepositoryError> {
        match self {
            Backend::Memory(store) => store.ping(),
            Backend::Sqlite(store) => store.ping(),
        }
    }

    fn close(&self) {
        match self {
            Backend::Memory(store) => store.close(),
            Backend::Sqlite(store) => store.close(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn backend_follows_database_path() {
        let memory = Backend::from_config(&StorageConfig::default());
        assert_eq!(memory.label(), "memory");

        let sqlite = Backend::from_config(&StorageConfig {
            database_path: Some(PathBuf::from("premiums.db")),
        });
        assert_eq!(sqlite.label(), "sqlite");
    }
}
