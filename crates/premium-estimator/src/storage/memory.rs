use super::record::{OwnerId, PredictionRecord, RecordId, UserAccount};
use super::repository::{IdentityStore, PredictionRepository, RepositoryError, StorageBackend};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Process-local store used when no database is configured and in tests.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    predictions: Arc<Mutex<Vec<PredictionRecord>>>,
    users: Arc<Mutex<HashMap<OwnerId, UserAccount>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn predictions(&self) -> Result<MutexGuard<'_, Vec<PredictionRecord>>, RepositoryError> {
        self.predictions
            .lock()
            .map_err(|_| RepositoryError::Unavailable("prediction store poisoned".to_string()))
    }

    fn users(&self) -> Result<MutexGuard<'_, HashMap<OwnerId, UserAccount>>, RepositoryError> {
        self.users
            .lock()
            .map_err(|_| RepositoryError::Unavailable("account store poisoned".to_string()))
    }
}

impl PredictionRepository for InMemoryStore {
    fn insert(&self, record: PredictionRecord) -> Result<RecordId, RepositoryError> {
        let mut guard = self.predictions()?;
        if guard.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Conflict);
        }
        let id = record.id.clone();
        guard.push(record);
        Ok(id)
    }

    fn list_by_owner(
        &self,
        owner: &OwnerId,
        limit: Option<usize>,
    ) -> Result<Vec<PredictionRecord>, RepositoryError> {
        let guard = self.predictions()?;
        // Reverse insertion order first so equal timestamps still list the latest insert first.
        let mut records: Vec<PredictionRecord> = guard
            .iter()
            .rev()
            .filter(|record| &record.owner_id == owner)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = limit {
            records.truncate(limit);
        }
        Ok(records)
    }
}

impl IdentityStore for InMemoryStore {
    fn insert_user(&self, account: UserAccount) -> Result<UserAccount, RepositoryError> {
        let mut guard = self.users()?;
        let taken = guard.contains_key(&account.id)
            || guard
                .values()
                .any(|existing| existing.username.eq_ignore_ascii_case(&account.username));
        if taken {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(account.id.clone(), account.clone());
        Ok(account)
    }

    fn find_user(&self, id: &OwnerId) -> Result<Option<UserAccount>, RepositoryError> {
        Ok(self.users()?.get(id).cloned())
    }

    fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, RepositoryError> {
        Ok(self
            .users()?
            .values()
            .find(|account| account.username.eq_ignore_ascii_case(username))
            .cloned())
    }
}

impl StorageBackend for InMemoryStore {
    fn label(&self) -> &'static str {
        "memory"
    }

    fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
