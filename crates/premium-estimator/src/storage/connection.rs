use super::record::{OwnerId, PredictionRecord, RecordId, UserAccount};
use super::repository::{IdentityStore, PredictionRepository, RepositoryError, StorageBackend};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

/// Long-lived storage handle shared by every request.
///
/// Starts disconnected. Each repository call checks the availability flag first, so an outage
/// turns into a per-call `Unavailable` error instead of a process failure.
pub struct StorageHandle<B> {
    backend: B,
    available: AtomicBool,
}

impl<B: StorageBackend> StorageHandle<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            available: AtomicBool::new(false),
        }
    }

    /// Convenience for tests and in-memory setups that are always reachable.
    pub fn connected(backend: B) -> Result<Self, RepositoryError> {
        let handle = Self::new(backend);
        handle.connect()?;
        Ok(handle)
    }

    pub fn connect(&self) -> Result<(), RepositoryError> {
        match self.backend.ping() {
            Ok(()) => {
                self.available.store(true, Ordering::Release);
                info!(backend = self.backend.label(), "storage connected");
                Ok(())
            }
            Err(err) => {
                self.available.store(false, Ordering::Release);
                warn!(backend = self.backend.label(), error = %err, "storage connection failed");
                Err(err)
            }
        }
    }

    pub fn disconnect(&self) {
        self.available.store(false, Ordering::Release);
        self.backend.close();
        info!(backend = self.backend.label(), "storage disconnected");
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }

    pub fn backend_label(&self) -> &'static str {
        self.backend.label()
    }

    fn backend(&self) -> Result<&B, RepositoryError> {
        if self.is_available() {
            Ok(&self.backend)
        } else {
            Err(RepositoryError::Unavailable(format!(
                "{} storage is disconnected",
                self.backend.label()
            )))
        }
    }
}

impl<B: StorageBackend> PredictionRepository for StorageHandle<B> {
    fn insert(&self, record: PredictionRecord) -> Result<RecordId, RepositoryError> {
        self.backend()?.insert(record)
    }

    fn list_by_owner(
        &self,
        owner: &OwnerId,
        limit: Option<usize>,
    ) -> Result<Vec<PredictionRecord>, RepositoryError> {
        self.backend()?.list_by_owner(owner, limit)
    }
}

impl<B: StorageBackend> IdentityStore for StorageHandle<B> {
    fn insert_user(&self, account: UserAccount) -> Result<UserAccount, RepositoryError> {
        self.backend()?.insert_user(account)
    }

    fn find_user(&self, id: &OwnerId) -> Result<Option<UserAccount>, RepositoryError> {
        self.backend()?.find_user(id)
    }

    fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, RepositoryError> {
        self.backend()?.find_by_username(username)
    }
}
