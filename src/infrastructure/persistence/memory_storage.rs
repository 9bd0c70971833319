//! In-memory storage backend.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::domain::entities::{OwnedUrl, PendingDeletion, Stats, UrlRecord};
use crate::domain::repositories::{UrlRepository, UserRepository};
use crate::error::ShortenerError;
use crate::infrastructure::persistence::buffer::{
    BatchWriter, DEFAULT_DELETE_CAPACITY, DEFAULT_INSERT_CAPACITY, DeleteBuffer, InsertBuffer,
};

/// Records and users held by [`MemoryStorage`].
#[derive(Debug, Default)]
pub(crate) struct MemoryState {
    records: HashMap<String, UrlRecord>,
    /// original URL -> alias
    by_url: HashMap<String, String>,
    users: HashSet<String>,
}

impl MemoryState {
    /// Returns the conflict `record` would cause, if any.
    pub(crate) fn conflict_for(&self, record: &UrlRecord) -> Option<ShortenerError> {
        if self.records.contains_key(&record.short_alias) {
            return Some(ShortenerError::DuplicateAlias);
        }

        self.by_url
            .get(&record.original_url)
            .map(|alias| ShortenerError::DuplicateUrl {
                alias: alias.clone(),
            })
    }

    pub(crate) fn find(&self, alias: &str) -> Result<UrlRecord, ShortenerError> {
        self.records
            .get(alias)
            .cloned()
            .ok_or(ShortenerError::NotFound)
    }

    pub(crate) fn insert(&mut self, record: UrlRecord) {
        self.by_url
            .insert(record.original_url.clone(), record.short_alias.clone());
        self.records.insert(record.short_alias.clone(), record);
    }

    pub(crate) fn insert_user(&mut self, user_id: String) {
        self.users.insert(user_id);
    }

    pub(crate) fn verify_user(&self, user_id: &str) -> Result<(), ShortenerError> {
        if self.users.contains(user_id) {
            Ok(())
        } else {
            Err(ShortenerError::NotFound)
        }
    }

    pub(crate) fn stats(&self) -> Stats {
        Stats {
            urls: self.records.len() as i64,
            users: self.users.len() as i64,
        }
    }
}

/// Recovers the guard of a poisoned lock; the state is never left half-written.
pub(crate) fn read_state(lock: &RwLock<MemoryState>) -> RwLockReadGuard<'_, MemoryState> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write_state(lock: &RwLock<MemoryState>) -> RwLockWriteGuard<'_, MemoryState> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Storage backed by process memory.
///
/// A single read/write lock guards the map: lookups run concurrently,
/// writes are exclusive. Nothing survives a restart.
pub struct MemoryStorage {
    state: RwLock<MemoryState>,
    insert_buffer: InsertBuffer,
    delete_buffer: DeleteBuffer,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::with_capacities(DEFAULT_INSERT_CAPACITY, DEFAULT_DELETE_CAPACITY)
    }

    /// Creates a storage with explicit insert and delete buffer capacities.
    pub fn with_capacities(insert_capacity: usize, delete_capacity: usize) -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            insert_buffer: InsertBuffer::new(insert_capacity),
            delete_buffer: DeleteBuffer::new(delete_capacity),
        }
    }

    /// Number of records waiting in the insert buffer.
    pub async fn pending_inserts(&self) -> usize {
        self.insert_buffer.len().await
    }

    fn read(&self) -> RwLockReadGuard<'_, MemoryState> {
        read_state(&self.state)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemoryState> {
        write_state(&self.state)
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

/// Generates a random 128-bit hex user id.
pub(crate) fn generate_user_id() -> Result<String, ShortenerError> {
    let mut bytes = [0u8; 16];
    getrandom::fill(&mut bytes).map_err(|e| ShortenerError::Entropy(e.to_string()))?;
    Ok(hex::encode(bytes))
}

#[async_trait]
impl BatchWriter for MemoryStorage {
    async fn insert_batch(&self, batch: &[UrlRecord]) -> Result<(), ShortenerError> {
        let mut state = self.write();

        let mut aliases = HashSet::with_capacity(batch.len());
        let mut urls = HashSet::with_capacity(batch.len());
        for record in batch {
            match state.conflict_for(record) {
                Some(ShortenerError::DuplicateUrl { .. }) => {
                    return Err(ShortenerError::BatchConflict);
                }
                Some(conflict) => return Err(conflict),
                None => {}
            }
            if !aliases.insert(record.short_alias.as_str()) {
                return Err(ShortenerError::DuplicateAlias);
            }
            if !urls.insert(record.original_url.as_str()) {
                return Err(ShortenerError::BatchConflict);
            }
        }

        for record in batch {
            state.insert(record.clone());
        }

        Ok(())
    }

    async fn mark_deleted(&self, batch: &[PendingDeletion]) -> Result<(), ShortenerError> {
        let mut state = self.write();

        for deletion in batch {
            if let Some(record) = state.records.get_mut(&deletion.short_alias)
                && record.owner_id == deletion.owner_id
            {
                record.is_deleted = true;
            }
        }

        debug!(deletions = batch.len(), "Marked records deleted");
        Ok(())
    }
}

#[async_trait]
impl UrlRepository for MemoryStorage {
    async fn find(&self, alias: &str) -> Result<UrlRecord, ShortenerError> {
        self.read().find(alias)
    }

    async fn save(&self, record: UrlRecord) -> Result<(), ShortenerError> {
        let mut state = self.write();

        if let Some(conflict) = state.conflict_for(&record) {
            return Err(conflict);
        }

        state.insert(record);
        Ok(())
    }

    async fn buffer_insert(&self, record: UrlRecord) -> Result<(), ShortenerError> {
        self.insert_buffer.push(record, self).await
    }

    async fn flush(&self) -> Result<(), ShortenerError> {
        self.insert_buffer.flush(self).await
    }

    async fn buffer_delete(&self, deletion: PendingDeletion) -> Result<(), ShortenerError> {
        self.delete_buffer.push(deletion, self).await
    }

    async fn flush_deletes(&self) -> Result<(), ShortenerError> {
        self.delete_buffer.flush(self).await
    }

    async fn list_by_owner(
        &self,
        owner_id: &str,
        base_url: &str,
    ) -> Result<Vec<OwnedUrl>, ShortenerError> {
        let base_url = base_url.trim_end_matches('/');

        Ok(self
            .read()
            .records
            .values()
            .filter(|r| r.owner_id == owner_id && !r.is_deleted)
            .map(|r| OwnedUrl {
                short_url: format!("{}/{}", base_url, r.short_alias),
                original_url: r.original_url.clone(),
            })
            .collect())
    }

    async fn ping(&self) -> Result<(), ShortenerError> {
        Ok(())
    }

    async fn stats(&self) -> Result<Stats, ShortenerError> {
        Ok(self.read().stats())
    }
}

#[async_trait]
impl UserRepository for MemoryStorage {
    async fn create_user(&self) -> Result<String, ShortenerError> {
        let user_id = generate_user_id()?;
        self.write().insert_user(user_id.clone());
        Ok(user_id)
    }

    async fn verify_user(&self, user_id: &str) -> Result<(), ShortenerError> {
        self.read().verify_user(user_id)
    }
}
