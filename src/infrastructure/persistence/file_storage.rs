//! File-backed storage: an in-memory index persisted as an append-only
//! JSON-lines journal.
//!
//! Each saved URL and each created user is appended as one line. On open the
//! journal is replayed in order to rebuild the index. Buffered writes,
//! deletion and per-user listing are not supported by this backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::domain::entities::{OwnedUrl, PendingDeletion, Stats, UrlRecord};
use crate::domain::repositories::{UrlRepository, UserRepository};
use crate::error::ShortenerError;
use crate::infrastructure::persistence::memory_storage::{
    MemoryState, generate_user_id, read_state, write_state,
};

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum JournalEntry {
    Url(UrlRecord),
    User { id: String },
}

pub struct FileStorage {
    path: PathBuf,
    journal: Mutex<File>,
    index: RwLock<MemoryState>,
}

impl FileStorage {
    /// Opens the journal at `path`, creating it if missing, and replays it.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be opened, or a serialization
    /// error if a line is not a valid entry.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, ShortenerError> {
        let path = path.as_ref().to_path_buf();

        let journal = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        let index = RwLock::new(MemoryState::default());
        let content = tokio::fs::read_to_string(&path).await?;
        let mut replayed = 0usize;

        {
            let mut state = write_state(&index);
            for line in content.lines().filter(|l| !l.trim().is_empty()) {
                match serde_json::from_str::<JournalEntry>(line)? {
                    JournalEntry::Url(record) => {
                        if let Some(conflict) = state.conflict_for(&record) {
                            warn!(alias = %record.short_alias, error = %conflict, "Skipping conflicting journal entry");
                            continue;
                        }
                        state.insert(record);
                    }
                    JournalEntry::User { id } => state.insert_user(id),
                }
                replayed += 1;
            }
        }

        info!(path = %path.display(), entries = replayed, "File storage opened");

        Ok(Self {
            path,
            journal: Mutex::new(journal),
            index,
        })
    }

    async fn append(journal: &mut File, entry: &JournalEntry) -> Result<(), ShortenerError> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');
        journal.write_all(&line).await?;
        journal.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl UrlRepository for FileStorage {
    async fn find(&self, alias: &str) -> Result<UrlRecord, ShortenerError> {
        read_state(&self.index).find(alias)
    }

    async fn save(&self, record: UrlRecord) -> Result<(), ShortenerError> {
        let mut journal = self.journal.lock().await;

        let conflict = read_state(&self.index).conflict_for(&record);
        if let Some(conflict) = conflict {
            return Err(conflict);
        }

        Self::append(&mut journal, &JournalEntry::Url(record.clone())).await?;
        write_state(&self.index).insert(record);
        Ok(())
    }

    async fn buffer_insert(&self, _record: UrlRecord) -> Result<(), ShortenerError> {
        Err(ShortenerError::NotImplemented("buffer_insert"))
    }

    async fn flush(&self) -> Result<(), ShortenerError> {
        Err(ShortenerError::NotImplemented("flush"))
    }

    async fn buffer_delete(&self, _deletion: PendingDeletion) -> Result<(), ShortenerError> {
        Err(ShortenerError::NotImplemented("buffer_delete"))
    }

    async fn flush_deletes(&self) -> Result<(), ShortenerError> {
        Err(ShortenerError::NotImplemented("flush_deletes"))
    }

    async fn list_by_owner(
        &self,
        _owner_id: &str,
        _base_url: &str,
    ) -> Result<Vec<OwnedUrl>, ShortenerError> {
        Err(ShortenerError::NotImplemented("list_by_owner"))
    }

    async fn ping(&self) -> Result<(), ShortenerError> {
        match tokio::fs::try_exists(&self.path).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(ShortenerError::Unavailable(format!(
                "journal {} is missing",
                self.path.display()
            ))),
            Err(e) => Err(ShortenerError::Unavailable(e.to_string())),
        }
    }

    async fn stats(&self) -> Result<Stats, ShortenerError> {
        Ok(read_state(&self.index).stats())
    }
}

#[async_trait]
impl UserRepository for FileStorage {
    async fn create_user(&self) -> Result<String, ShortenerError> {
        let mut journal = self.journal.lock().await;
        let id = generate_user_id()?;

        Self::append(&mut journal, &JournalEntry::User { id: id.clone() }).await?;
        write_state(&self.index).insert_user(id.clone());
        Ok(id)
    }

    async fn verify_user(&self, user_id: &str) -> Result<(), ShortenerError> {
        read_state(&self.index).verify_user(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn open_in(dir: &TempDir) -> FileStorage {
        FileStorage::open(dir.path().join("urls.jsonl")).await.unwrap()
    }

    #[tokio::test]
    async fn test_save_survives_reopen() {
        let dir = TempDir::new().unwrap();

        {
            let storage = open_in(&dir).await;
            storage
                .save(UrlRecord::new("http://a.example", "A1", "u1"))
                .await
                .unwrap();
        }

        let storage = open_in(&dir).await;
        let record = storage.find("A1").await.unwrap();
        assert_eq!(record.original_url, "http://a.example");
        assert_eq!(record.owner_id, "u1");
    }

    #[tokio::test]
    async fn test_users_survive_reopen() {
        let dir = TempDir::new().unwrap();

        let user = {
            let storage = open_in(&dir).await;
            storage.create_user().await.unwrap()
        };

        let storage = open_in(&dir).await;
        assert!(storage.verify_user(&user).await.is_ok());
        assert_eq!(storage.stats().await.unwrap().users, 1);
    }

    #[tokio::test]
    async fn test_conflicting_save_is_not_journaled() {
        let dir = TempDir::new().unwrap();
        let storage = open_in(&dir).await;

        storage
            .save(UrlRecord::new("http://a.example", "A1", "u1"))
            .await
            .unwrap();
        let result = storage
            .save(UrlRecord::new("http://a.example", "B2", "u1"))
            .await;
        assert!(matches!(result, Err(ShortenerError::DuplicateUrl { ref alias }) if alias == "A1"));

        let content = std::fs::read_to_string(dir.path().join("urls.jsonl")).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[tokio::test]
    async fn test_unsupported_operations() {
        let dir = TempDir::new().unwrap();
        let storage = open_in(&dir).await;
        let record = UrlRecord::new("http://a.example", "A1", "u1");

        assert!(matches!(
            storage.buffer_insert(record).await,
            Err(ShortenerError::NotImplemented(_))
        ));
        assert!(matches!(
            storage.flush().await,
            Err(ShortenerError::NotImplemented(_))
        ));
        assert!(matches!(
            storage
                .buffer_delete(PendingDeletion::new("A1", "u1"))
                .await,
            Err(ShortenerError::NotImplemented(_))
        ));
        assert!(matches!(
            storage.flush_deletes().await,
            Err(ShortenerError::NotImplemented(_))
        ));
        assert!(matches!(
            storage.list_by_owner("u1", "http://x").await,
            Err(ShortenerError::NotImplemented(_))
        ));
    }

    #[tokio::test]
    async fn test_ping_fails_once_journal_removed() {
        let dir = TempDir::new().unwrap();
        let storage = open_in(&dir).await;
        assert!(storage.ping().await.is_ok());

        std::fs::remove_file(dir.path().join("urls.jsonl")).unwrap();
        assert!(matches!(
            storage.ping().await,
            Err(ShortenerError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_replay_skips_conflicting_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("urls.jsonl");
        let lines = [
            JournalEntry::Url(UrlRecord::new("http://a.example", "A1", "u1")),
            JournalEntry::Url(UrlRecord::new("http://a.example", "A2", "u1")),
            JournalEntry::User {
                id: "u1".to_string(),
            },
        ]
        .iter()
        .map(|entry| serde_json::to_string(entry).unwrap())
        .collect::<Vec<_>>()
        .join("\n");
        std::fs::write(&path, lines).unwrap();

        let storage = FileStorage::open(&path).await.unwrap();

        assert_eq!(storage.stats().await.unwrap(), Stats { urls: 1, users: 1 });
        assert!(matches!(
            storage.find("A2").await,
            Err(ShortenerError::NotFound)
        ));
        assert!(storage.verify_user("u1").await.is_ok());
    }

    #[tokio::test]
    async fn test_corrupt_journal_fails_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("urls.jsonl");
        std::fs::write(&path, "not json\n").unwrap();

        let result = FileStorage::open(&path).await;
        assert!(matches!(result, Err(ShortenerError::Serialization(_))));
    }
}
