use crate::api::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::{fs, sync::RwLock};
use tracing::{info, warn};

pub const HISTORY_LIMIT: usize = 50;

const USER_KEY: &str = "user";
const HISTORY_KEY: &str = "chat_history";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Corrupt stored value: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatHistoryEntry {
    pub query: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatHistoryEntry {
    pub fn new(query: &str, response: &str) -> Self {
        Self {
            query: query.to_string(),
            response: response.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Durable client storage: one JSON document per key under `data_dir`.
///
/// Each write lands in a sibling temp file and is renamed over the key's
/// file, so a reader sees either the old or the new value of a key.
pub struct LocalStore {
    data_dir: PathBuf,
    history: RwLock<Vec<ChatHistoryEntry>>,
}

impl LocalStore {
    pub async fn open(data_dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(data_dir).await?;

        let store = Self {
            data_dir: data_dir.to_path_buf(),
            history: RwLock::new(Vec::new()),
        };

        let history = match store.read::<Vec<ChatHistoryEntry>>(HISTORY_KEY).await {
            Ok(history) => history.unwrap_or_default(),
            Err(e) => {
                warn!("Discarding unreadable chat history: {}", e);
                Vec::new()
            }
        };
        info!("Loaded {} chat history entries", history.len());
        *store.history.write().await = history;

        Ok(store)
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", key))
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let content = match fs::read_to_string(self.key_path(key)).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let path = self.key_path(key);
        let tmp = self.data_dir.join(format!(".{}.json.tmp", key));
        fs::write(&tmp, serde_json::to_vec_pretty(value)?).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    pub async fn load_user(&self) -> Result<Option<User>, StoreError> {
        self.read(USER_KEY).await
    }

    pub async fn save_user(&self, user: &User) -> Result<(), StoreError> {
        self.write(USER_KEY, user).await
    }

    pub async fn history(&self) -> Vec<ChatHistoryEntry> {
        self.history.read().await.clone()
    }

    /// Appends an entry, evicting the oldest ones beyond [`HISTORY_LIMIT`].
    /// Returns the stored length. The cached history only changes once the
    /// file is written.
    pub async fn append_history(&self, entry: ChatHistoryEntry) -> Result<usize, StoreError> {
        let mut history = self.history.write().await;
        let mut updated = history.clone();
        updated.push(entry);
        if updated.len() > HISTORY_LIMIT {
            let excess = updated.len() - HISTORY_LIMIT;
            updated.drain(..excess);
        }

        self.write(HISTORY_KEY, updated.as_slice()).await?;
        *history = updated;
        Ok(history.len())
    }

    pub async fn clear_history(&self) -> Result<(), StoreError> {
        let mut history = self.history.write().await;
        self.write::<[ChatHistoryEntry]>(HISTORY_KEY, &[]).await?;
        history.clear();
        Ok(())
    }
}
