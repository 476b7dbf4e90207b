pub mod kv;

use log::{ info, warn };
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error as ThisError;

use crate::cli::Args;
use crate::models::ContentItem;
use self::kv::{ FileKeyValueStore, KeyValueStore, MemoryKeyValueStore };

pub const HISTORY_KEY: &str = "contentItems";

#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("history store IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("history serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid store key '{0}'")]
    InvalidKey(String),
    #[error("history write task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// The newest-first list of generated items, kept as a single JSON blob.
#[derive(Clone)]
pub struct HistoryStore {
    kv: Arc<dyn KeyValueStore>,
}

impl HistoryStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryKeyValueStore::new()))
    }

    /// Absent or unreadable history is an empty history.
    pub fn load(&self) -> Vec<ContentItem> {
        let blob = match self.kv.get(HISTORY_KEY) {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                return Vec::new();
            }
            Err(e) => {
                warn!("Could not read stored history, starting empty: {}", e);
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<ContentItem>>(&blob) {
            Ok(items) => items,
            Err(e) => {
                warn!("Stored history is corrupt, starting empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Writes the whole list. The backend call runs on the blocking pool.
    pub async fn save(&self, items: &[ContentItem]) -> Result<(), StoreError> {
        let blob = serde_json::to_string(items)?;
        let kv = self.kv.clone();
        tokio::task::spawn_blocking(move || kv.set(HISTORY_KEY, &blob)).await?
    }
}

pub fn create_history_store(args: &Args) -> Result<HistoryStore, Box<dyn Error + Send + Sync>> {
    match args.store_type.to_lowercase().as_str() {
        "file" => {
            let kv = FileKeyValueStore::new(&args.store_dir)?;
            Ok(HistoryStore::new(Arc::new(kv)))
        }
        "memory" => Ok(HistoryStore::in_memory()),
        _ =>
            Err(
                Box::new(
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        format!("Unsupported history store type: {}", args.store_type)
                    )
                )
            ),
    }
}

pub fn initialize_history_store(args: &Args) -> Result<HistoryStore, Box<dyn Error + Send + Sync>> {
    info!("Content history will be stored in: {} at {}", args.store_type, args.store_dir);
    create_history_store(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ ContentKind, GeneratedPayload, Rating };

    fn item(id: &str, kind: ContentKind, rating: Option<f64>) -> ContentItem {
        let mut item = ContentItem::from_payload(
            id.to_string(),
            kind,
            GeneratedPayload {
                title: format!("title {}", id),
                body: format!("body {}", id),
                image_url: Some(format!("https://example.com/{}.jpg", id)),
            },
            id.parse().unwrap()
        );
        item.rating = rating.map(|r| Rating::new(r).unwrap());
        item
    }

    #[tokio::test]
    async fn save_then_load_reproduces_items() {
        let store = HistoryStore::in_memory();
        let items = vec![
            item("3", ContentKind::Dish, Some(4.5)),
            item("2", ContentKind::Joke, None),
            item("1", ContentKind::Joke, Some(1.0))
        ];
        store.save(&items).await.unwrap();
        assert_eq!(store.load(), items);
    }

    #[test]
    fn missing_blob_loads_empty() {
        assert!(HistoryStore::in_memory().load().is_empty());
    }

    #[test]
    fn corrupt_blob_loads_empty() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        kv.set(HISTORY_KEY, "{not json").unwrap();
        assert!(HistoryStore::new(kv).load().is_empty());
    }

    #[tokio::test]
    async fn file_backed_history_survives_reopen() {
        let tmp = tempfile::TempDir::new().unwrap();
        let items = vec![item("7", ContentKind::Dish, Some(2.5))];
        {
            let kv = FileKeyValueStore::new(tmp.path()).unwrap();
            HistoryStore::new(Arc::new(kv)).save(&items).await.unwrap();
        }
        let kv = FileKeyValueStore::new(tmp.path()).unwrap();
        assert_eq!(HistoryStore::new(Arc::new(kv)).load(), items);
    }
}
