// Response cache - durable memoization of vision evaluations.
//
// Keyed by (model, SHA-256 of the image bytes, prompt). Entries never expire.

use crate::domain::model::CacheKey;
use crate::domain::ports::ResponseCache;
use crate::utils::error::Result;
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Hex-encoded SHA-256 of the image bytes.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// 讀取圖片內容並建立快取鍵；以內容而非路徑計算雜湊
pub fn key_for_image(model: &str, image: &Path, prompt: &str) -> Result<CacheKey> {
    let bytes = std::fs::read(image)?;
    Ok(CacheKey::new(model, content_hash(&bytes), prompt))
}

/// SQLite-backed cache. A single connection behind a mutex serializes every
/// read and write, so concurrent `put`s on the same key cannot be lost.
pub struct SqliteResponseCache {
    db: Mutex<Connection>,
}

impl SqliteResponseCache {
    const SCHEMA: &'static str = r"
        CREATE TABLE IF NOT EXISTS analysis_cache (
            model TEXT NOT NULL,
            image_hash TEXT NOT NULL,
            prompt TEXT NOT NULL,
            response TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            PRIMARY KEY (model, image_hash, prompt)
        );
    ";

    /// 開啟或建立快取資料庫
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = Connection::open(path)?;
        db.execute_batch("PRAGMA journal_mode=WAL;")?;
        tracing::debug!("Opened response cache at {}", path.display());
        Self::initialize(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::initialize(Connection::open_in_memory()?)
    }

    fn initialize(db: Connection) -> Result<Self> {
        db.execute_batch(Self::SCHEMA)?;
        Ok(Self { db: Mutex::new(db) })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the lock cannot leave a half-written row behind.
        self.db.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 快取中的項目數量
    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM analysis_cache", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Creation timestamp (RFC 3339) of an entry.
    pub fn created_at(&self, key: &CacheKey) -> Result<Option<String>> {
        let timestamp = self
            .conn()
            .query_row(
                "SELECT timestamp FROM analysis_cache
                 WHERE model = ?1 AND image_hash = ?2 AND prompt = ?3",
                params![key.model, key.image_hash, key.prompt],
                |row| row.get(0),
            )
            .optional()?;
        Ok(timestamp)
    }
}

impl ResponseCache for SqliteResponseCache {
    fn get(&self, key: &CacheKey) -> Result<Option<String>> {
        let response = self
            .conn()
            .query_row(
                "SELECT response FROM analysis_cache
                 WHERE model = ?1 AND image_hash = ?2 AND prompt = ?3",
                params![key.model, key.image_hash, key.prompt],
                |row| row.get(0),
            )
            .optional()?;
        Ok(response)
    }

    fn put(&self, key: &CacheKey, response: &str) -> Result<()> {
        let timestamp = chrono::Utc::now().to_rfc3339();
        self.conn().execute(
            "INSERT OR REPLACE INTO analysis_cache (model, image_hash, prompt, response, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![key.model, key.image_hash, key.prompt, response, timestamp],
        )?;
        Ok(())
    }
}

/// Process-local cache, for `--no-cache` runs and tests.
#[derive(Default)]
pub struct MemoryResponseCache {
    entries: Mutex<HashMap<CacheKey, String>>,
}

impl MemoryResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResponseCache for MemoryResponseCache {
    fn get(&self, key: &CacheKey) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &CacheKey, response: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(key.clone(), response.to_string());
        Ok(())
    }
}
