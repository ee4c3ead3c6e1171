//! # Key-Value Storage
//!
//! 会话数据落在一个简单的字符串键值存储之上。
//!
//! - [`MemoryStore`]：进程内存储，用于测试和一次性会话
//! - [`FileStore`]：每个键一个文件，存放在 `<base_path>/<key>.json`

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::fs;
use tracing::debug;

use crate::error::{StorageError, StorageResult};

/// 键值存储 trait
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// 读取键，不存在时返回 None
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// 写入键（覆盖）
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// 删除键，不存在时不报错
    async fn remove(&self, key: &str) -> StorageResult<()>;
}

/// 内存键值存储
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前键的数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// 文件键值存储
#[derive(Debug, Clone)]
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// 创建存储并确保目录存在，支持 `~` 开头的路径
    pub async fn new(base_path: impl AsRef<str>) -> StorageResult<Self> {
        let expanded = shellexpand::tilde(base_path.as_ref()).into_owned();
        let base_path = PathBuf::from(expanded);
        fs::create_dir_all(&base_path).await?;
        debug!("File store ready at {:?}", base_path);
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn key_path(&self, key: &str) -> StorageResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.base_path.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.key_path(key)?;
        // 先写临时文件再重命名，避免读到半截内容
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        tokio_test::block_on(async {
            assert_eq!(store.get("username").await.unwrap(), None);
            store.set("username", "alice").await.unwrap();
            assert_eq!(store.get("username").await.unwrap().as_deref(), Some("alice"));
            store.remove("username").await.unwrap();
            store.remove("username").await.unwrap();
        });
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().to_string_lossy()).await.unwrap();

        store.set("chat-sessions", "[]").await.unwrap();
        assert_eq!(store.get("chat-sessions").await.unwrap().as_deref(), Some("[]"));
        assert!(temp_dir.path().join("chat-sessions.json").exists());

        store.set("chat-sessions", "[1]").await.unwrap();
        assert_eq!(store.get("chat-sessions").await.unwrap().as_deref(), Some("[1]"));

        store.remove("chat-sessions").await.unwrap();
        assert_eq!(store.get("chat-sessions").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested");
        let path = path.to_string_lossy();

        let store = FileStore::new(&path).await.unwrap();
        store.set("current-session-id", "1700000000000").await.unwrap();
        drop(store);

        let reopened = FileStore::new(&path).await.unwrap();
        assert_eq!(
            reopened.get("current-session-id").await.unwrap().as_deref(),
            Some("1700000000000")
        );
    }

    #[tokio::test]
    async fn test_file_store_rejects_path_like_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().to_string_lossy()).await.unwrap();

        let result = store.set("../escape", "x").await;
        assert!(matches!(result, Err(StorageError::InvalidKey { .. })));
    }
}
