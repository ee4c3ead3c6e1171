//! # TAAI Session Storage
//!
//! TAAI Agent 客户端的会话持久化。
//!
//! ## 功能特性
//!
//! - **会话列表**：标题、时间、消息数、最后一条消息，最新在前
//! - **消息历史**：每个会话完整的消息列表
//! - **当前会话**：重启后恢复上次打开的会话
//! - **可替换后端**：内存存储或文件存储
//! - **列表轮询**：会话列表变化时推送给订阅方
//!
//! ## 使用示例
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use taai_session::{FileStore, SessionStore};
//! use taai_core::types::ChatMessage;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = Arc::new(FileStore::new("~/.taai/storage").await?);
//!     let store = SessionStore::new(backend);
//!
//!     let id = store.create_session().await?;
//!     let mut messages = store.load_session(&id).await?;
//!     messages.push(ChatMessage::user("What is RSI?"));
//!     store.append_and_persist(&id, &messages).await?;
//!
//!     for session in store.list_sessions().await? {
//!         println!("{} {}", session.id, session.title);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod storage;
pub mod store;
pub mod watcher;

// 重新导出主要类型
pub use error::{StorageError, StorageResult};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::{
    messages_key, SessionStore, CURRENT_SESSION_KEY, MESSAGES_KEY_PREFIX, SESSIONS_KEY,
    USERNAME_KEY,
};
pub use watcher::{SessionWatcher, DEFAULT_POLL_INTERVAL};

/// 默认存储路径
pub fn default_storage_path() -> std::path::PathBuf {
    dirs::home_dir()
        .map(|p| p.join(".taai").join("storage"))
        .unwrap_or_else(|| std::path::PathBuf::from("./taai_storage"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use taai_core::types::ChatMessage;

    #[tokio::test]
    async fn test_sessions_survive_restart_on_disk() {
        use tempfile::TempDir;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().to_string_lossy().into_owned();

        let id = {
            let store = SessionStore::new(Arc::new(FileStore::new(&path).await.unwrap()));
            let id = store.create_session().await.unwrap();
            store
                .append_and_persist(&id, &[ChatMessage::welcome(), ChatMessage::user("BTC?")])
                .await
                .unwrap();
            id
        };

        let store = SessionStore::new(Arc::new(FileStore::new(&path).await.unwrap()));
        assert_eq!(store.current_session_id().await.unwrap().as_deref(), Some(id.as_str()));
        assert_eq!(store.load_session(&id).await.unwrap().len(), 2);
        assert_eq!(store.list_sessions().await.unwrap()[0].title, "BTC?...");
    }

    #[test]
    fn test_default_storage_path() {
        assert!(default_storage_path().to_string_lossy().contains("taai"));
    }
}
