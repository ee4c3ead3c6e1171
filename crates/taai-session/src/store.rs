//! # Session Store
//!
//! 在 [`KeyValueStore`] 之上维护会话列表和每个会话的消息列表。
//!
//! 存储键:
//! ```text
//! current-session-id        # 当前会话 ID
//! chat-sessions             # 会话元数据列表（最新在前）
//! chat-messages-<id>        # 某个会话的消息列表
//! username                  # 用户名
//! ```
//!
//! 损坏的数据不会向上报错，而是记录 warn 日志并回退到默认值。

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use taai_core::types::{ChatMessage, ChatSession};
use tracing::{debug, info, warn};

use crate::error::StorageResult;
use crate::storage::KeyValueStore;

/// 当前会话 ID 的存储键
pub const CURRENT_SESSION_KEY: &str = "current-session-id";
/// 会话列表的存储键
pub const SESSIONS_KEY: &str = "chat-sessions";
/// 消息列表存储键前缀
pub const MESSAGES_KEY_PREFIX: &str = "chat-messages-";
/// 用户名的存储键
pub const USERNAME_KEY: &str = "username";

/// 某个会话的消息列表存储键
pub fn messages_key(session_id: &str) -> String {
    format!("{}{}", MESSAGES_KEY_PREFIX, session_id)
}

/// 会话存储
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    /// 上一次分配的会话 ID（毫秒时间戳）
    last_id: Mutex<i64>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            last_id: Mutex::new(0),
        }
    }

    /// 底层键值存储
    pub fn backend(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// 分配新的会话 ID：当前毫秒时间戳，同一毫秒内递增以保证唯一
    fn next_id(&self) -> String {
        let now = Utc::now().timestamp_millis();
        let mut last = self.last_id.lock();
        let id = now.max(*last + 1);
        *last = id;
        id.to_string()
    }

    /// 创建新会话并设为当前会话
    ///
    /// 新会话只包含欢迎消息，元数据记录 `messageCount = 0`，
    /// 因此在追加第一条消息之前不会出现在 [`list_sessions`](Self::list_sessions) 中。
    pub async fn create_session(&self) -> StorageResult<String> {
        let id = self.next_id();

        let messages = vec![ChatMessage::welcome()];
        self.store
            .set(&messages_key(&id), &serde_json::to_string(&messages)?)
            .await?;

        let mut sessions = self.read_sessions().await?;
        sessions.retain(|s| s.id != id);
        sessions.insert(0, ChatSession::new(id.clone()));
        self.write_sessions(&sessions).await?;

        self.set_current_session_id(&id).await?;

        info!("Created session {}", id);
        Ok(id)
    }

    /// 加载会话消息；缺失或损坏时返回只含欢迎消息的列表
    pub async fn load_session(&self, id: &str) -> StorageResult<Vec<ChatMessage>> {
        let key = messages_key(id);
        let messages: Option<Vec<ChatMessage>> = self.read_json(&key).await?;

        match messages {
            Some(messages) if !messages.is_empty() => Ok(messages),
            _ => Ok(vec![ChatMessage::welcome()]),
        }
    }

    /// 写回会话的全部消息，并在有真实消息时刷新元数据
    pub async fn append_and_persist(&self, id: &str, messages: &[ChatMessage]) -> StorageResult<()> {
        self.store
            .set(&messages_key(id), &serde_json::to_string(messages)?)
            .await?;

        if messages.len() <= 1 {
            return Ok(());
        }

        let title = ChatSession::title_from(&messages[1].content);
        let last_message = messages.last().map(|m| m.content.clone());
        let message_count = (messages.len() - 1) as u32;

        let mut sessions = self.read_sessions().await?;
        match sessions.iter_mut().find(|s| s.id == id) {
            Some(session) => {
                session.title = title;
                session.message_count = message_count;
                session.last_message = last_message;
                session.timestamp = Utc::now();
            }
            None => {
                let mut session = ChatSession::new(id);
                session.title = title;
                session.message_count = message_count;
                session.last_message = last_message;
                sessions.insert(0, session);
            }
        }
        self.write_sessions(&sessions).await?;

        debug!("Persisted {} messages for session {}", messages.len(), id);
        Ok(())
    }

    /// 列出有消息的会话（最新在前）
    pub async fn list_sessions(&self) -> StorageResult<Vec<ChatSession>> {
        let sessions = self.read_sessions().await?;
        Ok(sessions.into_iter().filter(ChatSession::is_visible).collect())
    }

    /// 删除会话元数据及其消息列表
    pub async fn delete_session(&self, id: &str) -> StorageResult<()> {
        let mut sessions = self.read_sessions().await?;
        sessions.retain(|s| s.id != id);
        self.write_sessions(&sessions).await?;
        self.store.remove(&messages_key(id)).await?;

        info!("Deleted session {}", id);
        Ok(())
    }

    /// 当前会话 ID
    pub async fn current_session_id(&self) -> StorageResult<Option<String>> {
        let id = self.store.get(CURRENT_SESSION_KEY).await?;
        Ok(id.filter(|id| !id.trim().is_empty()))
    }

    pub async fn set_current_session_id(&self, id: &str) -> StorageResult<()> {
        self.store.set(CURRENT_SESSION_KEY, id).await
    }

    /// 已保存的用户名
    pub async fn username(&self) -> StorageResult<Option<String>> {
        self.store.get(USERNAME_KEY).await
    }

    pub async fn save_username(&self, name: &str) -> StorageResult<()> {
        self.store.set(USERNAME_KEY, name).await
    }

    /// 读取完整会话列表（包括空会话）
    async fn read_sessions(&self) -> StorageResult<Vec<ChatSession>> {
        Ok(self.read_json(SESSIONS_KEY).await?.unwrap_or_default())
    }

    async fn write_sessions(&self, sessions: &[ChatSession]) -> StorageResult<()> {
        self.store
            .set(SESSIONS_KEY, &serde_json::to_string(sessions)?)
            .await
    }

    /// 读取并解析 JSON 值；解析失败视为缺失
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("Ignoring corrupt value under '{}': {}", key, e);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn store() -> (Arc<MemoryStore>, SessionStore) {
        let backend = Arc::new(MemoryStore::new());
        let sessions = SessionStore::new(backend.clone());
        (backend, sessions)
    }

    #[tokio::test]
    async fn test_new_session_is_hidden_until_first_message() {
        let (_, store) = store();
        let id = store.create_session().await.unwrap();

        assert!(store.list_sessions().await.unwrap().is_empty());
        assert_eq!(store.current_session_id().await.unwrap().as_deref(), Some(id.as_str()));

        let mut messages = store.load_session(&id).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].is_welcome());

        messages.push(ChatMessage::user("What is RSI?"));
        store.append_and_persist(&id, &messages).await.unwrap();

        let listed = store.list_sessions().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);
        assert_eq!(listed[0].title, "What is RSI?...");
        assert_eq!(listed[0].message_count, 1);
        assert_eq!(listed[0].last_message.as_deref(), Some("What is RSI?"));
    }

    #[tokio::test]
    async fn test_metadata_follows_messages() {
        let (_, store) = store();
        let id = store.create_session().await.unwrap();

        let messages = vec![
            ChatMessage::welcome(),
            ChatMessage::user("What is MACD?"),
            ChatMessage::assistant("MACD is a trend indicator."),
        ];
        store.append_and_persist(&id, &messages).await.unwrap();

        let listed = store.list_sessions().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].message_count, 2);
        assert_eq!(listed[0].last_message.as_deref(), Some("MACD is a trend indicator."));
        assert_eq!(store.load_session(&id).await.unwrap(), messages);
    }

    #[tokio::test]
    async fn test_persist_without_record_inserts_at_head() {
        let (_, store) = store();
        let first = store.create_session().await.unwrap();
        store
            .append_and_persist(&first, &[ChatMessage::welcome(), ChatMessage::user("one")])
            .await
            .unwrap();

        store
            .append_and_persist("orphan", &[ChatMessage::welcome(), ChatMessage::user("two")])
            .await
            .unwrap();

        let listed = store.list_sessions().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, "orphan");
        assert_eq!(listed[1].id, first);
    }

    #[tokio::test]
    async fn test_ids_are_unique_and_increasing() {
        let (_, store) = store();
        let a = store.create_session().await.unwrap();
        let b = store.create_session().await.unwrap();
        let c = store.create_session().await.unwrap();

        let a: i64 = a.parse().unwrap();
        let b: i64 = b.parse().unwrap();
        let c: i64 = c.parse().unwrap();
        assert!(a < b && b < c);
    }

    #[tokio::test]
    async fn test_delete_removes_metadata_and_messages() {
        let (backend, store) = store();
        let id = store.create_session().await.unwrap();
        store
            .append_and_persist(&id, &[ChatMessage::welcome(), ChatMessage::user("hi")])
            .await
            .unwrap();

        store.delete_session(&id).await.unwrap();

        assert!(store.list_sessions().await.unwrap().is_empty());
        assert_eq!(backend.get(&messages_key(&id)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_data_falls_back_to_defaults() {
        let (backend, store) = store();
        backend.set(SESSIONS_KEY, "{not json").await.unwrap();
        backend.set(&messages_key("42"), "[oops").await.unwrap();

        assert!(store.list_sessions().await.unwrap().is_empty());

        let messages = store.load_session("42").await.unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].is_welcome());
    }

    #[tokio::test]
    async fn test_missing_session_loads_welcome() {
        let (_, store) = store();
        let messages = store.load_session("does-not-exist").await.unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].is_welcome());
    }

    #[tokio::test]
    async fn test_username() {
        let (_, store) = store();
        assert_eq!(store.username().await.unwrap(), None);
        store.save_username("trader").await.unwrap();
        assert_eq!(store.username().await.unwrap().as_deref(), Some("trader"));
    }
}
