//! Chat Orchestrator
//!
//! 持有当前会话 id 和消息列表，负责提交消息、切换和删除会话。
//! 每次变更后整体写回 [`SessionStore`]。

use std::sync::Arc;

use taai_core::types::{ChatMessage, HistoryTurn};
use taai_core::ChatCompletionRequest;
use taai_session::{SessionStore, StorageResult};
use tracing::{debug, warn};

use crate::client::{ChatBackend, Provider};

/// 请求失败时追加到对话中的提示
pub const CLIENT_ERROR_REPLY: &str = "Sorry, an error occurred. Please try again.";

pub struct Orchestrator<C: ChatBackend> {
    store: Arc<SessionStore>,
    client: C,
    provider: Provider,
    active_id: String,
    messages: Vec<ChatMessage>,
}

impl<C: ChatBackend> Orchestrator<C> {
    /// 恢复上次打开的会话，没有则新建一个
    pub async fn start(store: Arc<SessionStore>, client: C) -> StorageResult<Self> {
        let (active_id, messages) = match store.current_session_id().await? {
            Some(id) => {
                let messages = store.load_session(&id).await?;
                debug!("Restored session {} ({} messages)", id, messages.len());
                (id, messages)
            }
            None => {
                let id = store.create_session().await?;
                let messages = store.load_session(&id).await?;
                (id, messages)
            }
        };

        Ok(Self {
            store,
            client,
            provider: Provider::default(),
            active_id,
            messages,
        })
    }

    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.provider = provider;
        self
    }

    pub fn set_provider(&mut self, provider: Provider) {
        self.provider = provider;
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// 新建并激活一个会话
    pub async fn new_chat(&mut self) -> StorageResult<&str> {
        let id = self.store.create_session().await?;
        self.messages = self.store.load_session(&id).await?;
        self.active_id = id;
        Ok(&self.active_id)
    }

    /// 切换到已有会话
    pub async fn switch_to(&mut self, id: &str) -> StorageResult<()> {
        self.store.set_current_session_id(id).await?;
        self.messages = self.store.load_session(id).await?;
        self.active_id = id.to_string();
        Ok(())
    }

    /// 发送一条消息并返回助手回复
    ///
    /// 空白输入直接忽略，返回 `None`。请求失败时追加固定的道歉消息。
    pub async fn submit(&mut self, input: &str) -> StorageResult<Option<&ChatMessage>> {
        if input.trim().is_empty() {
            return Ok(None);
        }

        let history: Vec<HistoryTurn> = self.messages.iter().map(ChatMessage::to_turn).collect();

        self.messages.push(ChatMessage::user(input));
        self.persist().await?;

        let request = ChatCompletionRequest::new(input, history);
        let reply = match self.client.complete(self.provider, &request).await {
            Ok(text) => ChatMessage::assistant(text),
            Err(e) => {
                warn!("Chat request failed: {}", e);
                ChatMessage::assistant(CLIENT_ERROR_REPLY)
            }
        };

        self.messages.push(reply);
        self.persist().await?;
        Ok(self.messages.last())
    }

    /// 删除会话；删除的是当前会话时立即新建一个
    pub async fn delete(&mut self, id: &str) -> StorageResult<()> {
        self.store.delete_session(id).await?;
        if id == self.active_id {
            self.new_chat().await?;
        }
        Ok(())
    }

    async fn persist(&self) -> StorageResult<()> {
        self.store
            .append_and_persist(&self.active_id, &self.messages)
            .await
    }
}
