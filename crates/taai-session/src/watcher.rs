//! # Session Watcher
//!
//! 定期重新读取会话列表，只在列表变化时通过 `watch` 通道推送。

use std::sync::Arc;
use std::time::Duration;

use taai_core::types::ChatSession;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::store::SessionStore;

/// 默认轮询间隔
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// 会话列表轮询任务
pub struct SessionWatcher {
    handle: JoinHandle<()>,
}

impl SessionWatcher {
    /// 启动轮询任务，返回任务句柄和会话列表接收端
    pub async fn spawn(
        store: Arc<SessionStore>,
        interval: Duration,
    ) -> (Self, watch::Receiver<Vec<ChatSession>>) {
        let initial = store.list_sessions().await.unwrap_or_else(|e| {
            warn!("Failed to read session list: {}", e);
            Vec::new()
        });
        let (tx, rx) = watch::channel(initial);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let sessions = match store.list_sessions().await {
                    Ok(sessions) => sessions,
                    Err(e) => {
                        warn!("Failed to poll session list: {}", e);
                        continue;
                    }
                };

                let changed = tx.send_if_modified(|current| {
                    if *current == sessions {
                        false
                    } else {
                        *current = sessions;
                        true
                    }
                });
                if changed {
                    debug!("Session list changed");
                }

                if tx.is_closed() {
                    break;
                }
            }
        });

        (Self { handle }, rx)
    }

    /// 停止轮询
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for SessionWatcher {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
