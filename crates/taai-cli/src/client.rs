//! HTTP client for the TAAI server routes.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use taai_core::{ChatCompletionRequest, ChatCompletionResponse, ErrorResponse};
use thiserror::Error;

/// Which backend answers a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    OpenAi,
    Agent,
}

impl Provider {
    pub fn route(&self) -> &'static str {
        match self {
            Provider::OpenAi => "/api/chat",
            Provider::Agent => "/api/agent",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::OpenAi => write!(f, "openai"),
            Provider::Agent => write!(f, "agent"),
        }
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" | "chat" => Ok(Provider::OpenAi),
            "agent" => Ok(Provider::Agent),
            other => Err(format!("unknown provider '{}', expected openai or agent", other)),
        }
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },
}

/// Anything that can answer a chat request
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(
        &self,
        provider: Provider,
        request: &ChatCompletionRequest,
    ) -> Result<String, ClientError>;
}

pub struct HttpChatClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpChatClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /health` body
    pub async fn health(&self) -> Result<serde_json::Value, ClientError> {
        let response = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Server {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl ChatBackend for HttpChatClient {
    async fn complete(
        &self,
        provider: Provider,
        request: &ChatCompletionRequest,
    ) -> Result<String, ClientError> {
        let url = format!("{}{}", self.base_url, provider.route());
        tracing::debug!("POST {} (history: {})", url, request.history.len());

        let response = self.http.post(&url).json(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatCompletionResponse = response.json().await?;
        Ok(body.response)
    }
}
