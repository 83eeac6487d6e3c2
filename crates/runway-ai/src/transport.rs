//! Chat endpoint wire types and the transport seam.

use crate::error::AdvisorError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Non-streamed, JSON-formatted chat request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub stream: bool,
    pub format: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: String,
}

/// Only `message.content` is read; everything else is ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub message: Option<ResponseMessage>,
}

impl ChatResponse {
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            message: Some(ResponseMessage {
                content: content.into(),
            }),
        }
    }

    pub fn content(&self) -> &str {
        self.message.as_ref().map(|m| m.content.as_str()).unwrap_or("")
    }
}

/// Sends one chat request. Implemented over HTTP for production and by
/// canned responders in tests.
pub trait ChatTransport: Send + Sync {
    fn send(
        &self,
        url: &str,
        request: &ChatRequest,
    ) -> impl Future<Output = Result<ChatResponse, AdvisorError>> + Send;
}

/// reqwest-backed transport with a bounded request timeout.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, AdvisorError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl ChatTransport for HttpTransport {
    fn send(
        &self,
        url: &str,
        request: &ChatRequest,
    ) -> impl Future<Output = Result<ChatResponse, AdvisorError>> + Send {
        let pending = self.client.post(url).json(request).send();
        async move {
            let response = pending.await.map_err(|err| {
                if err.is_connect() {
                    AdvisorError::Unreachable(err.to_string())
                } else {
                    AdvisorError::Http(err)
                }
            })?;
            let status = response.status();
            if !status.is_success() {
                return Err(AdvisorError::Status(status.as_u16()));
            }
            Ok(response.json::<ChatResponse>().await?)
        }
    }
}
