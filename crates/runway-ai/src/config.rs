//! Advisor endpoint configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.1:latest";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Where and how to reach the chat model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    /// Server root; the chat endpoint is `{base_url}/api/chat`.
    pub base_url: String,
    pub model: String,
    /// Upper bound for one request, including reading the body.
    pub timeout_secs: u64,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AdvisorConfig {
    /// Defaults overlaid with `OLLAMA_BASE_URL`, `OLLAMA_MODEL` and
    /// `OLLAMA_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        if let Some(url) = non_empty("OLLAMA_BASE_URL") {
            self.base_url = url;
        }
        if let Some(model) = non_empty("OLLAMA_MODEL") {
            self.model = model;
        }
        if let Some(secs) = non_empty("OLLAMA_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.timeout_secs = secs;
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url.trim_end_matches('/'))
    }
}
