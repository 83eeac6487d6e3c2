//! Failure classes of a model request. All of them end in the fallback path.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model endpoint returned status {0}")]
    Status(u16),

    #[error("model endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("model did not answer within {0} s")]
    Timeout(u64),

    #[error("no JSON object found in model output")]
    MissingJson,

    #[error("malformed JSON from model: {0}")]
    Json(#[from] serde_json::Error),

    #[error("model returned no recommendations")]
    Empty,
}
