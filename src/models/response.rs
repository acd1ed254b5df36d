//! Response envelope shared by every endpoint

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Outcome marker carried in every response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    /// Request handled
    Success,
    /// Client-caused failure (4xx)
    Fail,
    /// Unexpected server failure (5xx)
    Error,
}

/// Body carrying only a status and a message
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub status: ResponseStatus,
    pub message: String,
}

impl MessageResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: message.into(),
        }
    }
}
