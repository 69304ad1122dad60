//! Contains the data models for API requests and responses.

use serde::{Deserialize, Serialize};

/// One-line confirmation or rejection for a lifecycle notification.
#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub message: String,
}

/// Body for the error termination endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorRequest {
    #[serde(default)]
    pub message: Option<String>,
}

/// Body for the reset endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub filename: Option<String>,
}
