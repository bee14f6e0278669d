//! Machine-readable error body

use serde::{Deserialize, Serialize};

/// Error body returned by every non-2xx control-plane and indexer response:
/// `{ "error": code, "message": text }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
