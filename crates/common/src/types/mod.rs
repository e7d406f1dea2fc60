use serde::{Deserialize, Serialize};

/// Body of `GET /api/v1/status`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub status: String,
}

impl Status {
    pub fn ok() -> Self {
        Self { status: "OK".into() }
    }
}

/// JSON error body returned on every failed request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, detail: Option<String>) -> Self {
        Self { error: error.into(), detail }
    }
}
