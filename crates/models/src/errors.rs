use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    /// Missing or mistyped request field; the message is client facing.
    #[error("{0}")]
    Validation(String),
    #[error("unknown class: {0}")]
    UnknownClass(String),
    #[error("malformed record {key}: {reason}")]
    Malformed { key: String, reason: String },
    #[error("encoding error: {0}")]
    Codec(String),
    #[error("password hashing failed: {0}")]
    Hash(String),
}

impl ModelError {
    pub fn missing(field: &str) -> Self { Self::Validation(format!("Missing {}", field)) }
    pub fn invalid(field: &str) -> Self { Self::Validation(format!("Invalid {}", field)) }
}
