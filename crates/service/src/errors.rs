use thiserror::Error;

use models::errors::ModelError;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Client-facing message such as `Missing name`.
    #[error("{0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ServiceError {
    pub fn not_found(kind: impl std::fmt::Display, id: &str) -> Self {
        Self::NotFound(format!("{}.{}", kind, id))
    }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(msg) => Self::Validation(msg),
            other => Self::Storage(StorageError::Model(other)),
        }
    }
}
