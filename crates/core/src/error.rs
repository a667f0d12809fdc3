use thiserror::Error;

use crate::document::validate::ValidationError;
use crate::store::StoreError;

/// Failures surfaced by the course and page services.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("store failure: {0}")]
    Store(String),
}

impl CoreError {
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(e) => Self::Validation(e),
            other => Self::Store(other.to_string()),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
