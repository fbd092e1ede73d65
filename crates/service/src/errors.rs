use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("{0}")]
    Store(String),
}

impl ServiceError {
    pub fn empty(field: &str) -> Self {
        Self::Validation(format!("{field} must not be empty"))
    }
}

impl From<redis::RedisError> for ServiceError {
    fn from(e: redis::RedisError) -> Self {
        ServiceError::Store(e.to_string())
    }
}
