//! Error types for the cache store

use bb8_redis::redis::RedisError;
use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    /// No pooled connection could be handed out in time
    Pool(String),
    /// The Redis command or connection failed
    Redis(Box<RedisError>),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Pool(msg) => write!(f, "Cache pool error: {}", msg),
            StoreError::Redis(err) => write!(f, "Cache store error: {}", err),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Redis(err) => Some(err.as_ref()),
            StoreError::Pool(_) => None,
        }
    }
}

impl From<RedisError> for StoreError {
    fn from(err: RedisError) -> Self {
        StoreError::Redis(Box::new(err))
    }
}

impl From<bb8::RunError<RedisError>> for StoreError {
    fn from(err: bb8::RunError<RedisError>) -> Self {
        match err {
            bb8::RunError::User(err) => StoreError::Redis(Box::new(err)),
            bb8::RunError::TimedOut => {
                StoreError::Pool("timed out waiting for a connection".to_string())
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
