use thiserror::Error;

/// Errors surfaced by the Redis cache backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// A mutation was attempted while the backend is frozen.
    #[error("cannot add or modify entries because the backend of cache \"{cache}\" is frozen")]
    Frozen { cache: String },

    /// `freeze` was called on an already frozen backend.
    #[error("the backend of cache \"{cache}\" is already frozen")]
    AlreadyFrozen { cache: String },

    /// Network or protocol failure talking to Redis.
    #[error("redis error: {0}")]
    Transport(#[from] redis::RedisError),

    /// Payload compression or decompression failed.
    #[error("payload codec error: {0}")]
    Codec(#[from] std::io::Error),

    /// Invalid construction option.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl BackendError {
    /// Create a new Frozen error
    pub fn frozen(cache: impl Into<String>) -> Self {
        Self::Frozen {
            cache: cache.into(),
        }
    }

    /// Create a new AlreadyFrozen error
    pub fn already_frozen(cache: impl Into<String>) -> Self {
        Self::AlreadyFrozen {
            cache: cache.into(),
        }
    }

    /// Create a new Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// True when the caller violated a backend state precondition
    /// (frozen-state rules) rather than the store failing.
    pub fn is_state_error(&self) -> bool {
        matches!(self, Self::Frozen { .. } | Self::AlreadyFrozen { .. })
    }

    /// True for network/protocol failures talking to the store.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Convenience result type for backend operations
pub type Result<T> = std::result::Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frozen_error() {
        let err = BackendError::frozen("pages");
        assert_eq!(
            err.to_string(),
            "cannot add or modify entries because the backend of cache \"pages\" is frozen"
        );
        assert!(err.is_state_error());
        assert!(!err.is_transport_error());
    }

    #[test]
    fn test_already_frozen_error() {
        let err = BackendError::already_frozen("pages");
        assert_eq!(
            err.to_string(),
            "the backend of cache \"pages\" is already frozen"
        );
        assert!(err.is_state_error());
    }

    #[test]
    fn test_transport_error_conversion() {
        let redis_err = redis::RedisError::from((redis::ErrorKind::IoError, "connection refused"));
        let err: BackendError = redis_err.into();
        assert!(matches!(err, BackendError::Transport(_)));
        assert!(err.is_transport_error());
        assert!(!err.is_state_error());
    }

    #[test]
    fn test_codec_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad gzip frame");
        let err: BackendError = io_err.into();
        assert!(matches!(err, BackendError::Codec(_)));
        assert!(err.to_string().contains("bad gzip frame"));
    }

    #[test]
    fn test_configuration_error() {
        let err = BackendError::configuration("compression_level must be 0-9");
        assert_eq!(
            err.to_string(),
            "configuration error: compression_level must be 0-9"
        );
        assert!(!err.is_state_error());
    }
}
