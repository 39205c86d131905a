/// Errors from event log operations.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for log operations.
pub type LogResult<T> = Result<T, LogError>;
