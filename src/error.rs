//! Error types for the Net F/T relay

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Net F/T relay error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connection establishment failure (device or downstream)
    #[error("Setup failed: {0}")]
    Setup(String),

    /// I/O error on either link
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Truncated device frame
    #[error("Frame too short: expected {expected} bytes, got {actual}")]
    FrameTooShort {
        /// Required frame length in bytes
        expected: usize,
        /// Bytes actually received
        actual: usize,
    },

    /// Malformed frame or response
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Operation attempted in the wrong session state
    #[error("Invalid session state: {0}")]
    InvalidState(&'static str),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),
}
