//! Shared error type across wirecall crates.

use thiserror::Error;

/// Stable error codes (used in logs and by tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Inbound text is not a valid envelope.
    Decode,
    /// Outbound value could not be encoded.
    Encode,
    /// Underlying channel failed or closed mid-send.
    Transport,
    /// Invalid configuration.
    Config,
    /// Unsupported config/protocol version.
    UnsupportedVersion,
    /// Anything else.
    Internal,
}

impl ErrorCode {
    /// String representation used in structured log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Decode => "DECODE",
            ErrorCode::Encode => "ENCODE",
            ErrorCode::Transport => "TRANSPORT",
            ErrorCode::Config => "CONFIG",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, WireCallError>;

/// Unified error type used by core and worker.
#[derive(Debug, Error)]
pub enum WireCallError {
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("transport: {0}")]
    Transport(String),
    #[error("config: {0}")]
    Config(String),
    #[error("unsupported version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl WireCallError {
    /// Map to a stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            WireCallError::Decode(_) => ErrorCode::Decode,
            WireCallError::Encode(_) => ErrorCode::Encode,
            WireCallError::Transport(_) => ErrorCode::Transport,
            WireCallError::Config(_) => ErrorCode::Config,
            WireCallError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            WireCallError::Internal(_) => ErrorCode::Internal,
        }
    }
}
