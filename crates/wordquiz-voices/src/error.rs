//! Voice error types.

use thiserror::Error;

/// Errors that can occur when talking to a speech backend.
#[derive(Debug, Error)]
pub enum VoiceError {
    /// The speech daemon rejected our credentials.
    #[error("authentication failed: {0}")]
    Unauthorized(String),

    /// The backend does not offer the requested endpoint or voice.
    #[error("not found: {0}")]
    NotFound(String),

    /// The speech daemon returned an error response.
    #[error("speech API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The TTS program could not be started.
    #[error("failed to launch {program}: {reason}")]
    Spawn { program: String, reason: String },

    /// The TTS program exited unsuccessfully.
    #[error("{program} exited with {status}")]
    CommandFailed { program: String, status: String },
}
