//! Error types for Little Star English.

use thiserror::Error;

/// Result type alias using Little Star's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Little Star English.
#[derive(Error, Debug)]
pub enum Error {
    // Network errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] HttpError),

    #[error("Network error: {0}")]
    Network(String),

    // Generative API errors
    #[error("Generative API error: {0}")]
    GenAi(String),

    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error("Response blocked or empty: {0}")]
    Blocked(String),

    // Audio errors
    #[error("Base64 decode error: {0}")]
    Decode(String),

    #[error("PCM format error: {0}")]
    Format(String),

    #[error("Audio output error: {0}")]
    AudioOutput(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Generic errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Playback cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// HTTP-specific errors.
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Request failed with status {status}: {message}")]
    StatusError { status: u16, message: String },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl Error {
    /// Returns true if this error came from the decode stages of the audio
    /// pipeline. Decode errors are surfaced to the caller; playback-stage
    /// errors are logged and swallowed.
    pub const fn is_decode_stage(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::Format(_))
    }

    /// Returns true if this error represents a cancelled playback.
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_stage_classification() {
        assert!(Error::Decode("bad padding".into()).is_decode_stage());
        assert!(Error::Format("zero channels".into()).is_decode_stage());
        assert!(!Error::AudioOutput("no device".into()).is_decode_stage());
        assert!(!Error::Cancelled.is_decode_stage());
    }

    #[test]
    fn test_error_display() {
        let err = Error::GenAi("test error".into());
        assert_eq!(err.to_string(), "Generative API error: test error");

        let err = Error::Http(HttpError::StatusError {
            status: 403,
            message: "forbidden".into(),
        });
        assert_eq!(
            err.to_string(),
            "HTTP request failed: Request failed with status 403: forbidden"
        );
    }

    #[test]
    fn test_cancelled() {
        assert!(Error::Cancelled.is_cancelled());
        assert!(!Error::Network("down".into()).is_cancelled());
    }
}
