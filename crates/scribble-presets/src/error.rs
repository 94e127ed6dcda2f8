//! Error types for preset storage and synchronization.

use std::fmt;

/// Errors raised by the server-side preset store.
#[derive(Debug)]
pub enum StoreError {
    /// I/O error during file operations.
    Io(std::io::Error),
    /// JSON encode failure.
    Serialization(String),
    /// Name is empty, too long, contains a path separator, or contains `..`.
    InvalidName(String),
    /// Text exceeds the size limit.
    TextTooLarge {
        /// UTF-8 length of the rejected text.
        len: usize,
        /// Maximum accepted length.
        limit: usize,
    },
    /// Storage file has an unexpected shape.
    Corruption(String),
}

impl StoreError {
    /// Whether the error is the caller's fault (reported as 400).
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidName(_) | Self::TextTooLarge { .. })
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Serialization(msg) => write!(f, "serialization error: {msg}"),
            Self::InvalidName(_) => f.write_str("invalid preset name"),
            Self::TextTooLarge { limit, .. } => {
                write!(f, "text too large (>{}KB)", limit / 1024)
            }
            Self::Corruption(msg) => write!(f, "storage corruption: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced to the editor by the preset synchronizer.
#[derive(Debug)]
pub enum PresetError {
    /// Non-success response. `message` is the body's `error` field, or the
    /// numeric status when the body has none.
    Remote {
        /// HTTP status code.
        status: u16,
        /// Human-readable message.
        message: String,
    },
    /// The request never produced a response.
    Transport(String),
    /// A success response whose body is not the expected JSON.
    Decode(String),
    /// The owning editor was torn down before the result arrived.
    Disposed,
    /// Load of a name that is not in the cached list.
    UnknownPreset(String),
    /// Local file I/O (export).
    Io(std::io::Error),
}

impl fmt::Display for PresetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote { message, .. } => f.write_str(message),
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
            Self::Decode(msg) => write!(f, "invalid response body: {msg}"),
            Self::Disposed => f.write_str("editor was disposed"),
            Self::UnknownPreset(name) => write!(f, "unknown preset {name:?}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for PresetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PresetError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Result type for synchronizer operations.
pub type PresetResult<T> = Result<T, PresetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_display() {
        assert_eq!(
            StoreError::InvalidName("a/b".into()).to_string(),
            "invalid preset name"
        );
        let big = StoreError::TextTooLarge {
            len: 200_000,
            limit: 100 * 1024,
        };
        assert_eq!(big.to_string(), "text too large (>100KB)");
        assert!(big.is_validation());
        let io = StoreError::from(std::io::Error::other("disk"));
        assert!(!io.is_validation());
        assert!(std::error::Error::source(&io).is_some());
    }

    #[test]
    fn remote_error_shows_message_only() {
        let err = PresetError::Remote {
            status: 400,
            message: "invalid preset name".into(),
        };
        assert_eq!(err.to_string(), "invalid preset name");
        let err = PresetError::Remote {
            status: 502,
            message: "502".into(),
        };
        assert_eq!(err.to_string(), "502");
    }
}
