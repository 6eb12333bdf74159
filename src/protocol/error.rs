//! Protocol error types.

use std::fmt;
use std::io;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors raised while framing requests or decoding responses.
#[derive(Debug)]
pub enum ProtocolError {
    /// I/O error surfaced through the codec traits
    Io(io::Error),

    /// Request could not be serialized
    Serialize(serde_json::Error),

    /// Response payload is not valid JSON for the expected shape
    Decode(serde_json::Error),

    /// Frame is shorter than its declared content-type header
    TruncatedFrame { declared: usize, available: usize },

    /// Content-type tag is longer than a single length byte can describe
    ContentTypeTooLong(usize),

    /// Content-type tag is not valid UTF-8
    InvalidContentType,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Io(e) => write!(f, "I/O error: {}", e),
            ProtocolError::Serialize(e) => write!(f, "Serialize error: {}", e),
            ProtocolError::Decode(e) => write!(f, "Decode error: {}", e),
            ProtocolError::TruncatedFrame { declared, available } => write!(
                f,
                "Truncated frame: header declares {} bytes, {} available",
                declared, available
            ),
            ProtocolError::ContentTypeTooLong(len) => {
                write!(f, "Content type too long: {} bytes (max: 255)", len)
            }
            ProtocolError::InvalidContentType => write!(f, "Content type is not valid UTF-8"),
        }
    }
}

impl std::error::Error for ProtocolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProtocolError::Io(e) => Some(e),
            ProtocolError::Serialize(e) | ProtocolError::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ProtocolError {
    fn from(err: io::Error) -> Self {
        ProtocolError::Io(err)
    }
}

impl ProtocolError {
    /// Whether the error came from an inbound payload.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            ProtocolError::Decode(_)
                | ProtocolError::TruncatedFrame { .. }
                | ProtocolError::InvalidContentType
        )
    }
}
