//! Response status codes.
//!
//! Every response frame carries a numeric status. Three of them steer the
//! reassembly loop (`200`, `204`, `206`), one asks the client to answer an
//! authentication challenge (`407`), and the remainder are terminal failures.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fallback text for codes missing from the status table.
pub const UNKNOWN_ERROR_MESSAGE: &str = "an unknown error occurred";

/// Numeric response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusCode(pub u16);

impl StatusCode {
    /// Terminal success.
    pub const SUCCESS: StatusCode = StatusCode(200);
    /// Terminal success without content.
    pub const NO_CONTENT: StatusCode = StatusCode(204);
    /// Partial content, more frames follow.
    pub const PARTIAL_CONTENT: StatusCode = StatusCode(206);
    /// Credentials were rejected.
    pub const UNAUTHORIZED: StatusCode = StatusCode(401);
    /// Authentication challenge, answered inline.
    pub const AUTHENTICATE: StatusCode = StatusCode(407);
    /// Request could not be parsed by the server.
    pub const MALFORMED_REQUEST: StatusCode = StatusCode(498);
    /// Request arguments were rejected.
    pub const INVALID_REQUEST_ARGUMENTS: StatusCode = StatusCode(499);
    /// Generic server failure.
    pub const SERVER_ERROR: StatusCode = StatusCode(500);
    /// Script failed to evaluate.
    pub const SCRIPT_EVALUATION_ERROR: StatusCode = StatusCode(597);
    /// Script evaluation exceeded the server timeout.
    pub const SERVER_TIMEOUT: StatusCode = StatusCode(598);
    /// Result could not be serialized by the server.
    pub const SERVER_SERIALIZATION_ERROR: StatusCode = StatusCode(599);

    /// Raw numeric value.
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Message from the static status table.
    pub fn message(&self) -> Option<&'static str> {
        match *self {
            StatusCode::UNAUTHORIZED => Some("Unauthorized"),
            StatusCode::AUTHENTICATE => Some("Authenticate"),
            StatusCode::MALFORMED_REQUEST => Some("Malformed Request"),
            StatusCode::INVALID_REQUEST_ARGUMENTS => Some("Invalid Request Arguments"),
            StatusCode::SERVER_ERROR => Some("Server Error"),
            StatusCode::SCRIPT_EVALUATION_ERROR => Some("Script Evaluation Error"),
            StatusCode::SERVER_TIMEOUT => Some("Server Timeout"),
            StatusCode::SERVER_SERIALIZATION_ERROR => Some("Server Serialization Error"),
            _ => None,
        }
    }

    /// Table message, or the generic fallback.
    pub fn describe(&self) -> &'static str {
        self.message().unwrap_or(UNKNOWN_ERROR_MESSAGE)
    }

    /// Whether this status ends the exchange successfully.
    pub fn is_terminal_success(&self) -> bool {
        matches!(*self, StatusCode::SUCCESS | StatusCode::NO_CONTENT)
    }

    /// Whether the server may succeed if the same request is sent again.
    pub fn is_transient(&self) -> bool {
        matches!(*self, StatusCode::SERVER_TIMEOUT | StatusCode::SERVER_ERROR)
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        StatusCode(code)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
