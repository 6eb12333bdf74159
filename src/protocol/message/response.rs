//! Gremlin protocol response messages.
//!
//! Response messages are sent from the server to the client. One logical
//! exchange may produce several of them.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;

use crate::protocol::status::StatusCode;

/// A single response frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// Id of the request this frame answers
    #[serde(default)]
    pub request_id: Option<String>,
    /// Status of this frame
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ResponseStatus,
    /// Payload of this frame
    #[serde(default, deserialize_with = "null_as_default")]
    pub result: ResponseResult,
}

impl Response {
    /// Status code of this frame.
    pub fn code(&self) -> StatusCode {
        self.status.code
    }
}

/// Response status block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseStatus {
    /// Status code
    #[serde(default)]
    pub code: StatusCode,
    /// Server-provided message
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    /// Extra status attributes
    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: HashMap<String, serde_json::Value>,
}

/// Response result block.
///
/// `data` is kept as undecoded JSON so that it can be handed to the caller
/// verbatim or split into items without a round trip through a value tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseResult {
    /// Encoded result payload
    #[serde(default)]
    pub data: Option<Box<RawValue>>,
    /// Result metadata
    #[serde(default, deserialize_with = "null_as_default")]
    pub meta: HashMap<String, serde_json::Value>,
}

impl ResponseResult {
    /// Raw JSON text of `data`, if present.
    pub fn raw_data(&self) -> Option<&str> {
        self.data.as_deref().map(RawValue::get)
    }

    /// Split `data` into its ordered list items.
    ///
    /// Absent or `null` data yields no items; any other non-list payload is a
    /// decode error.
    pub fn items(&self) -> Result<Vec<Box<RawValue>>, serde_json::Error> {
        match self.raw_data() {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(raw),
        }
    }
}

/// Explicit `null` decodes like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
