//! # Gremlin Protocol Implementation
//!
//! Low-level message types and framing for the Gremlin Server WebSocket
//! protocol.
//!
//! ## Overview
//!
//! - **Messages** - typed requests (one argument shape per op) and responses
//! - **Status** - response status codes and their fixed meanings
//! - **Codec** - request framing and response decoding for `tokio_util`
//! - **Error** - framing and decoding errors
//!
//! ## Note
//!
//! Most users should use the high-level [`crate::driver`] module instead of
//! interacting with the protocol directly.

pub mod codec;
pub mod error;
pub mod message;
pub mod status;

pub use codec::{split_frame, GremlinCodec, MIME_TYPE};
pub use error::{ProtocolError, ProtocolResult};
pub use message::{
    AuthenticationArgs, BytecodeArgs, CloseArgs, EvalArgs, GatherArgs, KeysArgs, Op, Request,
    RequestArgs, Response, ResponseResult, ResponseStatus,
};
pub use status::{StatusCode, UNKNOWN_ERROR_MESSAGE};
