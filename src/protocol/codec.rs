//! Gremlin message codec for tokio_util.
//!
//! Outbound requests are framed as a single transport message:
//!
//! ```text
//! [1 byte: N][N bytes: content type][JSON request]
//! ```
//!
//! Inbound responses carry no framing of their own. Every transport message
//! is one JSON response document.

use bytes::{BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use super::error::{ProtocolError, ProtocolResult};
use super::message::{Request, Response};

/// Content type announced in every request frame.
pub const MIME_TYPE: &str = "application/json";

/// Maximum content-type length a single length byte can describe.
pub const MAX_MIME_TYPE_LEN: usize = u8::MAX as usize;

/// Request/response codec.
#[derive(Debug, Clone)]
pub struct GremlinCodec {
    mime_type: &'static str,
}

impl GremlinCodec {
    /// Create a codec for the JSON content type.
    pub fn new() -> Self {
        Self {
            mime_type: MIME_TYPE,
        }
    }

    /// Content type written into request frames.
    pub fn mime_type(&self) -> &str {
        self.mime_type
    }

    /// Encode a request into a standalone frame.
    pub fn encode_request(&mut self, request: &Request) -> ProtocolResult<Bytes> {
        let mut buf = BytesMut::new();
        self.encode(request, &mut buf)?;
        Ok(buf.freeze())
    }

    /// Decode a complete transport message into a response.
    pub fn decode_response(&self, message: &[u8]) -> ProtocolResult<Response> {
        serde_json::from_slice(message).map_err(ProtocolError::Decode)
    }
}

impl Default for GremlinCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Encoder<&'a Request> for GremlinCodec {
    type Error = ProtocolError;

    fn encode(&mut self, item: &'a Request, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let payload = serde_json::to_vec(item).map_err(ProtocolError::Serialize)?;
        write_frame(self.mime_type, &payload, dst)
    }
}

impl Decoder for GremlinCodec {
    type Item = Response;
    type Error = ProtocolError;

    /// Consumes the whole buffer: the transport already delimits messages.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        let message = src.split();
        self.decode_response(&message).map(Some)
    }
}

/// Write a content-type header followed by the payload.
pub fn write_frame(mime_type: &str, payload: &[u8], dst: &mut BytesMut) -> ProtocolResult<()> {
    let mime = mime_type.as_bytes();
    if mime.len() > MAX_MIME_TYPE_LEN {
        return Err(ProtocolError::ContentTypeTooLong(mime.len()));
    }

    dst.reserve(1 + mime.len() + payload.len());
    dst.put_u8(mime.len() as u8);
    dst.put_slice(mime);
    dst.put_slice(payload);
    Ok(())
}

/// Split a request frame into its content type and payload.
pub fn split_frame(frame: &[u8]) -> ProtocolResult<(&str, &[u8])> {
    let (&len, rest) = frame
        .split_first()
        .ok_or(ProtocolError::TruncatedFrame { declared: 1, available: 0 })?;
    let len = len as usize;

    if rest.len() < len {
        return Err(ProtocolError::TruncatedFrame {
            declared: len,
            available: rest.len(),
        });
    }

    let (mime, payload) = rest.split_at(len);
    let mime = std::str::from_utf8(mime).map_err(|_| ProtocolError::InvalidContentType)?;
    Ok((mime, payload))
}
