//! WebSocket transport.
//!
//! Default [`Connector`] over `tokio-tungstenite`. Requests go out as binary
//! messages; responses may arrive as text or binary messages.

use async_trait::async_trait;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::error::ProtocolError as WsProtocolError;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::connection::{Connection, Connector};
use super::error::{DriverError, DriverResult};

/// WebSocket connector (`ws://` or `wss://`)
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    /// 새 커넥터 생성
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// 서버 URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Connector for WsConnector {
    type Connection = WsConnection;

    async fn connect(&self) -> DriverResult<WsConnection> {
        let (stream, _) = connect_async(self.url.as_str())
            .await
            .map_err(|e| DriverError::transport(format!("Failed to connect to {}: {}", self.url, e)))?;

        tracing::debug!(url = %self.url, "websocket connected");

        Ok(WsConnection {
            stream,
            url: self.url.clone(),
        })
    }
}

/// WebSocket connection
pub struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    url: String,
}

impl WsConnection {
    /// 서버 URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Connection for WsConnection {
    async fn send(&mut self, message: Bytes) -> DriverResult<()> {
        self.stream
            .send(Message::Binary(message.to_vec()))
            .await
            .map_err(map_ws_error)
    }

    async fn recv(&mut self) -> DriverResult<Bytes> {
        loop {
            match self.stream.next().await {
                None => return Err(DriverError::ConnClosed),
                Some(Err(e)) => return Err(map_ws_error(e)),
                Some(Ok(Message::Text(text))) => return Ok(Bytes::from(text)),
                Some(Ok(Message::Binary(data))) => return Ok(Bytes::from(data)),
                Some(Ok(Message::Close(_))) => return Err(DriverError::ConnClosed),
                // ping/pong
                Some(Ok(_)) => continue,
            }
        }
    }

    async fn close(&mut self) -> DriverResult<()> {
        match self.stream.close(None).await {
            Ok(()) | Err(WsError::ConnectionClosed) | Err(WsError::AlreadyClosed) => Ok(()),
            Err(e) => Err(map_ws_error(e)),
        }
    }
}

impl std::fmt::Debug for WsConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsConnection").field("url", &self.url).finish()
    }
}

/// 닫힌 연결 관련 에러는 `ConnClosed` 로, 나머지는 그대로 전달
fn map_ws_error(err: WsError) -> DriverError {
    match err {
        WsError::ConnectionClosed
        | WsError::AlreadyClosed
        | WsError::Protocol(WsProtocolError::SendAfterClosing) => DriverError::ConnClosed,
        WsError::Io(e) => DriverError::Io(e),
        other => DriverError::transport(other.to_string()),
    }
}
