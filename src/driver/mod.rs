//! Driver Module
//!
//! Gremlin 서버 클라이언트
//!
//! # Components
//!
//! - 연결 풀 (ConnectionPool, PoolConfig)
//! - 프로토콜 세션: 요청 프레이밍, 응답 재조립, 인라인 인증 (ProtocolSession)
//! - 클라이언트 (Client, ClientConfig)
//! - 전송: WebSocket (WsConnector)
//!
//! # Example
//!
//! ```ignore
//! use gremlin_driver::driver::{Client, ClientConfig};
//! use gremlin_driver::protocol::EvalArgs;
//!
//! let config = ClientConfig::builder("ws://localhost:8182/gremlin")
//!     .with_credentials("user", "password")
//!     .with_pool_size(3, 5)
//!     .build();
//! let client = Client::connect(config).await?;
//!
//! let output = client.eval(EvalArgs::new("g.V().count()")).await?;
//! let counts: Vec<i64> = output.decode()?;
//!
//! client.close().await?;
//! ```

use std::future::Future;
use std::time::Duration;

mod auth;
mod client;
mod config;
mod connection;
mod error;
#[cfg(test)]
mod mock;
mod output;
mod pool;
mod session;
mod websocket;

// Re-exports
pub use auth::Credentials;
pub use client::{Client, GREMLIN_GROOVY};
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_URL};
pub use connection::{Connection, Connector};
pub use error::{DriverError, DriverResult};
pub use output::RawOutput;
pub use pool::{
    ConnectionPool, ConnectionState, PoolConfig, PoolConfigBuilder, PoolMetrics, PooledConnection,
    DEFAULT_MAX_CONNECTIONS, DEFAULT_MIN_CONNECTIONS,
};
pub use session::ProtocolSession;
pub use websocket::{WsConnection, WsConnector};

/// `limit` 이 있으면 `fut` 을 그 시간 안에 끝내고, 넘기면 `Timeout`
pub(crate) async fn with_deadline<F, T>(
    limit: Option<Duration>,
    what: &'static str,
    fut: F,
) -> DriverResult<T>
where
    F: Future<Output = DriverResult<T>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| DriverError::timeout(format!("{} after {:?}", what, limit)))?,
        None => fut.await,
    }
}
