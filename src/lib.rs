//! # Gremlin Driver
//!
//! An async Rust client for Gremlin servers speaking the WebSocket protocol.
//!
//! ## Features
//!
//! - **Connection Pooling** - Warmed, bounded pool; callers block when it is exhausted
//! - **Response Reassembly** - Partial-content frames are joined into one result
//! - **Inline Authentication** - SASL PLAIN answers to authentication challenges
//! - **Cancellation** - Every call can be aborted with a `CancellationToken`
//! - **Async/Await** - Built on Tokio and tokio-tungstenite
//!
//! ## Quick Start
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! gremlin-driver = "0.1"
//! tokio = { version = "1", features = ["full"] }
//! ```
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use gremlin_driver::{Client, ClientConfig, EvalArgs};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder("ws://localhost:8182/gremlin")
//!         .with_credentials("user", "password")
//!         .build();
//!     let client = Client::connect(config).await?;
//!
//!     let output = client
//!         .eval(EvalArgs::new("g.V().has('name', name).count()").with_binding("name", "marko"))
//!         .await?;
//!     let counts: Vec<i64> = output.decode()?;
//!     println!("{:?}", counts);
//!
//!     client.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Cancellation
//!
//! ```rust,no_run
//! # use gremlin_driver::{Client, ClientConfig, EvalArgs, DriverError};
//! # use tokio_util::sync::CancellationToken;
//! # async fn example(client: Client) -> Result<(), Box<dyn std::error::Error>> {
//! let cancel = CancellationToken::new();
//! let guard = cancel.clone();
//! tokio::spawn(async move {
//!     tokio::time::sleep(std::time::Duration::from_secs(5)).await;
//!     guard.cancel();
//! });
//!
//! match client.eval_with_cancel(EvalArgs::new("g.V().count()"), &cancel).await {
//!     Ok(output) => println!("{:?}", output),
//!     Err(DriverError::Canceled) => eprintln!("gave up"),
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`DriverResult`]. Non-success statuses reported by
//! the server surface as [`DriverError::Server`]:
//!
//! ```rust,no_run
//! # use gremlin_driver::{Client, DriverError, EvalArgs};
//! # async fn example(client: Client) {
//! match client.eval(EvalArgs::new("g.V(")).await {
//!     Ok(_) => {}
//!     Err(DriverError::Server { code, message, detail }) => {
//!         eprintln!("{} {}: {}", code, message, detail)
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`driver`] - Client, connection pool and protocol session
//! - [`protocol`] - Low-level Gremlin message types and framing
//!

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod driver;
pub mod protocol;

// Re-exports for convenience
pub use driver::{
    Client, ClientConfig, ClientConfigBuilder, Credentials,
    ConnectionPool, PoolConfig, PoolMetrics,
    DriverError, DriverResult,
    ProtocolSession, RawOutput,
};

pub use protocol::{
    EvalArgs, Request, RequestArgs,
    StatusCode,
};

/// Config alias for convenience
pub type Config = ClientConfig;
