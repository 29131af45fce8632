//! HTTP boundary for Kiln.
//!
//! Resolves the caller from each request's `Authorization` header, runs the
//! repository operation under a per-request deadline, and maps the returned
//! error kind onto a status code and the platform's error body.
//!
//! The server is embedded: the host process supplies the [`StoreConnector`]
//! for its resource store, then starts it.
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use kiln_server::{KilnServer, ServerConfig, ServerResult};
//! # async fn run(connector: Arc<dyn kiln_store::StoreConnector>) -> ServerResult<()> {
//! let config = ServerConfig::load("kiln.toml")?;
//! let server = KilnServer::new(config, connector);
//! server.init_tracing()?;
//! server.serve().await
//! # }
//! ```
//!
//! [`StoreConnector`]: kiln_store::StoreConnector

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;
pub mod telemetry;

pub use auth::{resolve_caller, Caller};
pub use config::{ServerConfig, StoreSettings};
pub use error::{ApiError, ServerError, ServerResult};
pub use server::KilnServer;
pub use state::AppState;
pub use telemetry::init_tracing;
