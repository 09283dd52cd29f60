//! RentWise HTTP service
//!
//! Serves the listing form, runs predictions through the shared
//! [`rentwise_core::PredictionPipeline`], and keeps one prediction history
//! per browser session.

pub mod config;
pub mod server;
pub mod sessions;

pub use config::{ConfigError, ServiceConfig};
pub use server::{build_router, start_server, AppState};
pub use sessions::{SessionId, SessionRegistry};

/// Service version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
