//! HTTP API module.
//!
//! This module provides the HTTP server, API types and the log
//! broadcast channel for the preview engine.

pub mod logs;
pub mod server;
pub mod types;

pub use logs::*;
pub use server::{start_server, AppState};
pub use types::*;
