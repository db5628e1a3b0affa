//! HTTP API module.
//!
//! Axum server, response types and the live log stream.

pub mod logs;
pub mod server;
pub mod types;

pub use logs::*;
pub use server::{router, start_server};
pub use types::*;
