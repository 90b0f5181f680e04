//! HTTP API module.
//!
//! The upload server, its response types, and the log broadcaster every
//! pipeline stage writes to.

pub mod server;
pub mod types;
pub mod logs;

pub use server::{router, start_server};
pub use types::*;
pub use logs::*;
