//! Network layer - HTTP Executor
//!
//! The Network actor receives request commands and sends back completions.

pub mod actor;
pub mod client;

pub use actor::NetworkActor;
pub use client::{create_client, execute, validate_url};
