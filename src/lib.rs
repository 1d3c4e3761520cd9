//! # PostPerson TUI
//!
//! A terminal HTTP client in the spirit of Postman. Named requests live in a
//! JSON session file that can be edited, sent and saved from the keyboard.
//!
//! ## Features
//! - HTTP methods: GET, POST, PUT, DELETE
//! - Ordered request headers and a free-form body
//! - Response status, timing, headers and JSON syntax highlighting
//! - Atomic saves of the session file
//!
//! ## Architecture
//! Actor-based with channels:
//! - UI Layer (Ratatui) - synchronous
//! - App Layer (State machine around the session controller)
//! - Network Layer (Tokio runtime)

pub mod app;
pub mod config;
pub mod constants;
pub mod error;
pub mod messages;
pub mod models;
pub mod network;
pub mod session;
pub mod ui;
pub mod validators;

// Re-export commonly used types
pub use error::{ExecutionError, SessionError};
pub use models::{Headers, HttpMethod, RequestDefinition, RequestRecord, Response};
pub use messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};
pub use session::{Outcome, SessionCommand, SessionController, SessionDocument};
pub use app::{AppActor, AppState};
pub use network::NetworkActor;
