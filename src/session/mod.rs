//! Session layer - the JSON-backed request collection and its controller
//!
//! The document owns records and the dirty flag; the controller maps
//! `SessionCommand`s onto it and reports an `Outcome` for the UI.

pub mod controller;
pub mod document;

pub use controller::{Outcome, SessionCommand, SessionController};
pub use document::SessionDocument;
