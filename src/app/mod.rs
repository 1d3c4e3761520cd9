//! App layer - central state management and command processing
//!
//! The App actor receives UI events and network responses,
//! drives the session controller, and emits network commands and render state.

pub mod state;
pub mod actor;
pub mod commands;
pub mod input;

pub use state::AppState;
pub use actor::AppActor;
