//! Guided query dialog.
//!
//! A conversation walks region → province → district, then answers with the
//! district's classified readings for a date. The engine is pure with respect
//! to state: it takes the current [`ConversationState`] and returns the next
//! one, leaving storage of that state to the caller.

pub mod commands;
pub mod date;
pub mod engine;
pub mod render;
pub mod state;

pub use commands::{Command, CommandKeywords};
pub use date::DateLiteral;
pub use engine::{DialogEngine, Turn};
pub use state::{ConversationState, Step};
