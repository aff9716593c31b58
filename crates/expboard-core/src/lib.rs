//! Experiment board core library.
//!
//! Domain models and record operations for the experiment kanban board.

pub mod board;
pub mod error;
pub mod experiment;

pub use error::{ExpError, ExpResult};
