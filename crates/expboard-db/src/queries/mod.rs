//! Database query implementations.

pub mod experiments;
