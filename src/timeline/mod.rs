//! Timeline derivation: projecting markdown headers onto a date axis and
//! classifying persisted events against the current moment.
//!
//! The generator and the aggregation queries are pure, synchronous functions
//! over in-memory data. "Now" is always injected by the caller so every
//! computation here is testable without a wall clock.

mod aggregate;
mod generate;

pub use aggregate::*;
pub use generate::*;
