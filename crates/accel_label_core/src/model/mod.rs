//! Domain model for recordings and labeled intervals.
//!
//! # Responsibility
//! - Define the data structures shared by loading, storage, plotting and the
//!   interaction session.
//!
//! # Invariants
//! - All instants are absolute epoch nanoseconds (`Timestamp`).
//! - Regions and labels share one shape but live in separate sequences.

pub mod interval;
pub mod recording;
pub mod timestamp;
