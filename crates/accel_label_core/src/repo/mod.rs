//! Repository layer for labeled interval persistence.
//!
//! # Responsibility
//! - Define the storage contract the session depends on.
//! - Isolate JSON file details from interaction orchestration.
//!
//! # Invariants
//! - Repository reads validate every interval before returning it.
//! - Absent files mean "no intervals yet".

pub mod interval_repo;
