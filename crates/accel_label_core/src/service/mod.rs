//! Interaction services.
//!
//! # Responsibility
//! - Orchestrate recording loading, interval storage and chart building into
//!   user-level actions.
//! - Keep front-ends decoupled from storage and plotting details.

pub mod session;
