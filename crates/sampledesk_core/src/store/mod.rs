//! In-memory stores owned by the host session.
//!
//! # Responsibility
//! - Hold the project/sample assignment relation as an explicit value.
//! - Funnel every membership change through one mutation entry point.
//!
//! # Invariants
//! - Stores never read or write the sample collection.

pub mod assignment;
