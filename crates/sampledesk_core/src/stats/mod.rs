//! Status rollups over sample snapshots.
//!
//! # Responsibility
//! - Turn a flat record collection into dashboard counters.
//! - Stay stateless: every input, including "now", is passed in.

pub mod aggregator;
