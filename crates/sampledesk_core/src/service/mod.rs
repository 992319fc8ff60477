//! Core use-case services.
//!
//! # Responsibility
//! - Compose store and aggregator calls into use-case level APIs.
//! - Keep UI/FFI layers decoupled from relation and rollup details.

pub mod dashboard;
