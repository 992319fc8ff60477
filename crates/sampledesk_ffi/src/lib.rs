//! Flutter bridge for SampleDesk core.
//!
//! # Responsibility
//! - Host the FRB-exported API surface consumed by the dashboard shell.

pub mod api;
