//! Domain model for samples and the projects that group them.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own identifier formats shared with the UI shell.
//!
//! # Invariants
//! - Every sample and project is identified by a stable string id.
//! - Project membership lives in `store::assignment`, never on the models.

pub mod project;
pub mod sample;
