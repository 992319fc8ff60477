//! Core domain logic for SampleDesk.
//! This crate is the single source of truth for sample/project membership
//! and dashboard status rollups.

pub mod clock;
pub mod logging;
pub mod model;
pub mod service;
pub mod stats;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::project::{Project, ProjectId, ProjectSummary, SharingPartner};
pub use model::sample::{
    format_sample_id, parse_sample_id, parse_sample_status, parse_sample_type, Sample, SampleId,
    SampleStatus, SampleType, SampleValidationError,
};
pub use service::dashboard::{
    DashboardSession, ProjectDraft, SampleIntake, SessionConfig, SessionError,
};
pub use stats::aggregator::{
    compute_stats, compute_stats_with_clock, compute_stats_with_window, parse_testing_domain,
    AgedRecord, StatsRecord, StatsSnapshot, TestingDomain, TestingDomainError,
    COMPLETED_WINDOW_DAYS,
};
pub use store::assignment::{
    AssignmentChange, AssignmentRecord, AssignmentRelation, AssignmentStore, ProjectMembers,
    DEFAULT_HISTORY_LIMIT,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
