//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Own the single process-wide dashboard session the UI shell talks to.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Membership reads and writes always go through the session's store.
//! - A poisoned session lock is recovered, never propagated as a panic.

use chrono::{DateTime, Utc};
use log::warn;
use once_cell::sync::Lazy;
use sampledesk_core::{
    compute_stats, core_version as core_version_inner, format_sample_id as format_sample_id_inner,
    init_logging as init_logging_inner, parse_sample_status, parse_sample_type,
    parse_testing_domain, ping as ping_inner, AgedRecord, DashboardSession, ProjectDraft,
    SampleIntake, SessionConfig, SharingPartner, StatsSnapshot, SystemClock,
};
use std::sync::{Mutex, MutexGuard};

const ID_SEED_ENV: &str = "SAMPLEDESK_ID_SEED";

static SESSION: Lazy<Mutex<DashboardSession<SystemClock>>> = Lazy::new(|| {
    let config = SessionConfig {
        id_seed: resolve_id_seed(),
        ..SessionConfig::default()
    };
    Mutex::new(DashboardSession::with_config(SystemClock, config))
});

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Formats an intake counter the way sample numbers are displayed.
#[flutter_rust_bridge::frb(sync)]
pub fn format_sample_id(counter: u32) -> String {
    format_sample_id_inner(counter)
}

/// Generic action response envelope for create flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Created sample or project id.
    pub id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, id: String) -> Self {
        Self {
            ok: true,
            id: Some(id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }
}

/// Project row for the projects table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectItem {
    pub project_id: String,
    pub name: String,
    pub owner_organization: String,
    pub description: String,
    /// Partner organizations with their badge colors.
    pub shared_with: Vec<PartnerItem>,
    /// Derived from current assignments.
    pub sample_count: u32,
}

/// Sharing partner badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartnerItem {
    pub organization: String,
    pub color: String,
}

/// Loosely typed record handed over by the dashboard's data feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsRecordInput {
    pub organization: Option<String>,
    /// Status label, e.g. `pending` or `in-transit`. Unknown labels count nowhere.
    pub status: Option<String>,
    pub age_days: Option<i64>,
}

/// Dashboard counters envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsResponse {
    pub ok: bool,
    pub pending_arrival: u32,
    pub in_process: u32,
    pub partially_complete: u32,
    pub completed_last_30_days: u32,
    pub message: String,
}

impl StatsResponse {
    fn from_snapshot(snapshot: StatsSnapshot) -> Self {
        Self {
            ok: true,
            pending_arrival: snapshot.pending_arrival,
            in_process: snapshot.in_process,
            partially_complete: snapshot.partially_complete,
            completed_last_30_days: snapshot.completed_last_30_days,
            message: String::new(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            ..Self::from_snapshot(StatsSnapshot::default())
        }
    }
}

/// Registers one new sample in the session.
///
/// # FFI contract
/// - Sync call, in-memory only.
/// - Returns the formatted sample id on success.
#[flutter_rust_bridge::frb(sync)]
pub fn intake_sample(
    sample_type: String,
    test_package: String,
    organization: String,
    add_ons: Vec<String>,
) -> ActionResponse {
    let Some(sample_type) = parse_sample_type(&sample_type) else {
        return ActionResponse::failure(format!(
            "intake_sample failed: unknown sample type `{}`",
            sample_type.trim()
        ));
    };
    let intake = SampleIntake {
        sample_type,
        test_package,
        organization,
        add_ons,
        submitted_on: None,
    };
    match lock_session().intake_sample(intake) {
        Ok(sample_id) => ActionResponse::success("Sample registered.", sample_id),
        Err(err) => ActionResponse::failure(format!("intake_sample failed: {err}")),
    }
}

/// Creates one project owned by `owner_organization`.
#[flutter_rust_bridge::frb(sync)]
pub fn create_project(
    name: String,
    owner_organization: String,
    description: String,
) -> ActionResponse {
    let draft = ProjectDraft {
        name,
        owner_organization,
        description,
        ..ProjectDraft::default()
    };
    match lock_session().create_project(draft) {
        Ok(project_id) => ActionResponse::success("Project created.", project_id),
        Err(err) => ActionResponse::failure(format!("create_project failed: {err}")),
    }
}

/// Shares one project with a partner organization.
///
/// Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn share_project(project_id: String, organization: String, color: String) -> String {
    let partner = SharingPartner {
        organization,
        color,
    };
    match lock_session().share_project(&project_id, partner) {
        Ok(()) => String::new(),
        Err(err) => format!("share_project failed: {err}"),
    }
}

/// Lists projects with derived sample counts.
///
/// `organization = None` lists every project; otherwise only owned or
/// shared ones.
#[flutter_rust_bridge::frb(sync)]
pub fn project_summaries(organization: Option<String>) -> Vec<ProjectItem> {
    let session = lock_session();
    let summaries = match organization.as_deref().map(str::trim) {
        Some(organization) => session.project_summaries_for(organization),
        None => session.project_summaries(),
    };
    summaries
        .into_iter()
        .map(|summary| ProjectItem {
            project_id: summary.project.id,
            name: summary.project.name,
            owner_organization: summary.project.owner_organization,
            description: summary.project.description,
            shared_with: summary
                .project
                .shared_with
                .into_iter()
                .map(|partner| PartnerItem {
                    organization: partner.organization,
                    color: partner.color,
                })
                .collect(),
            sample_count: u32::try_from(summary.sample_count).unwrap_or(u32::MAX),
        })
        .collect()
}

/// Ordered member sample ids of one project; empty for unknown projects.
#[flutter_rust_bridge::frb(sync)]
pub fn samples_of(project_id: String) -> Vec<String> {
    lock_session().samples_of(&project_id).to_vec()
}

/// First project containing the sample, in project creation order.
#[flutter_rust_bridge::frb(sync)]
pub fn first_project_of(sample_id: String) -> Option<String> {
    lock_session().first_project_of(&sample_id).cloned()
}

/// Every project containing the sample, in project creation order.
#[flutter_rust_bridge::frb(sync)]
pub fn all_projects_of(sample_id: String) -> Vec<String> {
    lock_session()
        .all_projects_of(&sample_id)
        .into_iter()
        .cloned()
        .collect()
}

/// Moves the sample into one project, or out of all projects for `None`.
///
/// Returns whether membership changed.
#[flutter_rust_bridge::frb(sync)]
pub fn assign_exclusive(sample_id: String, project_id: Option<String>) -> bool {
    lock_session().assign_exclusive(&sample_id, project_id.as_deref())
}

/// Sets the sample's projects to exactly `project_ids`.
///
/// Returns whether membership changed.
#[flutter_rust_bridge::frb(sync)]
pub fn assign_multiple(sample_id: String, project_ids: Option<Vec<String>>) -> bool {
    lock_session().assign_multiple(&sample_id, project_ids.as_deref())
}

/// Counters over the session's own samples.
#[flutter_rust_bridge::frb(sync)]
pub fn compute_stats_for_session(organization: String, domain: String) -> StatsResponse {
    match parse_testing_domain(&domain) {
        Ok(domain) => {
            StatsResponse::from_snapshot(lock_session().stats(organization.trim(), domain))
        }
        Err(err) => StatsResponse::failure(format!("compute_stats failed: {err}")),
    }
}

/// Counters over a record list supplied by the caller.
///
/// `now_epoch_ms = None` uses the wall clock; it is read once per call.
#[flutter_rust_bridge::frb(sync)]
pub fn compute_stats_for_records(
    records: Vec<StatsRecordInput>,
    organization: String,
    domain: String,
    now_epoch_ms: Option<i64>,
) -> StatsResponse {
    let domain = match parse_testing_domain(&domain) {
        Ok(domain) => domain,
        Err(err) => return StatsResponse::failure(format!("compute_stats failed: {err}")),
    };
    let now = match now_epoch_ms {
        Some(epoch_ms) => match DateTime::<Utc>::from_timestamp_millis(epoch_ms) {
            Some(now) => now,
            None => {
                return StatsResponse::failure(format!(
                    "compute_stats failed: now_epoch_ms out of range: {epoch_ms}"
                ))
            }
        },
        None => Utc::now(),
    };

    let records = records.into_iter().map(to_aged_record).collect::<Vec<_>>();
    StatsResponse::from_snapshot(compute_stats(&records, organization.trim(), domain, now))
}

/// Organizations are trimmed here the same way the selection is, so the
/// core's exact match compares like with like.
fn to_aged_record(input: StatsRecordInput) -> AgedRecord {
    AgedRecord {
        organization: input
            .organization
            .map(|organization| organization.trim().to_string()),
        status: input.status.as_deref().and_then(parse_sample_status),
        age_days: input.age_days,
    }
}

fn lock_session() -> MutexGuard<'static, DashboardSession<SystemClock>> {
    SESSION.lock().unwrap_or_else(|poisoned| {
        warn!("event=session_lock module=ffi status=recovered");
        poisoned.into_inner()
    })
}

fn resolve_id_seed() -> u32 {
    let default_seed = SessionConfig::default().id_seed;
    match std::env::var(ID_SEED_ENV) {
        Ok(raw) => raw.trim().parse::<u32>().unwrap_or(default_seed),
        Err(_) => default_seed,
    }
}
