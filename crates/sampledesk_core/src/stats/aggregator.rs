//! Status counters for the dashboard header.
//!
//! # Responsibility
//! - Roll sample-like records up into the four status counters for one
//!   organization and testing domain.
//!
//! # Invariants
//! - The soil domain always yields zero counters.
//! - "Now" is read once per computation and shared by every record.
//! - A record with missing or unknown fields matches no counter; it never
//!   aborts the computation.

use crate::clock::Clock;
use crate::model::sample::{parse_sample_status, Sample, SampleStatus};
use chrono::{DateTime, Days, NaiveDate, Utc};
use log::debug;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Length of the "completed recently" window, in days.
pub const COMPLETED_WINDOW_DAYS: u32 = 30;

/// Analysis category selecting which aggregation path applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestingDomain {
    FeedForage,
    /// Has no live data source yet.
    Soil,
}

impl TestingDomain {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FeedForage => "feeds",
            Self::Soil => "soil",
        }
    }
}

/// Testing domain parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestingDomainError {
    EmptyDomain,
    UnsupportedDomain(String),
}

impl Display for TestingDomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDomain => write!(f, "testing domain must not be empty"),
            Self::UnsupportedDomain(value) => {
                write!(f, "testing domain is unsupported: {value}")
            }
        }
    }
}

impl Error for TestingDomainError {}

/// Parses a testing domain label as sent by the UI shell.
pub fn parse_testing_domain(value: &str) -> Result<TestingDomain, TestingDomainError> {
    let normalized = value.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return Err(TestingDomainError::EmptyDomain);
    }
    match normalized.as_str() {
        "feeds" | "feed" | "forage" | "feed_forage" => Ok(TestingDomain::FeedForage),
        "soil" => Ok(TestingDomain::Soil),
        _ => Err(TestingDomainError::UnsupportedDomain(normalized)),
    }
}

/// Four-counter rollup shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub pending_arrival: u32,
    pub in_process: u32,
    pub partially_complete: u32,
    pub completed_last_30_days: u32,
}

impl StatsSnapshot {
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Minimal view of a record the aggregator can count.
pub trait StatsRecord {
    /// Owning organization, if known.
    fn organization(&self) -> Option<&str>;
    /// Lifecycle status, if known.
    fn status(&self) -> Option<SampleStatus>;
    /// Calendar day the record is dated to, relative to `today`.
    fn record_date(&self, today: NaiveDate) -> Option<NaiveDate>;
}

/// Loosely populated record dated by its age in days.
///
/// Mirrors the rows the dashboard's mock feed hands over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgedRecord {
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default, deserialize_with = "deserialize_status_label")]
    pub status: Option<SampleStatus>,
    #[serde(default)]
    pub age_days: Option<i64>,
}

impl AgedRecord {
    pub fn new(organization: impl Into<String>, status: SampleStatus, age_days: i64) -> Self {
        Self {
            organization: Some(organization.into()),
            status: Some(status),
            age_days: Some(age_days),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StatusLabel {
    Label(String),
    Other(IgnoredAny),
}

/// Unknown or non-string status labels become `None` instead of failing
/// the whole record list.
fn deserialize_status_label<'de, D>(deserializer: D) -> Result<Option<SampleStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<StatusLabel>::deserialize(deserializer)? {
        Some(StatusLabel::Label(label)) => parse_sample_status(&label),
        Some(StatusLabel::Other(_)) | None => None,
    })
}

impl StatsRecord for AgedRecord {
    fn organization(&self) -> Option<&str> {
        self.organization.as_deref()
    }

    fn status(&self) -> Option<SampleStatus> {
        self.status
    }

    fn record_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        let age = self.age_days?;
        let days = Days::new(age.unsigned_abs());
        if age >= 0 {
            today.checked_sub_days(days)
        } else {
            today.checked_add_days(days)
        }
    }
}

impl StatsRecord for Sample {
    fn organization(&self) -> Option<&str> {
        Some(self.organization.as_str())
    }

    fn status(&self) -> Option<SampleStatus> {
        Some(self.status)
    }

    fn record_date(&self, _today: NaiveDate) -> Option<NaiveDate> {
        Some(self.last_activity_on())
    }
}

/// Computes counters with the default 30-day completion window.
pub fn compute_stats<R: StatsRecord>(
    records: &[R],
    organization: &str,
    domain: TestingDomain,
    now: DateTime<Utc>,
) -> StatsSnapshot {
    compute_stats_with_window(records, organization, domain, now, COMPLETED_WINDOW_DAYS)
}

/// Computes counters reading "now" from `clock` exactly once.
pub fn compute_stats_with_clock<R: StatsRecord>(
    records: &[R],
    organization: &str,
    domain: TestingDomain,
    clock: &impl Clock,
) -> StatsSnapshot {
    compute_stats(records, organization, domain, clock.now())
}

/// Computes counters with a caller-chosen completion window.
///
/// The window is inclusive on both ends: `[today - window_days, today]`,
/// where `today` is the calendar day of `now` in UTC.
pub fn compute_stats_with_window<R: StatsRecord>(
    records: &[R],
    organization: &str,
    domain: TestingDomain,
    now: DateTime<Utc>,
    window_days: u32,
) -> StatsSnapshot {
    if domain == TestingDomain::Soil {
        debug!(
            "event=stats_computed module=stats status=skipped domain={} records={}",
            domain.as_str(),
            records.len()
        );
        return StatsSnapshot::default();
    }

    let today = now.date_naive();
    let window_start = today.checked_sub_days(Days::new(u64::from(window_days)));
    let mut snapshot = StatsSnapshot::default();
    let mut matched = 0_usize;

    for record in records
        .iter()
        .filter(|record| record.organization() == Some(organization))
    {
        matched += 1;
        match record.status() {
            Some(SampleStatus::Pending | SampleStatus::InTransit) => snapshot.pending_arrival += 1,
            Some(SampleStatus::Processing) => snapshot.in_process += 1,
            Some(SampleStatus::Partial) => snapshot.partially_complete += 1,
            Some(SampleStatus::Completed) => {
                let in_window = match (record.record_date(today), window_start) {
                    (Some(date), Some(start)) => date >= start && date <= today,
                    (Some(date), None) => date <= today,
                    (None, _) => false,
                };
                if in_window {
                    snapshot.completed_last_30_days += 1;
                }
            }
            None => {}
        }
    }

    debug!(
        "event=stats_computed module=stats status=ok domain={} records={} matched={}",
        domain.as_str(),
        records.len(),
        matched
    );
    snapshot
}
