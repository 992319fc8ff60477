//! Sample domain model.
//!
//! # Responsibility
//! - Define the canonical record for one submitted specimen.
//! - Own the display identifier format shared with the UI shell.
//!
//! # Invariants
//! - `id` is stable and never reused for another sample.
//! - `completed_on` must not be earlier than `submitted_on` when set.
//! - Identifier text follows `1-XXX-YYY` for counter-derived ids.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable sample identifier in display form (`1-000-027`).
pub type SampleId = String;

const SAMPLE_ID_PREFIX: &str = "1";

static SAMPLE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^1-(\d{3,})-(\d{3})$").expect("valid sample id regex"));

/// Formats a monotonically increasing intake counter as a sample id.
///
/// The thousands part is zero-padded to at least three digits and never
/// truncated, so counters past 999_999 still produce unique ids.
pub fn format_sample_id(counter: u32) -> SampleId {
    format!(
        "{SAMPLE_ID_PREFIX}-{:03}-{:03}",
        counter / 1000,
        counter % 1000
    )
}

/// Parses a counter-derived sample id back into its counter.
///
/// Returns `None` for ids that were not produced by [`format_sample_id`].
pub fn parse_sample_id(value: &str) -> Option<u32> {
    let captures = SAMPLE_ID_RE.captures(value.trim())?;
    let thousands = captures.get(1)?.as_str().parse::<u32>().ok()?;
    let remainder = captures.get(2)?.as_str().parse::<u32>().ok()?;
    thousands.checked_mul(1000)?.checked_add(remainder)
}

/// Physical specimen category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleType {
    Feed,
    Forage,
    Silage,
    Grain,
    Water,
    Soil,
    Other,
}

/// Parses a sample type label; unknown labels map to `None`.
pub fn parse_sample_type(value: &str) -> Option<SampleType> {
    match value.trim().to_ascii_lowercase().as_str() {
        "feed" => Some(SampleType::Feed),
        "forage" => Some(SampleType::Forage),
        "silage" => Some(SampleType::Silage),
        "grain" => Some(SampleType::Grain),
        "water" => Some(SampleType::Water),
        "soil" => Some(SampleType::Soil),
        "other" => Some(SampleType::Other),
        _ => None,
    }
}

/// Lab lifecycle state of one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleStatus {
    /// Registered, not yet received by the lab.
    Pending,
    /// Shipped by the customer; still counts as pending arrival.
    InTransit,
    /// Received and under analysis.
    Processing,
    /// Some analytes reported, others outstanding.
    Partial,
    /// All requested analytes reported.
    Completed,
}

impl SampleStatus {
    /// Stable wire label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InTransit => "in_transit",
            Self::Processing => "processing",
            Self::Partial => "partial",
            Self::Completed => "completed",
        }
    }

    /// Whether the sample has not reached the lab yet.
    pub fn is_awaiting_arrival(self) -> bool {
        matches!(self, Self::Pending | Self::InTransit)
    }
}

/// Parses a status label as sent by the UI shell.
///
/// Unknown labels map to `None`; callers treat them as "matches no counter".
pub fn parse_sample_status(value: &str) -> Option<SampleStatus> {
    match value.trim().to_ascii_lowercase().as_str() {
        "pending" => Some(SampleStatus::Pending),
        "in_transit" | "in-transit" | "transit" => Some(SampleStatus::InTransit),
        "processing" => Some(SampleStatus::Processing),
        "partial" => Some(SampleStatus::Partial),
        "completed" | "complete" => Some(SampleStatus::Completed),
        _ => None,
    }
}

/// Sample validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleValidationError {
    BlankId,
    CompletedBeforeSubmitted {
        submitted_on: NaiveDate,
        completed_on: NaiveDate,
    },
}

impl Display for SampleValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankId => write!(f, "sample id must not be blank"),
            Self::CompletedBeforeSubmitted {
                submitted_on,
                completed_on,
            } => write!(
                f,
                "completed_on ({completed_on}) must be >= submitted_on ({submitted_on})"
            ),
        }
    }
}

impl Error for SampleValidationError {}

/// Canonical record for one submitted specimen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SampleWire")]
pub struct Sample {
    pub id: SampleId,
    pub sample_type: SampleType,
    /// Requested analysis package label, e.g. `Basic Nutrition`.
    pub test_package: String,
    pub status: SampleStatus,
    pub submitted_on: NaiveDate,
    /// Set once the final report is released.
    pub completed_on: Option<NaiveDate>,
    pub organization: String,
    #[serde(default)]
    pub add_ons: Vec<String>,
}

impl Sample {
    /// Creates a pending sample submitted on `submitted_on`.
    pub fn new(
        id: impl Into<SampleId>,
        sample_type: SampleType,
        test_package: impl Into<String>,
        organization: impl Into<String>,
        submitted_on: NaiveDate,
    ) -> Result<Self, SampleValidationError> {
        let sample = Self {
            id: id.into(),
            sample_type,
            test_package: test_package.into(),
            status: SampleStatus::Pending,
            submitted_on,
            completed_on: None,
            organization: organization.into(),
            add_ons: Vec::new(),
        };
        sample.validate()?;
        Ok(sample)
    }

    /// Checks record-level invariants.
    pub fn validate(&self) -> Result<(), SampleValidationError> {
        if self.id.trim().is_empty() {
            return Err(SampleValidationError::BlankId);
        }
        if let Some(completed_on) = self.completed_on {
            if completed_on < self.submitted_on {
                return Err(SampleValidationError::CompletedBeforeSubmitted {
                    submitted_on: self.submitted_on,
                    completed_on,
                });
            }
        }
        Ok(())
    }

    /// Date the lab last moved this sample forward.
    pub fn last_activity_on(&self) -> NaiveDate {
        self.completed_on.unwrap_or(self.submitted_on)
    }
}

#[derive(Deserialize)]
struct SampleWire {
    id: SampleId,
    sample_type: SampleType,
    test_package: String,
    status: SampleStatus,
    submitted_on: NaiveDate,
    completed_on: Option<NaiveDate>,
    organization: String,
    #[serde(default)]
    add_ons: Vec<String>,
}

impl TryFrom<SampleWire> for Sample {
    type Error = SampleValidationError;

    fn try_from(wire: SampleWire) -> Result<Self, Self::Error> {
        let sample = Self {
            id: wire.id,
            sample_type: wire.sample_type,
            test_package: wire.test_package,
            status: wire.status,
            submitted_on: wire.submitted_on,
            completed_on: wire.completed_on,
            organization: wire.organization,
            add_ons: wire.add_ons,
        };
        sample.validate()?;
        Ok(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        format_sample_id, parse_sample_id, parse_sample_status, parse_sample_type, SampleStatus,
        SampleType,
    };

    #[test]
    fn format_pads_both_groups() {
        assert_eq!(format_sample_id(0), "1-000-000");
        assert_eq!(format_sample_id(27), "1-000-027");
        assert_eq!(format_sample_id(1023), "1-001-023");
        assert_eq!(format_sample_id(999_999), "1-999-999");
    }

    #[test]
    fn format_keeps_large_thousands_group() {
        assert_eq!(format_sample_id(1_000_000), "1-1000-000");
        assert_eq!(parse_sample_id("1-1000-000"), Some(1_000_000));
    }

    #[test]
    fn parse_rejects_foreign_shapes() {
        assert_eq!(parse_sample_id(""), None);
        assert_eq!(parse_sample_id("2-000-001"), None);
        assert_eq!(parse_sample_id("1-00-001"), None);
        assert_eq!(parse_sample_id("1-000-0001"), None);
        assert_eq!(parse_sample_id("S-42"), None);
    }

    #[test]
    fn parse_inverts_format() {
        for counter in [1, 27, 999, 1000, 1023, 54_321] {
            assert_eq!(parse_sample_id(&format_sample_id(counter)), Some(counter));
        }
    }

    #[test]
    fn status_labels_accept_ui_spellings() {
        assert_eq!(
            parse_sample_status(" In-Transit "),
            Some(SampleStatus::InTransit)
        );
        assert_eq!(parse_sample_status("COMPLETED"), Some(SampleStatus::Completed));
        assert_eq!(parse_sample_status("archived"), None);
        assert_eq!(SampleStatus::Partial.as_str(), "partial");
    }

    #[test]
    fn type_labels_are_case_insensitive() {
        assert_eq!(parse_sample_type("Silage"), Some(SampleType::Silage));
        assert_eq!(parse_sample_type(" soil "), Some(SampleType::Soil));
        assert_eq!(parse_sample_type("manure"), None);
    }
}
