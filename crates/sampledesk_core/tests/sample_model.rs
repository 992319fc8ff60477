use chrono::NaiveDate;
use sampledesk_core::{
    format_sample_id, parse_sample_id, Sample, SampleStatus, SampleType, SampleValidationError,
};

fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn sample_ids_match_displayed_format() {
    assert_eq!(format_sample_id(27), "1-000-027");
    assert_eq!(format_sample_id(1023), "1-001-023");
    assert_eq!(parse_sample_id("1-001-023"), Some(1023));
}

#[test]
fn new_sample_starts_pending_without_add_ons() {
    let sample = Sample::new(
        format_sample_id(5),
        SampleType::Silage,
        "Basic Nutrition",
        "Acme Dairy",
        day(2025, 6, 1),
    )
    .unwrap();

    assert_eq!(sample.status, SampleStatus::Pending);
    assert_eq!(sample.completed_on, None);
    assert!(sample.add_ons.is_empty());
    assert_eq!(sample.last_activity_on(), day(2025, 6, 1));
}

#[test]
fn new_rejects_blank_id() {
    let err = Sample::new("  ", SampleType::Feed, "Basic", "Acme", day(2025, 6, 1)).unwrap_err();
    assert_eq!(err, SampleValidationError::BlankId);
}

#[test]
fn validate_rejects_completion_before_submission() {
    let mut sample =
        Sample::new("1-000-001", SampleType::Feed, "Basic", "Acme", day(2025, 6, 10)).unwrap();
    sample.completed_on = Some(day(2025, 6, 9));

    assert_eq!(
        sample.validate().unwrap_err(),
        SampleValidationError::CompletedBeforeSubmitted {
            submitted_on: day(2025, 6, 10),
            completed_on: day(2025, 6, 9),
        }
    );
}

#[test]
fn serialization_uses_snake_case_wire_fields() {
    let mut sample =
        Sample::new("1-000-042", SampleType::Grain, "Mycotoxin", "Acme", day(2025, 5, 2)).unwrap();
    sample.status = SampleStatus::InTransit;
    sample.add_ons = vec!["selenium".to_string()];

    let json = serde_json::to_value(&sample).unwrap();
    assert_eq!(json["id"], "1-000-042");
    assert_eq!(json["sample_type"], "grain");
    assert_eq!(json["status"], "in_transit");
    assert_eq!(json["submitted_on"], "2025-05-02");
    assert_eq!(json["completed_on"], serde_json::Value::Null);
    assert_eq!(json["add_ons"][0], "selenium");

    let decoded: Sample = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, sample);
}

#[test]
fn deserialize_defaults_missing_add_ons() {
    let value = serde_json::json!({
        "id": "1-000-043",
        "sample_type": "water",
        "test_package": "Livestock Water",
        "status": "pending",
        "submitted_on": "2025-05-02",
        "completed_on": null,
        "organization": "Acme"
    });
    let sample: Sample = serde_json::from_value(value).unwrap();
    assert!(sample.add_ons.is_empty());
}

#[test]
fn deserialize_rejects_reversed_dates() {
    let value = serde_json::json!({
        "id": "1-000-044",
        "sample_type": "feed",
        "test_package": "Basic",
        "status": "completed",
        "submitted_on": "2025-05-02",
        "completed_on": "2025-05-01",
        "organization": "Acme"
    });

    let err = serde_json::from_value::<Sample>(value).unwrap_err();
    assert!(
        err.to_string()
            .contains("completed_on (2025-05-01) must be >= submitted_on (2025-05-02)"),
        "unexpected error: {err}"
    );
}
