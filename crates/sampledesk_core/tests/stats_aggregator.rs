use chrono::{DateTime, NaiveDate, Utc};
use sampledesk_core::{
    compute_stats, compute_stats_with_clock, compute_stats_with_window, AgedRecord, FixedClock,
    Sample, SampleStatus, SampleType, StatsSnapshot, TestingDomain,
};

fn now() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2025, 6, 30)
        .unwrap()
        .and_hms_opt(14, 30, 0)
        .unwrap()
        .and_utc()
}

fn scenario_records() -> Vec<AgedRecord> {
    vec![
        AgedRecord::new("A", SampleStatus::Pending, 0),
        AgedRecord::new("A", SampleStatus::Completed, 5),
        AgedRecord::new("A", SampleStatus::Completed, 45),
        AgedRecord::new("B", SampleStatus::Processing, 1),
    ]
}

#[test]
fn scenario_counts_only_selected_organization() {
    let stats = compute_stats(&scenario_records(), "A", TestingDomain::FeedForage, now());
    assert_eq!(
        stats,
        StatsSnapshot {
            pending_arrival: 1,
            in_process: 0,
            partially_complete: 0,
            completed_last_30_days: 1,
        }
    );

    let other = compute_stats(&scenario_records(), "B", TestingDomain::FeedForage, now());
    assert_eq!(other.in_process, 1);
    assert_eq!(other.pending_arrival, 0);
}

#[test]
fn soil_domain_is_always_zero() {
    let records = scenario_records();
    for organization in ["A", "B", "unknown"] {
        let stats = compute_stats(&records, organization, TestingDomain::Soil, now());
        assert!(stats.is_zero());
    }
}

#[test]
fn empty_input_and_unknown_organization_yield_zero() {
    let empty: Vec<AgedRecord> = Vec::new();
    assert!(compute_stats(&empty, "A", TestingDomain::FeedForage, now()).is_zero());
    assert!(compute_stats(&scenario_records(), "Z", TestingDomain::FeedForage, now()).is_zero());
    assert!(compute_stats(&scenario_records(), "", TestingDomain::FeedForage, now()).is_zero());
}

#[test]
fn completed_window_is_inclusive_on_both_ends() {
    let records = vec![
        AgedRecord::new("A", SampleStatus::Completed, 0),
        AgedRecord::new("A", SampleStatus::Completed, 30),
        AgedRecord::new("A", SampleStatus::Completed, 31),
        AgedRecord::new("A", SampleStatus::Completed, -1),
    ];
    let stats = compute_stats(&records, "A", TestingDomain::FeedForage, now());
    assert_eq!(stats.completed_last_30_days, 2);
}

#[test]
fn transit_counts_as_pending_arrival() {
    let records = vec![
        AgedRecord::new("A", SampleStatus::Pending, 2),
        AgedRecord::new("A", SampleStatus::InTransit, 1),
        AgedRecord::new("A", SampleStatus::Partial, 3),
    ];
    let stats = compute_stats(&records, "A", TestingDomain::FeedForage, now());
    assert_eq!(stats.pending_arrival, 2);
    assert_eq!(stats.partially_complete, 1);
}

#[test]
fn partially_populated_records_match_nothing() {
    let records = vec![
        AgedRecord {
            organization: Some("A".to_string()),
            status: None,
            age_days: Some(1),
        },
        AgedRecord {
            organization: None,
            status: Some(SampleStatus::Pending),
            age_days: Some(1),
        },
        AgedRecord {
            organization: Some("A".to_string()),
            status: Some(SampleStatus::Completed),
            age_days: None,
        },
        AgedRecord::new("A", SampleStatus::Processing, 4),
    ];
    let stats = compute_stats(&records, "A", TestingDomain::FeedForage, now());
    assert_eq!(
        stats,
        StatsSnapshot {
            pending_arrival: 0,
            in_process: 1,
            partially_complete: 0,
            completed_last_30_days: 0,
        }
    );
}

#[test]
fn counters_partition_the_organization_records() {
    let statuses = [
        SampleStatus::Pending,
        SampleStatus::Processing,
        SampleStatus::Partial,
        SampleStatus::Completed,
    ];
    let mut records = Vec::new();
    for age in 0..90_i64 {
        let status = statuses[(age as usize * 7) % statuses.len()];
        let organization = if age % 5 == 0 { "B" } else { "A" };
        records.push(AgedRecord::new(organization, status, age));
    }

    let stats = compute_stats(&records, "A", TestingDomain::FeedForage, now());
    let org_total = records
        .iter()
        .filter(|record| record.organization.as_deref() == Some("A"))
        .count() as u32;
    let completed_outside = records
        .iter()
        .filter(|record| {
            record.organization.as_deref() == Some("A")
                && record.status == Some(SampleStatus::Completed)
                && record.age_days.is_some_and(|age| age > 30)
        })
        .count() as u32;

    assert_eq!(
        stats.pending_arrival
            + stats.in_process
            + stats.partially_complete
            + completed_outside
            + stats.completed_last_30_days,
        org_total
    );
}

#[test]
fn custom_window_narrows_completed_counter() {
    let records = vec![
        AgedRecord::new("A", SampleStatus::Completed, 3),
        AgedRecord::new("A", SampleStatus::Completed, 10),
    ];
    let stats = compute_stats_with_window(&records, "A", TestingDomain::FeedForage, now(), 7);
    assert_eq!(stats.completed_last_30_days, 1);
}

#[test]
fn samples_are_dated_by_completion_day() {
    let submitted = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
    let mut recent = Sample::new("1-000-001", SampleType::Forage, "Basic", "A", submitted).unwrap();
    recent.status = SampleStatus::Completed;
    recent.completed_on = NaiveDate::from_ymd_opt(2025, 5, 31);

    let mut stale = recent.clone();
    stale.id = "1-000-002".to_string();
    stale.completed_on = NaiveDate::from_ymd_opt(2025, 5, 30);

    let mut undated = recent.clone();
    undated.id = "1-000-003".to_string();
    undated.completed_on = None;

    let clock = FixedClock::new(now());
    let stats = compute_stats_with_clock(
        &[recent, stale, undated],
        "A",
        TestingDomain::FeedForage,
        &clock,
    );
    assert_eq!(stats.completed_last_30_days, 1);
}

#[test]
fn snapshot_serializes_with_dashboard_counter_names() {
    let stats = compute_stats(&scenario_records(), "A", TestingDomain::FeedForage, now());
    let json = serde_json::to_value(stats).unwrap();
    assert_eq!(json["pendingArrival"], 1);
    assert_eq!(json["inProcess"], 0);
    assert_eq!(json["partiallyComplete"], 0);
    assert_eq!(json["completedLast30Days"], 1);
}

#[test]
fn record_feed_with_unknown_status_labels_still_deserializes() {
    let feed = serde_json::json!([
        { "organization": "A", "status": "in-transit", "age_days": 1 },
        { "organization": "A", "status": "archived", "age_days": 2 },
        { "organization": "A", "status": 7, "age_days": 3 },
        { "organization": "A", "status": "completed", "age_days": 4 },
        { "organization": "A" }
    ]);
    let records: Vec<AgedRecord> = serde_json::from_value(feed).unwrap();

    assert_eq!(records.len(), 5);
    assert_eq!(records[0].status, Some(SampleStatus::InTransit));
    assert_eq!(records[1].status, None);
    assert_eq!(records[2].status, None);
    assert_eq!(records[4].status, None);

    let stats = compute_stats(&records, "A", TestingDomain::FeedForage, now());
    assert_eq!(stats.pending_arrival, 1);
    assert_eq!(stats.completed_last_30_days, 1);
    assert_eq!(stats.in_process + stats.partially_complete, 0);
}
