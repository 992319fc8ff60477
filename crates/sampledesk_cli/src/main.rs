//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `sampledesk_core` linkage outside the Flutter/FFI runtime.
//! - Print a deterministic demo rollup pinned to a fixed clock.

use sampledesk_core::{
    AgedRecord, DashboardSession, FixedClock, ProjectDraft, SampleIntake, SampleStatus,
    SampleType, TestingDomain,
};
use std::process::ExitCode;

const DEMO_ORGANIZATION: &str = "Demo Dairy";

fn main() -> ExitCode {
    println!("sampledesk_core ping={}", sampledesk_core::ping());
    println!("sampledesk_core version={}", sampledesk_core::core_version());

    match run_demo() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("demo failed: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run_demo() -> Result<(), String> {
    let clock = FixedClock::from_ymd(2025, 6, 30).ok_or("invalid demo anchor date")?;

    let records = [
        AgedRecord::new(DEMO_ORGANIZATION, SampleStatus::Pending, 0),
        AgedRecord::new(DEMO_ORGANIZATION, SampleStatus::Completed, 5),
        AgedRecord::new(DEMO_ORGANIZATION, SampleStatus::Completed, 45),
        AgedRecord::new("Other Farm", SampleStatus::Processing, 1),
    ];
    let stats = sampledesk_core::compute_stats_with_clock(
        &records,
        DEMO_ORGANIZATION,
        TestingDomain::FeedForage,
        &clock,
    );
    println!(
        "records pending_arrival={} in_process={} partially_complete={} completed_last_30_days={}",
        stats.pending_arrival,
        stats.in_process,
        stats.partially_complete,
        stats.completed_last_30_days
    );

    let mut session = DashboardSession::new(clock);
    let project_id = session
        .create_project(ProjectDraft {
            name: "Corn Silage 2025".to_string(),
            owner_organization: DEMO_ORGANIZATION.to_string(),
            ..ProjectDraft::default()
        })
        .map_err(|err| err.to_string())?;
    for _ in 0..3 {
        let sample_id = session
            .intake_sample(SampleIntake {
                sample_type: SampleType::Silage,
                test_package: "Basic Nutrition".to_string(),
                organization: DEMO_ORGANIZATION.to_string(),
                add_ons: Vec::new(),
                submitted_on: None,
            })
            .map_err(|err| err.to_string())?;
        session.assign_exclusive(&sample_id, Some(project_id.as_str()));
    }

    for summary in session.project_summaries() {
        println!(
            "project name={} samples={} members={}",
            summary.project.name,
            summary.sample_count,
            session.samples_of(&summary.project.id).join(",")
        );
    }
    Ok(())
}
