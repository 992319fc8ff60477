//! Dashboard session service.
//!
//! # Responsibility
//! - Hold the host-side state of one dashboard session: samples, projects,
//!   the current assignment relation and the intake counter.
//! - Compose assignment queries and status rollups for the UI shell.
//!
//! # Invariants
//! - Membership changes go through `AssignmentStore::apply` only.
//! - Projects are registered in the relation on creation, so membership
//!   lookups list them in creation order.
//! - Project sample counts are derived from the relation on every read.
//! - Assignments may reference unknown or removed samples; the session
//!   does not cascade sample removal into the relation.

use crate::clock::Clock;
use crate::model::project::{Project, ProjectId, ProjectSummary, SharingPartner};
use crate::model::sample::{
    format_sample_id, parse_sample_id, Sample, SampleId, SampleStatus, SampleType,
    SampleValidationError,
};
use crate::stats::aggregator::{
    compute_stats_with_window, StatsSnapshot, TestingDomain, COMPLETED_WINDOW_DAYS,
};
use crate::store::assignment::{
    AssignmentChange, AssignmentRelation, AssignmentStore, DEFAULT_HISTORY_LIMIT,
};
use chrono::NaiveDate;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Tunables for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Days covered by the "completed recently" counter.
    pub completed_window_days: u32,
    /// First intake counter handed out.
    pub id_seed: u32,
    /// Assignment audit records kept before the oldest are dropped.
    pub history_limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            completed_window_days: COMPLETED_WINDOW_DAYS,
            id_seed: 1,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Intake request for one new sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleIntake {
    pub sample_type: SampleType,
    pub test_package: String,
    pub organization: String,
    pub add_ons: Vec<String>,
    /// Defaults to the session clock's current day.
    pub submitted_on: Option<NaiveDate>,
}

/// Creation request for one project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectDraft {
    /// Host-supplied id; generated when absent.
    pub id: Option<ProjectId>,
    pub name: String,
    pub owner_organization: String,
    pub description: String,
    pub shared_with: Vec<SharingPartner>,
}

/// Errors from session operations.
#[derive(Debug)]
pub enum SessionError {
    /// Display name is blank after trim.
    InvalidDisplayName,
    /// Organization is blank after trim.
    InvalidOrganization,
    /// Target project does not exist.
    ProjectNotFound(ProjectId),
    /// A project with this id already exists.
    DuplicateProject(ProjectId),
    /// Target sample does not exist.
    SampleNotFound(SampleId),
    /// Intake counter cannot produce another id.
    IdSpaceExhausted,
    /// Sample record failed validation.
    Validation(SampleValidationError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDisplayName => write!(f, "display name must not be blank"),
            Self::InvalidOrganization => write!(f, "organization must not be blank"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::DuplicateProject(id) => write!(f, "project already exists: {id}"),
            Self::SampleNotFound(id) => write!(f, "sample not found: {id}"),
            Self::IdSpaceExhausted => write!(f, "sample id counter exhausted"),
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SampleValidationError> for SessionError {
    fn from(value: SampleValidationError) -> Self {
        Self::Validation(value)
    }
}

/// In-memory state of one dashboard session.
pub struct DashboardSession<C: Clock> {
    clock: C,
    config: SessionConfig,
    next_counter: u32,
    samples: Vec<Sample>,
    projects: Vec<Project>,
    assignments: AssignmentStore,
}

impl<C: Clock> DashboardSession<C> {
    /// Creates an empty session with default configuration.
    pub fn new(clock: C) -> Self {
        Self::with_config(clock, SessionConfig::default())
    }

    pub fn with_config(clock: C, config: SessionConfig) -> Self {
        Self {
            clock,
            config,
            next_counter: config.id_seed,
            samples: Vec::new(),
            projects: Vec::new(),
            assignments: AssignmentStore::new().with_history_limit(config.history_limit),
        }
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    /// Loads existing samples, e.g. from the host's mock feed.
    ///
    /// The intake counter moves past the highest counter-derived id seen so
    /// new intakes never collide with loaded ones. The batch is all or
    /// nothing: one invalid sample leaves the session untouched.
    pub fn load_samples(
        &mut self,
        samples: impl IntoIterator<Item = Sample>,
    ) -> Result<usize, SessionError> {
        let batch: Vec<Sample> = samples.into_iter().collect();
        let mut next_counter = self.next_counter;
        for sample in &batch {
            sample.validate()?;
            if let Some(counter) = parse_sample_id(&sample.id) {
                let after = counter
                    .checked_add(1)
                    .ok_or(SessionError::IdSpaceExhausted)?;
                next_counter = next_counter.max(after);
            }
        }

        let loaded = batch.len();
        for sample in batch {
            match self.samples.iter_mut().find(|known| known.id == sample.id) {
                Some(known) => *known = sample,
                None => self.samples.push(sample),
            }
        }
        self.next_counter = next_counter;
        Ok(loaded)
    }

    /// Replaces the assignment store with a host-provided relation.
    ///
    /// The relation's own project order becomes the tie-break order.
    pub fn load_assignments(&mut self, relation: AssignmentRelation) {
        self.assignments =
            AssignmentStore::with_relation(relation).with_history_limit(self.config.history_limit);
    }

    /// Registers one new pending sample and returns its formatted id.
    pub fn intake_sample(&mut self, intake: SampleIntake) -> Result<SampleId, SessionError> {
        let organization = normalize_organization(intake.organization)?;
        let counter = self.next_counter;
        let following = counter
            .checked_add(1)
            .ok_or(SessionError::IdSpaceExhausted)?;

        let submitted_on = intake
            .submitted_on
            .unwrap_or_else(|| self.clock.now().date_naive());
        let mut sample = Sample::new(
            format_sample_id(counter),
            intake.sample_type,
            intake.test_package.trim(),
            organization,
            submitted_on,
        )?;
        sample.add_ons = intake.add_ons;

        let sample_id = sample.id.clone();
        self.samples.push(sample);
        self.next_counter = following;
        info!(
            "event=sample_intake module=service status=ok sample_id={}",
            sample_id
        );
        Ok(sample_id)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn sample(&self, sample_id: &str) -> Option<&Sample> {
        self.samples.iter().find(|sample| sample.id == sample_id)
    }

    /// Moves one sample to another lifecycle status.
    ///
    /// Completing a sample without an explicit date stamps the clock's day.
    /// Leaving `completed` clears the completion date.
    pub fn update_status(
        &mut self,
        sample_id: &str,
        status: SampleStatus,
        completed_on: Option<NaiveDate>,
    ) -> Result<(), SessionError> {
        let today = self.clock.now().date_naive();
        let sample = self
            .samples
            .iter_mut()
            .find(|sample| sample.id == sample_id)
            .ok_or_else(|| SessionError::SampleNotFound(sample_id.to_string()))?;

        let mut next = sample.clone();
        next.status = status;
        next.completed_on = match status {
            SampleStatus::Completed => Some(completed_on.unwrap_or(today)),
            _ => None,
        };
        next.validate()?;
        *sample = next;
        info!(
            "event=sample_status module=service status=ok sample_id={} sample_status={}",
            sample_id,
            status.as_str()
        );
        Ok(())
    }

    /// Removes one sample from the collection.
    ///
    /// Assignments that reference it are left in place.
    pub fn remove_sample(&mut self, sample_id: &str) -> Result<Sample, SessionError> {
        let index = self
            .samples
            .iter()
            .position(|sample| sample.id == sample_id)
            .ok_or_else(|| SessionError::SampleNotFound(sample_id.to_string()))?;
        Ok(self.samples.remove(index))
    }

    /// Creates one project and returns its id.
    pub fn create_project(&mut self, draft: ProjectDraft) -> Result<ProjectId, SessionError> {
        let name = normalize_display_name(draft.name)?;
        let owner = normalize_organization(draft.owner_organization)?;
        let created_on = self.clock.now().date_naive();

        let mut project = match draft.id {
            Some(id) => {
                if self.project(&id).is_some() {
                    return Err(SessionError::DuplicateProject(id));
                }
                Project::with_id(id, name, owner, created_on)
            }
            None => Project::new(name, owner, created_on),
        };
        project.description = draft.description.trim().to_string();
        for partner in draft.shared_with {
            project.share_with(normalize_partner(partner)?);
        }

        let project_id = project.id.clone();
        self.projects.push(project);
        self.assignments.apply(AssignmentChange::RegisterProject {
            project_id: project_id.clone(),
        });
        info!(
            "event=project_created module=service status=ok project_id={}",
            project_id
        );
        Ok(project_id)
    }

    pub fn rename_project(
        &mut self,
        project_id: &str,
        name: impl Into<String>,
    ) -> Result<(), SessionError> {
        let name = normalize_display_name(name.into())?;
        self.project_mut(project_id)?.name = name;
        Ok(())
    }

    pub fn share_project(
        &mut self,
        project_id: &str,
        partner: SharingPartner,
    ) -> Result<(), SessionError> {
        let partner = normalize_partner(partner)?;
        self.project_mut(project_id)?.share_with(partner);
        Ok(())
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn project(&self, project_id: &str) -> Option<&Project> {
        self.projects
            .iter()
            .find(|project| project.id == project_id)
    }

    /// Projects in creation order with sample counts derived from the relation.
    pub fn project_summaries(&self) -> Vec<ProjectSummary> {
        let relation = self.assignments.current();
        self.projects
            .iter()
            .map(|project| ProjectSummary {
                project: project.clone(),
                sample_count: relation.samples_of(&project.id).len(),
            })
            .collect()
    }

    /// Projects visible to one organization, owned or shared.
    pub fn project_summaries_for(&self, organization: &str) -> Vec<ProjectSummary> {
        self.project_summaries()
            .into_iter()
            .filter(|summary| summary.project.is_visible_to(organization))
            .collect()
    }

    /// Puts the sample in `project_id` only, or nowhere for `None`.
    ///
    /// Returns whether the relation changed.
    pub fn assign_exclusive(&mut self, sample_id: &str, project_id: Option<&str>) -> bool {
        self.assignments.apply(AssignmentChange::Exclusive {
            sample_id: sample_id.to_string(),
            project_id: project_id.map(str::to_string),
        })
    }

    /// Puts the sample in exactly the listed projects.
    ///
    /// Returns whether the relation changed.
    pub fn assign_multiple(&mut self, sample_id: &str, project_ids: Option<&[ProjectId]>) -> bool {
        self.assignments.apply(AssignmentChange::Multiple {
            sample_id: sample_id.to_string(),
            project_ids: project_ids.map(<[ProjectId]>::to_vec),
        })
    }

    pub fn samples_of(&self, project_id: &str) -> &[SampleId] {
        self.assignments.current().samples_of(project_id)
    }

    pub fn first_project_of(&self, sample_id: &str) -> Option<&ProjectId> {
        self.assignments.current().first_project_of(sample_id)
    }

    pub fn all_projects_of(&self, sample_id: &str) -> Vec<&ProjectId> {
        self.assignments.current().all_projects_of(sample_id)
    }

    pub fn assignments(&self) -> &AssignmentStore {
        &self.assignments
    }

    /// Dashboard counters for one organization and domain over session samples.
    pub fn stats(&self, organization: &str, domain: TestingDomain) -> StatsSnapshot {
        compute_stats_with_window(
            &self.samples,
            organization,
            domain,
            self.clock.now(),
            self.config.completed_window_days,
        )
    }

    fn project_mut(&mut self, project_id: &str) -> Result<&mut Project, SessionError> {
        self.projects
            .iter_mut()
            .find(|project| project.id == project_id)
            .ok_or_else(|| SessionError::ProjectNotFound(project_id.to_string()))
    }
}

fn normalize_display_name(value: String) -> Result<String, SessionError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SessionError::InvalidDisplayName);
    }
    Ok(trimmed.to_string())
}

fn normalize_organization(value: String) -> Result<String, SessionError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SessionError::InvalidOrganization);
    }
    Ok(trimmed.to_string())
}

fn normalize_partner(partner: SharingPartner) -> Result<SharingPartner, SessionError> {
    Ok(SharingPartner {
        organization: normalize_organization(partner.organization)?,
        color: partner.color,
    })
}
