//! Project/sample assignment relation and its owning store.
//!
//! # Responsibility
//! - Answer "which samples does project P contain" and "which projects
//!   contain sample S".
//! - Compute the next relation for exclusive and multi-project assignment.
//!
//! # Invariants
//! - A sample id appears at most once in one project's member list.
//! - Project iteration order is insertion order; it is the tie-break for
//!   `first_project_of`.
//! - Referenced sample ids are not checked against any sample collection.
//! - Relation operations never fail and never mutate `self`.
//! - Store history keeps at most `history_limit` records, oldest dropped first.

use crate::model::project::ProjectId;
use crate::model::sample::SampleId;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Audit records an `AssignmentStore` keeps unless configured otherwise.
pub const DEFAULT_HISTORY_LIMIT: usize = 256;

/// Ordered member list of one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMembers {
    pub project_id: ProjectId,
    pub sample_ids: Vec<SampleId>,
}

/// Immutable many-to-many mapping between projects and samples.
///
/// Backed by an insertion-ordered association list so lookups that scan
/// projects resolve ties deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRelation {
    entries: Vec<ProjectMembers>,
}

impl AssignmentRelation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a relation from host-provided `(project, members)` pairs.
    ///
    /// Repeated project ids are merged into the first occurrence and
    /// repeated members are dropped, so the result satisfies the
    /// no-duplicate rule whatever the input looks like.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (ProjectId, S)>,
        S: IntoIterator<Item = SampleId>,
    {
        let mut relation = Self::new();
        for (project_id, sample_ids) in entries {
            let index = relation.entry_index_or_insert(&project_id);
            let members = &mut relation.entries[index].sample_ids;
            for sample_id in sample_ids {
                if !members.contains(&sample_id) {
                    members.push(sample_id);
                }
            }
        }
        relation
    }

    /// Returns the ordered members of one project.
    ///
    /// Unknown projects have no members.
    pub fn samples_of(&self, project_id: &str) -> &[SampleId] {
        self.entries
            .iter()
            .find(|entry| entry.project_id == project_id)
            .map(|entry| entry.sample_ids.as_slice())
            .unwrap_or(&[])
    }

    /// Returns the first project, in insertion order, that contains the sample.
    pub fn first_project_of(&self, sample_id: &str) -> Option<&ProjectId> {
        self.entries
            .iter()
            .find(|entry| entry.sample_ids.iter().any(|id| id == sample_id))
            .map(|entry| &entry.project_id)
    }

    /// Returns every project containing the sample, in insertion order.
    pub fn all_projects_of(&self, sample_id: &str) -> Vec<&ProjectId> {
        self.entries
            .iter()
            .filter(|entry| entry.sample_ids.iter().any(|id| id == sample_id))
            .map(|entry| &entry.project_id)
            .collect()
    }

    /// Whether `project_id` currently lists `sample_id`.
    pub fn contains(&self, project_id: &str, sample_id: &str) -> bool {
        self.samples_of(project_id).iter().any(|id| id == sample_id)
    }

    /// Project ids with a recorded entry, in insertion order.
    ///
    /// Projects whose members were all removed keep their entry.
    pub fn project_ids(&self) -> impl Iterator<Item = &ProjectId> {
        self.entries.iter().map(|entry| &entry.project_id)
    }

    /// Whether no project lists any sample.
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|entry| entry.sample_ids.is_empty())
    }

    /// Returns a relation that tracks `project_id`, appended if unseen.
    ///
    /// Registering projects up front pins the tie-break order to creation
    /// order instead of first-assignment order.
    pub fn with_project(&self, project_id: &str) -> Self {
        let mut next = self.clone();
        next.entry_index_or_insert(project_id);
        next
    }

    /// Returns a relation where the sample belongs to `project_id` only.
    ///
    /// `None` removes the sample from every project. The sample is appended
    /// after existing members; an unseen project gets a new trailing entry.
    pub fn assign_exclusive(&self, sample_id: &str, project_id: Option<&str>) -> Self {
        let mut next = self.without_sample(sample_id);
        if let Some(project_id) = project_id {
            next.push_member(project_id, sample_id);
        }
        next
    }

    /// Returns a relation where the sample belongs to exactly `project_ids`.
    ///
    /// Projects are joined in the given order; repeats are skipped. `None`
    /// and an empty slice both unassign the sample everywhere.
    pub fn assign_multiple(&self, sample_id: &str, project_ids: Option<&[ProjectId]>) -> Self {
        let mut next = self.without_sample(sample_id);
        for project_id in project_ids.unwrap_or_default() {
            next.push_member(project_id, sample_id);
        }
        next
    }

    fn without_sample(&self, sample_id: &str) -> Self {
        let entries = self
            .entries
            .iter()
            .map(|entry| ProjectMembers {
                project_id: entry.project_id.clone(),
                sample_ids: entry
                    .sample_ids
                    .iter()
                    .filter(|id| id.as_str() != sample_id)
                    .cloned()
                    .collect(),
            })
            .collect();
        Self { entries }
    }

    fn push_member(&mut self, project_id: &str, sample_id: &str) {
        let index = self.entry_index_or_insert(project_id);
        let members = &mut self.entries[index].sample_ids;
        if !members.iter().any(|id| id == sample_id) {
            members.push(sample_id.to_string());
        }
    }

    fn entry_index_or_insert(&mut self, project_id: &str) -> usize {
        if let Some(index) = self
            .entries
            .iter()
            .position(|entry| entry.project_id == project_id)
        {
            return index;
        }
        self.entries.push(ProjectMembers {
            project_id: project_id.to_string(),
            sample_ids: Vec::new(),
        });
        self.entries.len() - 1
    }
}

/// One requested membership change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AssignmentChange {
    /// Start tracking a project with no members.
    RegisterProject { project_id: ProjectId },
    /// Sample ends up in at most one project.
    Exclusive {
        sample_id: SampleId,
        project_id: Option<ProjectId>,
    },
    /// Sample ends up in exactly the listed projects.
    Multiple {
        sample_id: SampleId,
        project_ids: Option<Vec<ProjectId>>,
    },
}

impl AssignmentChange {
    /// Sample affected by this change, if any.
    pub fn sample_id(&self) -> Option<&str> {
        match self {
            Self::RegisterProject { .. } => None,
            Self::Exclusive { sample_id, .. } | Self::Multiple { sample_id, .. } => {
                Some(sample_id.as_str())
            }
        }
    }

    /// Computes the relation that results from applying this change.
    pub fn apply_to(&self, relation: &AssignmentRelation) -> AssignmentRelation {
        match self {
            Self::RegisterProject { project_id } => relation.with_project(project_id),
            Self::Exclusive {
                sample_id,
                project_id,
            } => relation.assign_exclusive(sample_id, project_id.as_deref()),
            Self::Multiple {
                sample_id,
                project_ids,
            } => relation.assign_multiple(sample_id, project_ids.as_deref()),
        }
    }

    fn mode(&self) -> &'static str {
        match self {
            Self::RegisterProject { .. } => "register_project",
            Self::Exclusive { .. } => "exclusive",
            Self::Multiple { .. } => "multiple",
        }
    }
}

/// Audit entry for one applied change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentRecord {
    /// Store revision after the change.
    pub revision: u64,
    pub change: AssignmentChange,
    /// Whether the relation value differed after the change.
    pub changed: bool,
}

/// Owner of the current relation with a single mutation entry point.
#[derive(Debug, Clone)]
pub struct AssignmentStore {
    current: AssignmentRelation,
    revision: u64,
    history: VecDeque<AssignmentRecord>,
    history_limit: usize,
}

impl Default for AssignmentStore {
    fn default() -> Self {
        Self::with_relation(AssignmentRelation::default())
    }
}

impl AssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with an existing relation at revision 0.
    pub fn with_relation(relation: AssignmentRelation) -> Self {
        Self {
            current: relation,
            revision: 0,
            history: VecDeque::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Caps the audit history; `0` disables it.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self.trim_history();
        self
    }

    /// Current relation snapshot.
    pub fn current(&self) -> &AssignmentRelation {
        &self.current
    }

    /// Number of changes that actually altered the relation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Most recent changes applied through this store, oldest first.
    pub fn history(&self) -> &VecDeque<AssignmentRecord> {
        &self.history
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    /// Applies one change and swaps in the resulting relation.
    ///
    /// Returns `true` when the relation value changed. No-op changes are
    /// still recorded in history but leave `revision` untouched.
    pub fn apply(&mut self, change: AssignmentChange) -> bool {
        let next = change.apply_to(&self.current);
        let changed = next != self.current;
        if changed {
            self.current = next;
            self.revision += 1;
            info!(
                "event=assignment_applied module=store status=ok mode={} sample_id={} revision={}",
                change.mode(),
                change.sample_id().unwrap_or("-"),
                self.revision
            );
        } else {
            debug!(
                "event=assignment_applied module=store status=noop mode={} sample_id={} revision={}",
                change.mode(),
                change.sample_id().unwrap_or("-"),
                self.revision
            );
        }
        self.history.push_back(AssignmentRecord {
            revision: self.revision,
            change,
            changed,
        });
        self.trim_history();
        changed
    }

    fn trim_history(&mut self) {
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }
    }
}
