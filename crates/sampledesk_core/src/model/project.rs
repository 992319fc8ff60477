//! Project domain model.
//!
//! # Responsibility
//! - Define the named grouping customers use to trend samples over time.
//!
//! # Invariants
//! - `id` is stable and unique across the session.
//! - Sample count is never stored on `Project`; see `ProjectSummary`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable project identifier.
pub type ProjectId = String;

/// Organization a project is shared with, plus its badge color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharingPartner {
    pub organization: String,
    /// CSS-style color token, e.g. `#2563eb`.
    pub color: String,
}

/// Named grouping of samples owned by one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub owner_organization: String,
    pub created_on: NaiveDate,
    pub description: String,
    #[serde(default)]
    pub shared_with: Vec<SharingPartner>,
}

impl Project {
    /// Creates a project with a generated stable id.
    pub fn new(
        name: impl Into<String>,
        owner_organization: impl Into<String>,
        created_on: NaiveDate,
    ) -> Self {
        Self::with_id(
            Uuid::new_v4().to_string(),
            name,
            owner_organization,
            created_on,
        )
    }

    /// Creates a project with a caller-provided id.
    ///
    /// Used when the host already owns project identity.
    pub fn with_id(
        id: impl Into<ProjectId>,
        name: impl Into<String>,
        owner_organization: impl Into<String>,
        created_on: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            owner_organization: owner_organization.into(),
            created_on,
            description: String::new(),
            shared_with: Vec::new(),
        }
    }

    /// Adds or recolors one sharing partner.
    ///
    /// Partners are keyed by organization name; the first share keeps its
    /// position in the list.
    pub fn share_with(&mut self, partner: SharingPartner) {
        match self
            .shared_with
            .iter_mut()
            .find(|existing| existing.organization == partner.organization)
        {
            Some(existing) => existing.color = partner.color,
            None => self.shared_with.push(partner),
        }
    }

    /// Whether `organization` owns or has been granted this project.
    pub fn is_visible_to(&self, organization: &str) -> bool {
        self.owner_organization == organization
            || self
                .shared_with
                .iter()
                .any(|partner| partner.organization == organization)
    }
}

/// Read model pairing a project with its derived member count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    #[serde(flatten)]
    pub project: Project,
    /// Always equals the member count in the current assignment relation.
    pub sample_count: usize,
}

#[cfg(test)]
mod tests {
    use super::{Project, SharingPartner};
    use chrono::NaiveDate;

    fn created_on() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    #[test]
    fn new_generates_distinct_ids() {
        let a = Project::new("Corn silage 2025", "Acme Dairy", created_on());
        let b = Project::new("Corn silage 2025", "Acme Dairy", created_on());
        assert_ne!(a.id, b.id);
        assert!(a.shared_with.is_empty());
    }

    #[test]
    fn share_with_recolors_existing_partner_in_place() {
        let mut project = Project::with_id("p-1", "Haylage", "Acme Dairy", created_on());
        project.share_with(SharingPartner {
            organization: "North Feeds".to_string(),
            color: "#111111".to_string(),
        });
        project.share_with(SharingPartner {
            organization: "Vet Clinic".to_string(),
            color: "#222222".to_string(),
        });
        project.share_with(SharingPartner {
            organization: "North Feeds".to_string(),
            color: "#333333".to_string(),
        });

        assert_eq!(project.shared_with.len(), 2);
        assert_eq!(project.shared_with[0].organization, "North Feeds");
        assert_eq!(project.shared_with[0].color, "#333333");
        assert!(project.is_visible_to("Vet Clinic"));
        assert!(project.is_visible_to("Acme Dairy"));
        assert!(!project.is_visible_to("Someone Else"));
    }
}
