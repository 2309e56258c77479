use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, Validator};

/// Lifecycle stage shared by projects and their timeline entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Planning,
    Design,
    Development,
    Testing,
    Completed,
    OnHold,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 6] = [
        Self::Planning,
        Self::Design,
        Self::Development,
        Self::Testing,
        Self::Completed,
        Self::OnHold,
    ];

    /// Wire name, as stored by the backend.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Design => "design",
            Self::Development => "development",
            Self::Testing => "testing",
            Self::Completed => "completed",
            Self::OnHold => "onhold",
        }
    }

    /// Human-readable badge label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Planning => "Planning",
            Self::Design => "Design",
            Self::Development => "In development",
            Self::Testing => "Testing",
            Self::Completed => "Completed",
            Self::OnHold => "On hold",
        }
    }

    /// Work is underway: neither finished nor parked.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            Self::Planning | Self::Design | Self::Development | Self::Testing
        )
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-', '_'], "").as_str() {
            "planning" | "planned" => Ok(Self::Planning),
            "design" => Ok(Self::Design),
            "development" | "dev" | "inprogress" => Ok(Self::Development),
            "testing" | "test" | "qa" => Ok(Self::Testing),
            "completed" | "complete" | "done" | "finished" => Ok(Self::Completed),
            "onhold" | "hold" | "paused" => Ok(Self::OnHold),
            other => Err(format!("unknown project status '{other}'")),
        }
    }
}

/// Which team list a project member is kept in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Designer,
    Developer,
}

impl MemberRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Designer => "designer",
            Self::Developer => "developer",
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "designer" | "design" => Ok(Self::Designer),
            "developer" | "dev" => Ok(Self::Developer),
            other => Err(format!("unknown member role '{other}'")),
        }
    }
}

/// A client project. The source of truth for its project-level timeline entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    /// Human-readable code, e.g. `PRJ-2023-001`.
    #[serde(rename = "projectCode")]
    pub code: String,
    pub name: String,
    #[serde(rename = "clientName")]
    pub client: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub designer_ids: Vec<String>,
    #[serde(default)]
    pub developer_ids: Vec<String>,
    #[serde(default)]
    pub created_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Project {
    /// Build a project from a validated draft under the given id.
    pub fn from_draft(id: impl Into<String>, draft: ProjectDraft) -> Result<Self, ValidationError> {
        draft.validate()?;
        // validate() guarantees both dates are present
        let (Some(start_date), Some(end_date)) = (draft.start_date, draft.end_date) else {
            return Err(ValidationError::single("startDate", "is required"));
        };
        Ok(Self {
            id: id.into(),
            code: draft.code,
            name: draft.name,
            client: draft.client,
            start_date,
            end_date,
            status: draft.status,
            designer_ids: draft.designer_ids,
            developer_ids: draft.developer_ids,
            created_by: draft.created_by,
            description: draft.description,
        })
    }

    /// True if the user is on the project as designer or developer.
    pub fn has_member(&self, user_id: &str) -> bool {
        self.designer_ids.iter().any(|id| id == user_id)
            || self.developer_ids.iter().any(|id| id == user_id)
    }

    pub fn members(&self, role: MemberRole) -> &[String] {
        match role {
            MemberRole::Designer => &self.designer_ids,
            MemberRole::Developer => &self.developer_ids,
        }
    }

    /// Patch that puts `user_id` on the `role` list. Empty if already there.
    pub fn add_member_patch(&self, user_id: &str, role: MemberRole) -> ProjectPatch {
        let current = self.members(role);
        if current.iter().any(|id| id == user_id) {
            return ProjectPatch::default();
        }
        let mut ids = current.to_vec();
        ids.push(user_id.to_string());
        match role {
            MemberRole::Designer => ProjectPatch {
                designer_ids: Some(ids),
                ..Default::default()
            },
            MemberRole::Developer => ProjectPatch {
                developer_ids: Some(ids),
                ..Default::default()
            },
        }
    }

    /// Patch that takes `user_id` off both team lists. Empty if not a member.
    pub fn remove_member_patch(&self, user_id: &str) -> ProjectPatch {
        let without = |ids: &[String]| -> Option<Vec<String>> {
            ids.iter()
                .any(|id| id == user_id)
                .then(|| ids.iter().filter(|id| *id != user_id).cloned().collect())
        };
        ProjectPatch {
            designer_ids: without(&self.designer_ids),
            developer_ids: without(&self.developer_ids),
            ..Default::default()
        }
    }

    /// Check the invariants a stored project must satisfy.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Validator::new();
        v.require_text("projectCode", &self.code);
        v.require_text("name", &self.name);
        v.require_text("clientName", &self.client);
        if self.end_date < self.start_date {
            v.push("endDate", "must not be before startDate");
        }
        v.finish()
    }

    /// Apply a patch in place. Returns true if a field mirrored on the
    /// project-level timeline entry was part of the patch.
    pub fn apply(&mut self, patch: &ProjectPatch) -> bool {
        if let Some(code) = &patch.code {
            self.code.clone_from(code);
        }
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(client) = &patch.client {
            self.client.clone_from(client);
        }
        if let Some(start) = patch.start_date {
            self.start_date = start;
        }
        if let Some(end) = patch.end_date {
            self.end_date = end;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(ids) = &patch.designer_ids {
            self.designer_ids.clone_from(ids);
        }
        if let Some(ids) = &patch.developer_ids {
            self.developer_ids.clone_from(ids);
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone()).filter(|d| !d.is_empty());
        }
        patch.touches_timeline()
    }
}

/// Fields for a new project. Dates are optional so that a half-filled form
/// can be validated and reported field by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDraft {
    #[serde(rename = "projectCode")]
    pub code: String,
    pub name: String,
    #[serde(rename = "clientName")]
    pub client: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub designer_ids: Vec<String>,
    #[serde(default)]
    pub developer_ids: Vec<String>,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl ProjectDraft {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        client: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            client: client.into(),
            start_date: Some(start_date),
            end_date: Some(end_date),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Validator::new();
        v.require_text("projectCode", &self.code);
        v.require_text("name", &self.name);
        v.require_text("clientName", &self.client);
        v.require("startDate", self.start_date.as_ref());
        v.require("endDate", self.end_date.as_ref());
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                v.push("endDate", "must not be before startDate");
            }
        }
        v.finish()
    }
}

/// Partial update for a project; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    #[serde(rename = "projectCode")]
    pub code: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "clientName")]
    pub client: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<ProjectStatus>,
    pub designer_ids: Option<Vec<String>>,
    pub developer_ids: Option<Vec<String>>,
    pub description: Option<String>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Does the patch touch a field mirrored on the timeline entry?
    pub fn touches_timeline(&self) -> bool {
        self.name.is_some()
            || self.start_date.is_some()
            || self.end_date.is_some()
            || self.status.is_some()
    }
}
