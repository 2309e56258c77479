use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::project::{Project, ProjectStatus};
use super::timeline::DateRange;
use crate::error::{ValidationError, Validator};

/// What a timeline row represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    /// A sub-item scoped to a project.
    #[default]
    Task,
    /// Zero-duration marker (start == end).
    Milestone,
    /// The row mirroring a whole project.
    Project,
}

impl TaskType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Milestone => "milestone",
            Self::Project => "project",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "task" => Ok(Self::Task),
            "milestone" => Ok(Self::Milestone),
            "project" => Ok(Self::Project),
            other => Err(format!("unknown entry type '{other}'")),
        }
    }
}

/// A single row on the Gantt chart / calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GanttTask {
    pub id: String,
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Percent complete, 0–100.
    #[serde(default)]
    pub progress: u8,
    /// Predecessor ids, in the order they were listed.
    #[serde(default, with = "dependency_list", skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(rename = "type", default)]
    pub kind: TaskType,
    /// Owning project id.
    pub project: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
}

impl GanttTask {
    /// Create a sub-task with sensible defaults.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        project: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            start,
            end,
            progress: 0,
            dependencies: Vec::new(),
            kind: TaskType::Task,
            project: project.into(),
            status: None,
            assignee: None,
        }
    }

    /// Create a milestone on a single day.
    pub fn new_milestone(
        id: impl Into<String>,
        name: impl Into<String>,
        date: NaiveDate,
        project: impl Into<String>,
    ) -> Self {
        Self {
            kind: TaskType::Milestone,
            ..Self::new(id, name, date, date, project)
        }
    }

    /// The project-level row derived from a project.
    pub fn for_project(project: &Project) -> Self {
        Self {
            kind: TaskType::Project,
            status: Some(project.status),
            ..Self::new(
                project.id.clone(),
                project.name.clone(),
                project.start_date,
                project.end_date,
                project.id.clone(),
            )
        }
    }

    /// Copy the mirrored fields from the owning project. Returns true if
    /// anything changed.
    pub fn sync_from(&mut self, project: &Project) -> bool {
        let before = (self.name.clone(), self.start, self.end, self.status);
        self.name.clone_from(&project.name);
        self.start = project.start_date;
        self.end = project.end_date;
        self.status = Some(project.status);
        self.kind = TaskType::Project;
        before != (self.name.clone(), self.start, self.end, self.status)
    }

    pub fn is_milestone(&self) -> bool {
        self.kind == TaskType::Milestone
    }

    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.start,
            end: self.end,
        }
    }

    /// Inclusive containment: both the start and end day are "in" the task.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Standard interval-overlap test against a window.
    pub fn overlaps(&self, window: &DateRange) -> bool {
        self.range().overlaps(window)
    }

    /// Number of calendar days covered, both ends inclusive. Zero for a
    /// reversed range.
    pub fn duration_days(&self) -> i64 {
        ((self.end - self.start).num_days() + 1).max(0)
    }

    pub fn depends_on(&self, id: &str) -> bool {
        self.dependencies.iter().any(|d| d == id)
    }

    /// Comma-joined dependency ids, the format the original data uses.
    pub fn dependencies_text(&self) -> String {
        self.dependencies.join(",")
    }

    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(start) = patch.start {
            self.start = start;
        }
        if let Some(end) = patch.end {
            self.end = end;
        }
        if let Some(progress) = patch.progress {
            self.progress = progress;
        }
        if let Some(deps) = &patch.dependencies {
            self.dependencies.clone_from(deps);
        }
        if let Some(status) = patch.status {
            self.status = Some(status);
        }
        if let Some(assignee) = &patch.assignee {
            self.assignee = Some(assignee.clone()).filter(|a| !a.is_empty());
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Validator::new();
        v.require_text("name", &self.name);
        if self.end < self.start {
            v.push("end", "must not be before start");
        }
        if self.progress > 100 {
            v.push("progress", "must be between 0 and 100");
        }
        if self.is_milestone() && self.start != self.end {
            v.push("end", "a milestone starts and ends on the same day");
        }
        v.finish()
    }
}

/// Split a comma-separated id list, trimming each id and dropping blanks.
pub fn parse_dependency_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Partial update for a timeline entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub progress: Option<u8>,
    #[serde(default, with = "optional_dependency_list")]
    pub dependencies: Option<Vec<String>>,
    pub status: Option<ProjectStatus>,
    pub assignee: Option<String>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Fields that flow back into the owning project when the entry is
    /// project-level.
    pub fn touches_project(&self) -> bool {
        self.name.is_some() || self.start.is_some() || self.end.is_some() || self.status.is_some()
    }
}

/// Fields for a new sub-task or milestone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// Caller-chosen id (e.g. `2.6`); generated when absent.
    pub id: Option<String>,
    pub project: String,
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub progress: u8,
    pub dependencies: Vec<String>,
    pub milestone: bool,
    pub status: Option<ProjectStatus>,
    pub assignee: Option<String>,
}

impl TaskDraft {
    pub fn new(
        project: impl Into<String>,
        name: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            project: project.into(),
            name: name.into(),
            start,
            end,
            progress: 0,
            dependencies: Vec::new(),
            milestone: false,
            status: None,
            assignee: None,
        }
    }

    pub fn into_task(self) -> GanttTask {
        let id = self.id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let mut task = if self.milestone {
            GanttTask::new_milestone(id, self.name, self.start, self.project)
        } else {
            GanttTask::new(id, self.name, self.start, self.end, self.project)
        };
        task.progress = self.progress;
        task.dependencies = self.dependencies;
        task.status = self.status;
        task.assignee = self.assignee;
        task
    }
}

/// Serde helper: dependencies travel as `"a, b"` but live as a list.
mod dependency_list {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    pub(super) enum Raw {
        Text(String),
        List(Vec<String>),
    }

    impl Raw {
        pub(super) fn into_ids(self) -> Vec<String> {
            match self {
                Raw::Text(text) => super::parse_dependency_list(&text),
                Raw::List(ids) => ids
                    .iter()
                    .flat_map(|id| super::parse_dependency_list(id))
                    .collect(),
            }
        }
    }

    pub fn serialize<S>(ids: &[String], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&ids.join(","))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<Raw> = Option::deserialize(deserializer)?;
        Ok(raw.map(Raw::into_ids).unwrap_or_default())
    }
}

mod optional_dependency_list {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::dependency_list::Raw;

    pub fn serialize<S>(ids: &Option<Vec<String>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match ids {
            Some(ids) => serializer.serialize_some(&ids.join(",")),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<Raw> = Option::deserialize(deserializer)?;
        Ok(raw.map(Raw::into_ids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_dependency_text() {
        assert_eq!(parse_dependency_list(" a, missing ,b,, "), ["a", "missing", "b"]);
        assert!(parse_dependency_list("").is_empty());
    }

    #[test]
    fn deserializes_original_entry_shape() {
        let json = r#"{
            "id": "2.5",
            "name": "Release",
            "start": "2023-10-11",
            "end": "2023-10-30",
            "progress": 0,
            "dependencies": "2.3,2.4",
            "type": "task",
            "project": "2",
            "assignee": "QA"
        }"#;
        let task: GanttTask = serde_json::from_str(json).unwrap();
        assert_eq!(task.dependencies, ["2.3", "2.4"]);
        assert_eq!(task.kind, TaskType::Task);
        assert_eq!(task.start, d(2023, 10, 11));
        assert_eq!(task.status, None);
    }

    #[test]
    fn missing_type_and_dependencies_default() {
        let json = r#"{"id":"1","name":"Site","start":"2023-06-01","end":"2023-08-15","project":"1"}"#;
        let task: GanttTask = serde_json::from_str(json).unwrap();
        assert_eq!(task.kind, TaskType::Task);
        assert!(task.dependencies.is_empty());
        assert_eq!(task.progress, 0);
    }

    #[test]
    fn serializes_dependencies_as_text() {
        let mut task = GanttTask::new("b", "B", d(2023, 8, 1), d(2023, 8, 2), "p");
        task.dependencies = vec!["a".into(), "c".into()];
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["dependencies"], "a,c");
        assert_eq!(json["type"], "task");
    }

    #[test]
    fn duration_is_inclusive() {
        let single = GanttTask::new("a", "A", d(2023, 8, 1), d(2023, 8, 1), "p");
        assert_eq!(single.duration_days(), 1);
        let reversed = GanttTask::new("b", "B", d(2023, 8, 3), d(2023, 8, 1), "p");
        assert_eq!(reversed.duration_days(), 0);
        assert!(reversed.validate().is_err());
    }

    #[test]
    fn milestone_draft_collapses_to_one_day() {
        let mut draft = TaskDraft::new("p", "Launch", d(2023, 9, 1), d(2023, 9, 9));
        draft.milestone = true;
        let task = draft.into_task();
        assert!(task.is_milestone());
        assert_eq!(task.start, task.end);
        assert!(!task.id.is_empty());
    }

    #[test]
    fn patch_dependencies_accept_text() {
        let patch: TaskPatch = serde_json::from_str(r#"{"dependencies":"x, y"}"#).unwrap();
        assert_eq!(patch.dependencies, Some(vec!["x".to_string(), "y".to_string()]));
        assert!(!patch.touches_project());
    }
}
