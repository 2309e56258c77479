//! Canonical in-memory collections of projects and timeline entries.
//!
//! Every project owns exactly one project-level entry (same id) whose
//! `name/start/end/status` mirror the project. All writes to those mirrored
//! fields, whichever side they come from, go through [`Store::commit_project`]
//! so the two records change together and propagation never re-enters.

use std::collections::HashSet;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Error, Result, ValidationError};
use crate::model::{
    GanttTask, MemberRole, Project, ProjectDraft, ProjectPatch, TaskDraft, TaskPatch, TaskType,
};

/// A pending timeline-entry edit: the merged entry and, for project-level
/// entries, the merged project it flows into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryChange {
    pub task: GanttTask,
    pub project: Option<Project>,
}

/// Single-owner store. Mutating methods validate first and only then touch
/// state, so a failed call leaves the store exactly as it was.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Store {
    projects: Vec<Project>,
    tasks: Vec<GanttTask>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from loaded collections, deriving or re-syncing the
    /// project-level entry of every project.
    pub fn from_parts(projects: Vec<Project>, tasks: Vec<GanttTask>) -> Self {
        let mut store = Self { projects, tasks };
        store.reconcile();
        store
    }

    fn reconcile(&mut self) {
        for project in &self.projects {
            match self.tasks.iter_mut().find(|t| t.id == project.id) {
                Some(entry) => {
                    if entry.sync_from(project) {
                        debug!(project = %project.id, "re-synced project-level entry");
                    }
                }
                None => {
                    debug!(project = %project.id, "derived missing project-level entry");
                    self.tasks.push(GanttTask::for_project(project));
                }
            }
        }
    }

    // ── Queries ─────────────────────────────────────────────────

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn tasks(&self) -> &[GanttTask] {
        &self.tasks
    }

    /// Look up a project by id.
    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn task(&self, id: &str) -> Option<&GanttTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Every entry owned by a project, its project-level row included.
    pub fn tasks_for_project<'a>(&'a self, project_id: &'a str) -> impl Iterator<Item = &'a GanttTask> + 'a {
        self.tasks.iter().filter(move |t| t.project == project_id)
    }

    /// An entry is project-level when its id is also a project id.
    pub fn is_project_level(&self, task_id: &str) -> bool {
        self.project(task_id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty() && self.tasks.is_empty()
    }

    fn project_index(&self, id: &str) -> Result<usize> {
        self.projects
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| Error::project_not_found(id))
    }

    fn task_index(&self, id: &str) -> Result<usize> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::task_not_found(id))
    }

    fn id_in_use(&self, id: &str) -> bool {
        self.project(id).is_some() || self.task(id).is_some()
    }

    // ── Projects ────────────────────────────────────────────────

    /// Create a project under a freshly generated id, together with its
    /// project-level timeline entry.
    pub fn add_project(&mut self, draft: ProjectDraft) -> Result<Project> {
        let project = Project::from_draft(Uuid::new_v4().to_string(), draft)?;
        self.insert_project(project)
    }

    /// Store a project whose id was assigned elsewhere (e.g. echoed back by
    /// the backend).
    pub fn insert_project(&mut self, project: Project) -> Result<Project> {
        project.validate()?;
        if project.id.trim().is_empty() {
            return Err(ValidationError::single("id", "is required").into());
        }
        if self.id_in_use(&project.id) {
            return Err(ValidationError::single("id", format!("'{}' is already in use", project.id)).into());
        }
        self.tasks.push(GanttTask::for_project(&project));
        self.projects.push(project.clone());
        info!(project = %project.id, code = %project.code, "project added");
        Ok(project)
    }

    /// The project as it would look after `patch`, without storing it.
    pub fn preview_project_patch(&self, id: &str, patch: &ProjectPatch) -> Result<Project> {
        let idx = self.project_index(id)?;
        let mut merged = self.projects[idx].clone();
        merged.apply(patch);
        merged.validate()?;
        Ok(merged)
    }

    /// Merge `patch` into a project; mirrored fields flow to its entry in the
    /// same call.
    pub fn update_project(&mut self, id: &str, patch: ProjectPatch) -> Result<()> {
        let merged = self.preview_project_patch(id, &patch)?;
        let idx = self.project_index(id)?;
        self.commit_project(idx, merged, patch.touches_timeline());
        info!(project = %id, "project updated");
        Ok(())
    }

    /// The patch that puts `user_id` on a project's `role` list.
    pub fn member_added(&self, project_id: &str, user_id: &str, role: MemberRole) -> Result<ProjectPatch> {
        let idx = self.project_index(project_id)?;
        if user_id.trim().is_empty() {
            return Err(ValidationError::single("userId", "is required").into());
        }
        Ok(self.projects[idx].add_member_patch(user_id, role))
    }

    /// The patch that takes `user_id` off a project's team.
    pub fn member_removed(&self, project_id: &str, user_id: &str) -> Result<ProjectPatch> {
        let idx = self.project_index(project_id)?;
        Ok(self.projects[idx].remove_member_patch(user_id))
    }

    /// Put a user on a project's team. Already being on the list is a no-op.
    pub fn add_member(&mut self, project_id: &str, user_id: &str, role: MemberRole) -> Result<()> {
        let patch = self.member_added(project_id, user_id, role)?;
        self.update_project(project_id, patch)
    }

    /// Take a user off both of a project's team lists.
    pub fn remove_member(&mut self, project_id: &str, user_id: &str) -> Result<()> {
        let patch = self.member_removed(project_id, user_id)?;
        self.update_project(project_id, patch)
    }

    /// Remove a project and every entry it owns.
    pub fn delete_project(&mut self, id: &str) -> Result<()> {
        let idx = self.project_index(id)?;
        self.projects.remove(idx);

        let removed: HashSet<String> = self
            .tasks
            .iter()
            .filter(|t| t.project == id || t.id == id)
            .map(|t| t.id.clone())
            .collect();
        self.tasks.retain(|t| !removed.contains(&t.id));
        self.strip_dependencies(&removed);
        info!(project = %id, entries = removed.len(), "project deleted");
        Ok(())
    }

    /// The one place a project and its project-level entry change together.
    fn commit_project(&mut self, idx: usize, project: Project, resync_entry: bool) {
        if resync_entry {
            match self.tasks.iter_mut().find(|t| t.id == project.id) {
                Some(entry) => {
                    if entry.sync_from(&project) {
                        debug!(project = %project.id, "project-level entry re-derived");
                    }
                }
                None => self.tasks.push(GanttTask::for_project(&project)),
            }
        }
        self.projects[idx] = project;
    }

    // ── Timeline entries ────────────────────────────────────────

    /// The entry as it would look after `patch`, plus the owning project
    /// when the change flows back into it. Nothing is stored.
    pub fn preview_timeline_entry(&self, task_id: &str, patch: &TaskPatch) -> Result<EntryChange> {
        let idx = self.task_index(task_id)?;
        let mut task = self.tasks[idx].clone();
        task.apply(patch);
        task.validate()?;

        let project = if patch.touches_project() && self.project(task_id).is_some() {
            let project_patch = ProjectPatch {
                name: patch.name.clone(),
                start_date: patch.start,
                end_date: patch.end,
                status: patch.status,
                ..Default::default()
            };
            Some(self.preview_project_patch(task_id, &project_patch)?)
        } else {
            None
        };
        Ok(EntryChange { task, project })
    }

    /// Merge `patch` into a timeline entry. For a project-level entry, edits
    /// to `name/start/end/status` are applied to the project as well.
    pub fn update_timeline_entry(&mut self, task_id: &str, patch: TaskPatch) -> Result<()> {
        let change = self.preview_timeline_entry(task_id, &patch)?;
        self.commit_entry(change)
    }

    fn commit_entry(&mut self, change: EntryChange) -> Result<()> {
        let idx = self.task_index(&change.task.id)?;
        let task_id = change.task.id.clone();
        self.tasks[idx] = change.task;
        match change.project {
            Some(project) => {
                let pidx = self.project_index(&project.id)?;
                // re-confirms the values just written; nothing propagates further
                self.commit_project(pidx, project, true);
                info!(task = %task_id, "project-level entry updated");
            }
            None => info!(task = %task_id, "timeline entry updated"),
        }
        Ok(())
    }

    /// Checks [`Store::insert_task`] would perform, without storing.
    pub fn check_new_task(&self, task: &GanttTask) -> Result<()> {
        if self.project(&task.project).is_none() {
            return Err(Error::project_not_found(&task.project));
        }
        task.validate()?;
        if task.id.trim().is_empty() {
            return Err(ValidationError::single("id", "is required").into());
        }
        if self.id_in_use(&task.id) {
            return Err(ValidationError::single("id", format!("'{}' is already in use", task.id)).into());
        }
        Ok(())
    }

    /// Add a sub-task or milestone to an existing project.
    pub fn add_task(&mut self, draft: TaskDraft) -> Result<GanttTask> {
        self.insert_task(draft.into_task())
    }

    /// Store a fully formed sub-task or milestone.
    pub fn insert_task(&mut self, task: GanttTask) -> Result<GanttTask> {
        self.check_new_task(&task)?;

        // Keep a project's rows together: insert after its last entry.
        let insert_pos = self
            .tasks
            .iter()
            .rposition(|t| t.project == task.project)
            .map(|p| p + 1)
            .unwrap_or(self.tasks.len());
        self.tasks.insert(insert_pos, task.clone());
        info!(task = %task.id, project = %task.project, "timeline entry added");
        Ok(task)
    }

    /// Checks [`Store::delete_task`] would perform, without removing.
    pub fn check_delete_task(&self, id: &str) -> Result<()> {
        self.task_index(id)?;
        if self.is_project_level(id) {
            return Err(ValidationError::single(
                "id",
                "project-level entries are removed with their project",
            )
            .into());
        }
        Ok(())
    }

    /// Remove a sub-task and drop it from other entries' dependency lists.
    pub fn delete_task(&mut self, id: &str) -> Result<()> {
        self.check_delete_task(id)?;
        let idx = self.task_index(id)?;
        self.tasks.remove(idx);
        self.strip_dependencies(&HashSet::from([id.to_string()]));
        info!(task = %id, "timeline entry deleted");
        Ok(())
    }

    /// Add imported sub-tasks. Rows for unknown projects, clashing ids or
    /// invalid dates are skipped. Returns `(imported, skipped)`.
    pub fn import_tasks(&mut self, tasks: Vec<GanttTask>) -> (usize, usize) {
        let mut imported = 0;
        let mut skipped = 0;
        for task in tasks {
            let task = imported_task(task);
            let id = task.id.clone();
            match self.insert_task(task) {
                Ok(_) => imported += 1,
                Err(e) => {
                    warn!(task = %id, error = %e, "skipping imported entry");
                    skipped += 1;
                }
            }
        }
        (imported, skipped)
    }

    fn strip_dependencies(&mut self, removed: &HashSet<String>) {
        if removed.is_empty() {
            return;
        }
        for task in &mut self.tasks {
            task.dependencies.retain(|dep| !removed.contains(dep));
        }
    }
}

/// Shape an imported row into a sub-task: a fresh id when blank, and never
/// project-level (those are derived from projects).
pub fn imported_task(mut task: GanttTask) -> GanttTask {
    if task.kind == TaskType::Project {
        task.kind = TaskType::Task;
    }
    if task.id.trim().is_empty() {
        task.id = Uuid::new_v4().to_string();
    }
    task
}
