//! The remote side of the session: where projects and timeline entries are
//! persisted and who is signed in.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::SyncError;
use crate::io::file::{load_snapshot, save_snapshot, Snapshot};
use crate::model::{GanttTask, Project, User};

/// Persistence collaborator. Calls are synchronous and never retried.
pub trait Backend {
    fn list_projects(&mut self) -> Result<Vec<Project>, SyncError>;

    fn list_tasks(&mut self) -> Result<Vec<GanttTask>, SyncError>;

    /// Persist a new project. Returns the record as stored.
    fn create_project(&mut self, project: &Project) -> Result<Project, SyncError>;

    /// Replace a stored project; its project-level entry follows.
    fn update_project(&mut self, project: &Project) -> Result<(), SyncError>;

    /// Remove a project and the entries it owns.
    fn delete_project(&mut self, id: &str) -> Result<(), SyncError>;

    /// Insert or replace a timeline entry.
    fn save_task(&mut self, task: &GanttTask) -> Result<(), SyncError>;

    /// Store an edited entry together with its project, when the edit
    /// reached one. Both are applied or neither is.
    fn save_entry(&mut self, task: &GanttTask, project: Option<&Project>) -> Result<(), SyncError>;

    fn delete_task(&mut self, id: &str) -> Result<(), SyncError>;

    fn list_users(&mut self) -> Result<Vec<User>, SyncError>;

    fn current_user(&mut self) -> Result<Option<User>, SyncError>;
}

// Shared by both implementations so their stored state evolves the same way.
impl Snapshot {
    fn signed_in(&self) -> Option<User> {
        let id = self.current_user.as_deref()?;
        self.users.iter().find(|u| u.id == id).cloned()
    }

    fn upsert_project(&mut self, project: &Project) {
        match self.projects.iter_mut().find(|p| p.id == project.id) {
            Some(slot) => *slot = project.clone(),
            None => self.projects.push(project.clone()),
        }
        match self.tasks.iter_mut().find(|t| t.id == project.id) {
            Some(entry) => {
                entry.sync_from(project);
            }
            None => self.tasks.push(GanttTask::for_project(project)),
        }
    }

    fn remove_project(&mut self, id: &str) {
        self.projects.retain(|p| p.id != id);
        self.tasks.retain(|t| t.project != id && t.id != id);
    }

    fn upsert_task(&mut self, task: &GanttTask) {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => *slot = task.clone(),
            None => self.tasks.push(task.clone()),
        }
    }

    fn apply_entry(&mut self, task: &GanttTask, project: Option<&Project>) {
        self.upsert_task(task);
        if let Some(project) = project {
            self.upsert_project(project);
        }
    }

    fn remove_task(&mut self, id: &str) {
        self.tasks.retain(|t| t.id != id);
        for task in &mut self.tasks {
            task.dependencies.retain(|d| d != id);
        }
    }
}

/// In-process backend. Can be switched into a failing mode to exercise
/// error paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    data: Snapshot,
    failing: Option<String>,
}

impl MemoryBackend {
    pub fn new(data: Snapshot) -> Self {
        Self {
            data,
            failing: None,
        }
    }

    /// Make every subsequent call fail with `reason`, or succeed again with `None`.
    pub fn set_failing(&mut self, reason: Option<&str>) {
        self.failing = reason.map(str::to_string);
    }

    pub fn data(&self) -> &Snapshot {
        &self.data
    }

    fn check(&self) -> Result<(), SyncError> {
        match &self.failing {
            Some(reason) => {
                warn!(%reason, "memory backend refusing call");
                Err(SyncError::Unavailable(reason.clone()))
            }
            None => Ok(()),
        }
    }
}

impl Backend for MemoryBackend {
    fn list_projects(&mut self) -> Result<Vec<Project>, SyncError> {
        self.check()?;
        Ok(self.data.projects.clone())
    }

    fn list_tasks(&mut self) -> Result<Vec<GanttTask>, SyncError> {
        self.check()?;
        Ok(self.data.tasks.clone())
    }

    fn create_project(&mut self, project: &Project) -> Result<Project, SyncError> {
        self.check()?;
        self.data.upsert_project(project);
        Ok(project.clone())
    }

    fn update_project(&mut self, project: &Project) -> Result<(), SyncError> {
        self.check()?;
        self.data.upsert_project(project);
        Ok(())
    }

    fn delete_project(&mut self, id: &str) -> Result<(), SyncError> {
        self.check()?;
        self.data.remove_project(id);
        Ok(())
    }

    fn save_task(&mut self, task: &GanttTask) -> Result<(), SyncError> {
        self.check()?;
        self.data.upsert_task(task);
        Ok(())
    }

    fn save_entry(&mut self, task: &GanttTask, project: Option<&Project>) -> Result<(), SyncError> {
        self.check()?;
        self.data.apply_entry(task, project);
        Ok(())
    }

    fn delete_task(&mut self, id: &str) -> Result<(), SyncError> {
        self.check()?;
        self.data.remove_task(id);
        Ok(())
    }

    fn list_users(&mut self) -> Result<Vec<User>, SyncError> {
        self.check()?;
        Ok(self.data.users.clone())
    }

    fn current_user(&mut self) -> Result<Option<User>, SyncError> {
        self.check()?;
        Ok(self.data.signed_in())
    }
}

/// Backend over a JSON snapshot file. Each call reads the file, and each
/// write saves it back. A missing file reads as empty.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `data` to the file if it does not exist yet or holds no projects.
    /// Returns true if the file was seeded.
    pub fn seed_if_empty(&mut self, data: &Snapshot) -> Result<bool, SyncError> {
        if !self.read()?.projects.is_empty() {
            return Ok(false);
        }
        save_snapshot(data, &self.path)?;
        debug!(path = %self.path.display(), "seeded data file");
        Ok(true)
    }

    fn read(&self) -> Result<Snapshot, SyncError> {
        if !self.path.exists() {
            return Ok(Snapshot::default());
        }
        load_snapshot(&self.path)
    }

    fn modify(&mut self, change: impl FnOnce(&mut Snapshot)) -> Result<(), SyncError> {
        let mut data = self.read()?;
        change(&mut data);
        save_snapshot(&data, &self.path)
    }
}

impl Backend for JsonFileBackend {
    fn list_projects(&mut self) -> Result<Vec<Project>, SyncError> {
        Ok(self.read()?.projects)
    }

    fn list_tasks(&mut self) -> Result<Vec<GanttTask>, SyncError> {
        Ok(self.read()?.tasks)
    }

    fn create_project(&mut self, project: &Project) -> Result<Project, SyncError> {
        self.modify(|data| data.upsert_project(project))?;
        Ok(project.clone())
    }

    fn update_project(&mut self, project: &Project) -> Result<(), SyncError> {
        self.modify(|data| data.upsert_project(project))
    }

    fn delete_project(&mut self, id: &str) -> Result<(), SyncError> {
        self.modify(|data| data.remove_project(id))
    }

    fn save_task(&mut self, task: &GanttTask) -> Result<(), SyncError> {
        self.modify(|data| data.upsert_task(task))
    }

    fn save_entry(&mut self, task: &GanttTask, project: Option<&Project>) -> Result<(), SyncError> {
        self.modify(|data| data.apply_entry(task, project))
    }

    fn delete_task(&mut self, id: &str) -> Result<(), SyncError> {
        self.modify(|data| data.remove_task(id))
    }

    fn list_users(&mut self) -> Result<Vec<User>, SyncError> {
        Ok(self.read()?.users)
    }

    fn current_user(&mut self) -> Result<Option<User>, SyncError> {
        Ok(self.read()?.signed_in())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProjectStatus;
    use crate::sample;

    #[test]
    fn memory_backend_fails_on_demand() {
        let mut backend = MemoryBackend::new(sample::sample_data());
        assert_eq!(backend.list_projects().unwrap().len(), 5);

        backend.set_failing(Some("offline"));
        let err = backend.list_tasks().unwrap_err();
        assert!(matches!(err, SyncError::Unavailable(ref r) if r == "offline"));

        backend.set_failing(None);
        assert_eq!(backend.current_user().unwrap().unwrap().name, "Admin Kim");
    }

    #[test]
    fn project_update_follows_to_entry() {
        let mut backend = MemoryBackend::new(sample::sample_data());
        let mut project = backend.list_projects().unwrap()[1].clone();
        project.status = ProjectStatus::Testing;
        backend.update_project(&project).unwrap();
        let entry = backend.data().tasks.iter().find(|t| t.id == "2").unwrap();
        assert_eq!(entry.status, Some(ProjectStatus::Testing));
    }

    #[test]
    fn entry_and_project_saved_together() {
        let mut backend = MemoryBackend::new(sample::sample_data());
        let mut project = backend.list_projects().unwrap()[1].clone();
        project.start_date = chrono::NaiveDate::from_ymd_opt(2023, 7, 1).unwrap();
        let mut entry = GanttTask::for_project(&project);
        entry.progress = 90;
        backend.save_entry(&entry, Some(&project)).unwrap();

        let stored = backend.data().tasks.iter().find(|t| t.id == "2").unwrap();
        assert_eq!(stored.progress, 90);
        assert_eq!(stored.start, project.start_date);
        assert_eq!(backend.data().projects[1].start_date, project.start_date);

        backend.set_failing(Some("down"));
        let before = backend.data().clone();
        entry.progress = 10;
        assert!(backend.save_entry(&entry, Some(&project)).is_err());
        assert_eq!(backend.data(), &before);
    }

    #[test]
    fn lists_users() {
        let mut backend = MemoryBackend::new(sample::sample_data());
        let names: Vec<_> = backend.list_users().unwrap().into_iter().map(|u| u.name).collect();
        assert_eq!(names[0], "Admin Kim");
        assert_eq!(names.len(), 5);
    }

    #[test]
    fn delete_project_cascades() {
        let mut backend = MemoryBackend::new(sample::sample_data());
        backend.delete_project("1").unwrap();
        assert!(backend.data().tasks.iter().all(|t| t.project != "1"));
        assert_eq!(backend.data().projects.len(), 4);
    }

    #[test]
    fn json_file_backend_persists_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projects.json");
        let mut backend = JsonFileBackend::new(&path);
        assert!(backend.list_projects().unwrap().is_empty());
        assert!(backend.current_user().unwrap().is_none());

        assert!(backend.seed_if_empty(&sample::sample_data()).unwrap());
        assert!(!backend.seed_if_empty(&sample::sample_data()).unwrap());

        backend.delete_task("2.3").unwrap();
        let mut reopened = JsonFileBackend::new(&path);
        let tasks = reopened.list_tasks().unwrap();
        assert!(tasks.iter().all(|t| t.id != "2.3"));
        let release = tasks.iter().find(|t| t.id == "2.5").unwrap();
        assert_eq!(release.dependencies, ["2.4"]);
    }

    #[test]
    fn json_file_backend_reports_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projects.json");
        std::fs::write(&path, "[").unwrap();
        let mut backend = JsonFileBackend::new(&path);
        assert!(matches!(backend.list_projects().unwrap_err(), SyncError::Json(_)));
    }
}
