//! Application session: the store, the backend it writes through to, the
//! calendar view state and the status line.

use chrono::NaiveDate;
use tracing::{info, warn};
use uuid::Uuid;

use crate::backend::Backend;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::filter::{filter_tasks_by_text, tasks_in_range};
use crate::model::{
    GanttTask, MemberRole, Project, ProjectDraft, ProjectPatch, TaskDraft, TaskPatch, User, ViewState,
};
use crate::stats::DashboardStats;
use crate::store::{imported_task, Store};
use crate::timeline::{
    display_dates, display_order, header_cells, project_grid, ChartLayout, DisplayDates, GridRow,
    HeaderCell, Padding,
};

/// Outcome of the most recent action, shown to the user as a toast.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Ready,
    Info(String),
    Error(String),
}

impl Status {
    pub fn message(&self) -> &str {
        match self {
            Self::Ready => "Ready",
            Self::Info(msg) | Self::Error(msg) => msg,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// How the calendar page arranges the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimelineLayout {
    /// Resizable entry list beside the day grid.
    #[default]
    SplitPanel,
    /// One scrolling grid.
    Simple,
}

/// Main application state.
///
/// Every mutation is validated against the store first, then written to the
/// backend, and only committed locally once the backend accepted it. A
/// failure at any step leaves the store as it was.
pub struct App {
    pub store: Store,
    backend: Box<dyn Backend>,
    pub view: ViewState,
    pub layout: TimelineLayout,
    pub settings: Settings,
    pub status: Status,
    pub current_user: Option<User>,
}

impl App {
    pub fn new(backend: Box<dyn Backend>, settings: Settings, today: NaiveDate) -> Self {
        Self {
            store: Store::new(),
            backend,
            view: ViewState::new(settings.default_view, today),
            layout: TimelineLayout::default(),
            settings,
            status: Status::Ready,
            current_user: None,
        }
    }

    // ── Loading ─────────────────────────────────────────────────

    /// Fetch projects, entries and the signed-in user. On failure the
    /// previously loaded data stays in place.
    pub fn load(&mut self) -> Result<()> {
        let fetched = self.fetch();
        match fetched {
            Ok((store, user)) => {
                info!(
                    projects = store.projects().len(),
                    entries = store.tasks().len(),
                    "loaded data from backend"
                );
                self.status = Status::Info(format!("Loaded {} projects", store.projects().len()));
                self.store = store;
                self.current_user = user;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "load failed, keeping previous data");
                self.status = Status::Error(format!("Error loading: {e}"));
                Err(e)
            }
        }
    }

    fn fetch(&mut self) -> Result<(Store, Option<User>)> {
        let projects = self.backend.list_projects()?;
        let tasks = self.backend.list_tasks()?;
        let user = self.backend.current_user()?;
        Ok((Store::from_parts(projects, tasks), user))
    }

    // ── Projects ────────────────────────────────────────────────

    pub fn create_project(&mut self, draft: ProjectDraft) -> Result<Project> {
        let outcome = self.write_new_project(draft);
        self.report(outcome, |p| format!("Project '{}' created", p.name))
    }

    fn write_new_project(&mut self, draft: ProjectDraft) -> Result<Project> {
        let project = Project::from_draft(Uuid::new_v4().to_string(), draft)?;
        let stored = self.backend.create_project(&project)?;
        self.store.insert_project(stored)
    }

    pub fn update_project(&mut self, id: &str, patch: ProjectPatch) -> Result<()> {
        let outcome = self.write_project_patch(id, patch);
        self.report(outcome, |_| "Project updated".to_string())
    }

    fn write_project_patch(&mut self, id: &str, patch: ProjectPatch) -> Result<()> {
        let merged = self.store.preview_project_patch(id, &patch)?;
        if patch.is_empty() {
            return Ok(());
        }
        self.backend.update_project(&merged)?;
        self.store.update_project(id, patch)
    }

    pub fn add_member(&mut self, project_id: &str, user_id: &str, role: MemberRole) -> Result<()> {
        let outcome = self
            .store
            .member_added(project_id, user_id, role)
            .and_then(|patch| self.write_project_patch(project_id, patch));
        self.report(outcome, |_| format!("User {user_id} added as {role}"))
    }

    pub fn remove_member(&mut self, project_id: &str, user_id: &str) -> Result<()> {
        let outcome = self
            .store
            .member_removed(project_id, user_id)
            .and_then(|patch| self.write_project_patch(project_id, patch));
        self.report(outcome, |_| format!("User {user_id} removed from the team"))
    }

    /// Everyone who can be put on a project team.
    pub fn users(&mut self) -> Result<Vec<User>> {
        let outcome = self.backend.list_users().map_err(Error::from);
        self.report(outcome, |users| format!("{} users", users.len()))
    }

    pub fn delete_project(&mut self, id: &str) -> Result<()> {
        let outcome = self.write_project_removal(id);
        self.report(outcome, |_| "Project deleted".to_string())
    }

    fn write_project_removal(&mut self, id: &str) -> Result<()> {
        if self.store.project(id).is_none() {
            return Err(Error::project_not_found(id));
        }
        self.backend.delete_project(id)?;
        self.store.delete_project(id)
    }

    // ── Timeline entries ────────────────────────────────────────

    pub fn update_timeline_entry(&mut self, task_id: &str, patch: TaskPatch) -> Result<()> {
        let outcome = self.write_entry_patch(task_id, patch);
        self.report(outcome, |_| "Timeline updated".to_string())
    }

    fn write_entry_patch(&mut self, task_id: &str, patch: TaskPatch) -> Result<()> {
        let change = self.store.preview_timeline_entry(task_id, &patch)?;
        if patch.is_empty() {
            return Ok(());
        }
        self.backend.save_entry(&change.task, change.project.as_ref())?;
        self.store.update_timeline_entry(task_id, patch)
    }

    pub fn add_task(&mut self, draft: TaskDraft) -> Result<GanttTask> {
        let outcome = self.write_new_task(draft.into_task());
        self.report(outcome, |t| format!("Task '{}' added", t.name))
    }

    fn write_new_task(&mut self, task: GanttTask) -> Result<GanttTask> {
        self.store.check_new_task(&task)?;
        self.backend.save_task(&task)?;
        self.store.insert_task(task)
    }

    pub fn delete_task(&mut self, id: &str) -> Result<()> {
        let outcome = self.write_task_removal(id);
        self.report(outcome, |_| "Task deleted".to_string())
    }

    fn write_task_removal(&mut self, id: &str) -> Result<()> {
        self.store.check_delete_task(id)?;
        self.backend.delete_task(id)?;
        self.store.delete_task(id)
    }

    /// Add parsed entries one by one through the write-through path. Rows
    /// the store rejects are skipped; a backend failure stops the import.
    /// Returns `(imported, skipped)`.
    pub fn import_tasks(&mut self, tasks: Vec<GanttTask>) -> Result<(usize, usize)> {
        let outcome = self.write_imported_tasks(tasks);
        self.report(outcome, |(imported, skipped)| {
            if *skipped > 0 {
                format!("Imported {imported} tasks ({skipped} rows skipped)")
            } else {
                format!("Imported {imported} tasks")
            }
        })
    }

    fn write_imported_tasks(&mut self, tasks: Vec<GanttTask>) -> Result<(usize, usize)> {
        let mut imported = 0;
        let mut skipped = 0;
        for task in tasks {
            match self.write_new_task(imported_task(task)) {
                Ok(_) => imported += 1,
                Err(e) if e.is_sync() => return Err(e),
                Err(e) => {
                    warn!(error = %e, "skipping imported entry");
                    skipped += 1;
                }
            }
        }
        Ok((imported, skipped))
    }

    fn report<T>(&mut self, outcome: Result<T>, describe: impl FnOnce(&T) -> String) -> Result<T> {
        match &outcome {
            Ok(value) => self.status = Status::Info(describe(value)),
            Err(e) => {
                if e.is_sync() {
                    warn!(error = %e, "backend write failed, local data unchanged");
                }
                self.status = Status::Error(e.to_string());
            }
        }
        outcome
    }

    // ── Views ───────────────────────────────────────────────────

    pub fn go_to_today(&mut self, today: NaiveDate) {
        self.view.go_to(today);
    }

    /// Padding the current layout puts around the period.
    pub fn padding(&self) -> Padding {
        match self.layout {
            TimelineLayout::SplitPanel => self.settings.split_panel_padding(),
            TimelineLayout::Simple => self.settings.simple_padding(),
        }
    }

    /// Days shown by the timeline for the current view state and layout.
    pub fn display_dates(&self) -> DisplayDates {
        display_dates(self.view.mode, self.view.current_date, self.padding())
    }

    pub fn header(&self, today: NaiveDate) -> Vec<HeaderCell> {
        header_cells(self.view.mode, &self.display_dates(), today)
    }

    /// Grid rows for entries that match the search term and overlap the
    /// displayed days, grouped by project and ordered by start.
    pub fn visible_rows(&self, today: NaiveDate) -> Vec<GridRow<'_>> {
        let dates = self.display_dates();
        let matching = filter_tasks_by_text(self.store.tasks(), self.store.projects(), &self.view.search_term);
        let in_window = tasks_in_range(matching, &dates.window());
        project_grid(display_order(in_window), &dates, today)
    }

    /// Continuous-axis layout fitted around every entry.
    pub fn chart(&self, container_width: f32) -> Option<ChartLayout> {
        ChartLayout::for_tasks(
            self.store.tasks(),
            self.settings.chart_buffer_days,
            container_width,
            self.settings.min_day_width,
        )
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats::from_projects(self.store.projects())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::backend::MemoryBackend;
    use crate::error::SyncError;
    use crate::model::{ProjectStatus, ViewMode};
    use crate::sample;

    /// Memory backend the test can still inspect after handing it to the
    /// session. Optionally refuses plain project updates.
    #[derive(Clone)]
    struct SharedBackend {
        inner: Rc<RefCell<MemoryBackend>>,
        refuse_project_updates: bool,
    }

    impl SharedBackend {
        fn new(refuse_project_updates: bool) -> Self {
            Self {
                inner: Rc::new(RefCell::new(MemoryBackend::new(sample::sample_data()))),
                refuse_project_updates,
            }
        }

        fn task(&self, id: &str) -> GanttTask {
            let inner = self.inner.borrow();
            inner.data().tasks.iter().find(|t| t.id == id).unwrap().clone()
        }

        fn project(&self, id: &str) -> Project {
            let inner = self.inner.borrow();
            inner.data().projects.iter().find(|p| p.id == id).unwrap().clone()
        }
    }

    impl Backend for SharedBackend {
        fn list_projects(&mut self) -> std::result::Result<Vec<Project>, SyncError> {
            self.inner.borrow_mut().list_projects()
        }

        fn list_tasks(&mut self) -> std::result::Result<Vec<GanttTask>, SyncError> {
            self.inner.borrow_mut().list_tasks()
        }

        fn create_project(&mut self, project: &Project) -> std::result::Result<Project, SyncError> {
            self.inner.borrow_mut().create_project(project)
        }

        fn update_project(&mut self, project: &Project) -> std::result::Result<(), SyncError> {
            if self.refuse_project_updates {
                return Err(SyncError::Unavailable("down".into()));
            }
            self.inner.borrow_mut().update_project(project)
        }

        fn delete_project(&mut self, id: &str) -> std::result::Result<(), SyncError> {
            self.inner.borrow_mut().delete_project(id)
        }

        fn save_task(&mut self, task: &GanttTask) -> std::result::Result<(), SyncError> {
            self.inner.borrow_mut().save_task(task)
        }

        fn save_entry(
            &mut self,
            task: &GanttTask,
            project: Option<&Project>,
        ) -> std::result::Result<(), SyncError> {
            self.inner.borrow_mut().save_entry(task, project)
        }

        fn delete_task(&mut self, id: &str) -> std::result::Result<(), SyncError> {
            self.inner.borrow_mut().delete_task(id)
        }

        fn list_users(&mut self) -> std::result::Result<Vec<User>, SyncError> {
            self.inner.borrow_mut().list_users()
        }

        fn current_user(&mut self) -> std::result::Result<Option<User>, SyncError> {
            self.inner.borrow_mut().current_user()
        }
    }

    fn app_over(backend: &SharedBackend) -> App {
        let mut app = App::new(Box::new(backend.clone()), Settings::default(), d(2023, 8, 15));
        app.load().unwrap();
        app
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn loaded_app() -> App {
        let backend = MemoryBackend::new(sample::sample_data());
        let mut app = App::new(Box::new(backend), Settings::default(), d(2023, 8, 15));
        app.load().unwrap();
        app
    }

    #[test]
    fn load_fills_store_and_user() {
        let app = loaded_app();
        assert_eq!(app.store.projects().len(), 5);
        assert_eq!(app.current_user.as_ref().map(|u| u.is_admin()), Some(true));
        assert_eq!(app.status.message(), "Loaded 5 projects");
    }

    #[test]
    fn failed_load_keeps_previous_data() {
        let mut backend = MemoryBackend::new(sample::sample_data());
        backend.set_failing(Some("offline"));
        let mut app = App::new(Box::new(backend), Settings::default(), d(2023, 8, 15));
        app.store = Store::from_parts(sample::sample_data().projects, Vec::new());

        let err = app.load().unwrap_err();
        assert!(err.is_sync());
        assert!(app.status.is_error());
        assert_eq!(app.store.projects().len(), 5);
    }

    #[test]
    fn create_project_derives_entry() {
        let mut app = loaded_app();
        let draft = ProjectDraft::new("PRJ-9", "Portal", "Acme", d(2023, 9, 1), d(2023, 9, 30));
        let project = app.create_project(draft).unwrap();
        let entry = app.store.task(&project.id).unwrap();
        assert_eq!(entry.name, "Portal");
        assert!(!app.status.is_error());
    }

    #[test]
    fn validation_failure_sets_error_status() {
        let mut app = loaded_app();
        let before = app.store.clone();
        let err = app.create_project(ProjectDraft::default()).unwrap_err();
        assert!(err.is_validation());
        assert!(app.status.is_error());
        assert_eq!(app.store, before);
    }

    #[test]
    fn entry_status_flows_to_project() {
        let mut app = loaded_app();
        let patch = TaskPatch {
            status: Some(ProjectStatus::Completed),
            ..Default::default()
        };
        app.update_timeline_entry("2", patch).unwrap();
        assert_eq!(app.store.project("2").unwrap().status, ProjectStatus::Completed);
    }

    #[test]
    fn project_entry_edit_is_one_backend_write() {
        let backend = SharedBackend::new(true);
        let mut app = app_over(&backend);
        let patch = TaskPatch {
            start: Some(d(2023, 7, 1)),
            progress: Some(90),
            ..Default::default()
        };
        app.update_timeline_entry("2", patch).unwrap();

        assert_eq!(app.store.task("2").unwrap().progress, 90);
        assert_eq!(app.store.project("2").unwrap().start_date, d(2023, 7, 1));
        assert_eq!(backend.task("2").progress, 90);
        assert_eq!(backend.task("2").start, d(2023, 7, 1));
        assert_eq!(backend.project("2").start_date, d(2023, 7, 1));
    }

    #[test]
    fn refused_entry_edit_changes_neither_side() {
        let backend = SharedBackend::new(false);
        let mut app = app_over(&backend);
        backend.inner.borrow_mut().set_failing(Some("down"));
        let patch = TaskPatch {
            start: Some(d(2023, 7, 1)),
            progress: Some(90),
            ..Default::default()
        };
        let err = app.update_timeline_entry("2", patch).unwrap_err();
        assert!(err.is_sync());
        assert_eq!(app.store.task("2").unwrap().progress, 65);
        assert_eq!(backend.task("2").progress, 65);
        assert_eq!(backend.project("2").start_date, d(2023, 7, 15));
    }

    #[test]
    fn team_changes_write_through() {
        let backend = SharedBackend::new(false);
        let mut app = app_over(&backend);
        app.add_member("1", "5", MemberRole::Designer).unwrap();
        assert_eq!(app.status.message(), "User 5 added as designer");
        assert_eq!(backend.project("1").designer_ids, ["3", "5"]);

        app.remove_member("1", "4").unwrap();
        assert!(backend.project("1").developer_ids.is_empty());
        assert_eq!(app.store.project("1").unwrap(), &backend.project("1"));

        assert!(app.add_member("ghost", "5", MemberRole::Designer).unwrap_err().is_not_found());
        assert!(app.status.is_error());
    }

    #[test]
    fn refused_team_change_keeps_local_team() {
        let backend = SharedBackend::new(true);
        let mut app = app_over(&backend);
        let err = app.add_member("1", "5", MemberRole::Developer).unwrap_err();
        assert!(err.is_sync());
        assert_eq!(app.store.project("1").unwrap().developer_ids, ["4"]);
    }

    #[test]
    fn lists_users_from_backend() {
        let backend = SharedBackend::new(false);
        let mut app = app_over(&backend);
        let users = app.users().unwrap();
        assert_eq!(users.len(), 5);
        assert_eq!(app.status.message(), "5 users");

        backend.inner.borrow_mut().set_failing(Some("down"));
        assert!(app.users().unwrap_err().is_sync());
    }

    #[test]
    fn layout_picks_padding() {
        let mut app = loaded_app();
        app.settings.simple_padding = 4;
        assert_eq!(app.display_dates().total(), 31 + 2 * 2);
        app.layout = TimelineLayout::Simple;
        assert_eq!(app.padding(), Padding(4));
        assert_eq!(app.display_dates().window().start, d(2023, 7, 28));
        assert_eq!(app.display_dates().total(), 31 + 2 * 4);
    }

    #[test]
    fn visible_rows_follow_search_and_window() {
        let mut app = loaded_app();
        app.view.mode = ViewMode::Week;
        app.view.go_to(d(2023, 8, 23));
        app.view.search_term = "development".into();
        let today = d(2023, 8, 23);
        let ids: Vec<_> = app.visible_rows(today).iter().map(|r| r.task.id.as_str()).collect();
        // "Data Dashboard Development" matches by name, "Mobile App Development"
        // pulls in its rows that overlap the week
        assert_eq!(ids, ["2", "2.2", "2.3", "2.4", "3"]);
    }

    #[test]
    fn import_writes_through_and_counts_rejects() {
        let mut app = loaded_app();
        let text = "Name;Start;End;Project\n\
                    Retrospective;2023-08-16;2023-08-18;1\n\
                    Stray;2023-08-16;2023-08-18;ghost\n";
        let parsed = crate::io::parse_csv(text, None).unwrap();
        assert_eq!(app.import_tasks(parsed.tasks).unwrap(), (1, 1));
        assert_eq!(app.status.message(), "Imported 1 tasks (1 rows skipped)");
        assert!(app.store.tasks().iter().any(|t| t.name == "Retrospective"));
    }

    #[test]
    fn chart_uses_configured_buffer() {
        let app = loaded_app();
        let chart = app.chart(0.0).unwrap();
        assert_eq!(chart.start, d(2023, 5, 27));
        assert_eq!(chart.end, d(2024, 2, 5));
        assert_eq!(chart.day_width, 40.0);
    }
}
