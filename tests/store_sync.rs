use chrono::NaiveDate;

use pms_timeline::backend::{Backend, JsonFileBackend, MemoryBackend};
use pms_timeline::config::Settings;
use pms_timeline::model::{ProjectDraft, ProjectPatch, ProjectStatus, TaskDraft, TaskPatch};
use pms_timeline::sample::sample_data;
use pms_timeline::{App, Store};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn draft() -> ProjectDraft {
    ProjectDraft {
        description: Some("Intranet rebuild".into()),
        designer_ids: vec!["3".into()],
        ..ProjectDraft::new("PRJ-2024-001", "Intranet", "Northwind", d(2024, 2, 1), d(2024, 4, 30))
    }
}

#[test]
fn add_then_get_round_trips() {
    let mut store = Store::new();
    let created = store.add_project(draft()).unwrap();
    let fetched = store.project(&created.id).unwrap();
    assert_eq!(fetched, &created);
    assert_eq!(fetched.code, "PRJ-2024-001");
    assert_eq!(fetched.client, "Northwind");
    assert_eq!(fetched.start_date, d(2024, 2, 1));
    assert_eq!(fetched.description.as_deref(), Some("Intranet rebuild"));
}

#[test]
fn empty_patch_changes_nothing() {
    let data = sample_data();
    let mut store = Store::from_parts(data.projects, data.tasks);
    let before = store.clone();
    store.update_project("2", ProjectPatch::default()).unwrap();
    assert_eq!(store, before);
}

#[test]
fn delete_project_leaves_no_entries() {
    let data = sample_data();
    let mut store = Store::from_parts(data.projects, data.tasks);
    store.delete_project("2").unwrap();
    assert!(store.tasks().iter().all(|t| t.project != "2"));
    assert!(store.project("2").is_none());
}

#[test]
fn completing_the_entry_completes_the_project() {
    let data = sample_data();
    let mut store = Store::from_parts(data.projects, data.tasks);
    let patch = TaskPatch {
        status: Some(ProjectStatus::Completed),
        ..Default::default()
    };
    store.update_timeline_entry("2", patch).unwrap();
    assert_eq!(store.project("2").unwrap().status, ProjectStatus::Completed);
    assert_eq!(store.task("2").unwrap().status, Some(ProjectStatus::Completed));
}

#[test]
fn project_dates_flow_to_entry_and_back() {
    let data = sample_data();
    let mut store = Store::from_parts(data.projects, data.tasks);

    let patch = ProjectPatch {
        end_date: Some(d(2023, 11, 15)),
        ..Default::default()
    };
    store.update_project("2", patch).unwrap();
    assert_eq!(store.task("2").unwrap().end, d(2023, 11, 15));

    let patch = TaskPatch {
        start: Some(d(2023, 7, 1)),
        progress: Some(80),
        ..Default::default()
    };
    store.update_timeline_entry("2", patch).unwrap();
    let project = store.project("2").unwrap();
    assert_eq!(project.start_date, d(2023, 7, 1));
    assert_eq!(project.end_date, d(2023, 11, 15));
    assert_eq!(store.task("2").unwrap().progress, 80);
}

#[test]
fn sync_failure_leaves_session_unchanged() {
    let mut backend = MemoryBackend::new(sample_data());
    backend.set_failing(Some("backend down"));
    let mut app = App::new(Box::new(backend), Settings::default(), d(2023, 8, 15));
    app.store = {
        let data = sample_data();
        Store::from_parts(data.projects, data.tasks)
    };
    let before = app.store.clone();

    let err = app.create_project(draft()).unwrap_err();
    assert!(err.is_sync());
    assert!(app.status.is_error());
    assert_eq!(app.store, before);

    let patch = TaskPatch {
        end: Some(d(2023, 11, 30)),
        ..Default::default()
    };
    assert!(app.update_timeline_entry("2", patch).unwrap_err().is_sync());
    assert!(app.delete_project("1").unwrap_err().is_sync());
    assert_eq!(app.store, before);
}

#[test]
fn not_found_never_reaches_backend() {
    let mut backend = MemoryBackend::new(sample_data());
    backend.set_failing(Some("should not be called"));
    let mut app = App::new(Box::new(backend), Settings::default(), d(2023, 8, 15));
    let err = app.delete_project("ghost").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn session_over_file_backend_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("projects.json");
    let mut backend = JsonFileBackend::new(&path);
    backend.seed_if_empty(&sample_data()).unwrap();

    let mut app = App::new(Box::new(backend), Settings::default(), d(2023, 8, 15));
    app.load().unwrap();
    let project = app.create_project(draft()).unwrap();
    let mut sub = TaskDraft::new(&project.id, "Wireframes", d(2024, 2, 1), d(2024, 2, 14));
    sub.id = Some("w.1".into());
    app.add_task(sub).unwrap();
    app.update_project("1", ProjectPatch {
        name: Some("Website Relaunch".into()),
        ..Default::default()
    })
    .unwrap();
    app.delete_task("2.5").unwrap();

    let mut reopened = JsonFileBackend::new(&path);
    let projects = reopened.list_projects().unwrap();
    let tasks = reopened.list_tasks().unwrap();
    assert!(projects.iter().any(|p| p.id == project.id));
    assert!(tasks.iter().any(|t| t.id == "w.1"));
    assert!(tasks.iter().all(|t| t.id != "2.5"));
    let entry = tasks.iter().find(|t| t.id == "1").unwrap();
    assert_eq!(entry.name, "Website Relaunch");

    let mut fresh = App::new(Box::new(reopened), Settings::default(), d(2023, 8, 15));
    fresh.load().unwrap();
    // derived entries may come back in a different order
    let sorted_ids = |store: &Store| {
        let mut ids: Vec<String> = store.tasks().iter().map(|t| t.id.clone()).collect();
        ids.sort();
        ids
    };
    assert_eq!(fresh.store.projects(), app.store.projects());
    assert_eq!(sorted_ids(&fresh.store), sorted_ids(&app.store));
    for task in app.store.tasks() {
        assert_eq!(fresh.store.task(&task.id), Some(task));
    }
}
