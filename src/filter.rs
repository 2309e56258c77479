//! Predicates that narrow the project and timeline collections before
//! projection.

use crate::model::{DateRange, GanttTask, Project, ProjectStatus, TaskType};

/// Criteria for the project list. Every supplied criterion must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// Exact client name.
    pub client: Option<String>,
    pub status: Option<ProjectStatus>,
    /// Keep projects whose dates overlap this span.
    pub date_range: Option<DateRange>,
    /// User id that must appear among designers or developers.
    pub assignee: Option<String>,
}

impl FilterOptions {
    pub fn matches(&self, project: &Project) -> bool {
        if let Some(client) = &self.client {
            if project.client != *client {
                return false;
            }
        }
        if let Some(status) = self.status {
            if project.status != status {
                return false;
            }
        }
        if let Some(range) = &self.date_range {
            if !DateRange::new(project.start_date, project.end_date).overlaps(range) {
                return false;
            }
        }
        if let Some(user) = &self.assignee {
            if !project.has_member(user) {
                return false;
            }
        }
        true
    }
}

pub fn filter_projects<'a>(projects: &'a [Project], options: &FilterOptions) -> Vec<&'a Project> {
    projects.iter().filter(|p| options.matches(p)).collect()
}

/// Case-insensitive match of `term` against an entry's name or the name of
/// the project that owns it. An empty term keeps everything.
pub fn filter_tasks_by_text<'a>(
    tasks: &'a [GanttTask],
    projects: &[Project],
    term: &str,
) -> Vec<&'a GanttTask> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return tasks.iter().collect();
    }
    tasks
        .iter()
        .filter(|task| {
            task.name.to_lowercase().contains(&needle)
                || projects
                    .iter()
                    .find(|p| p.id == task.project)
                    .is_some_and(|p| p.name.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Project list search over name, client and code.
pub fn search_projects<'a>(projects: &'a [Project], term: &str) -> Vec<&'a Project> {
    let needle = term.trim().to_lowercase();
    projects
        .iter()
        .filter(|p| {
            needle.is_empty()
                || p.name.to_lowercase().contains(&needle)
                || p.client.to_lowercase().contains(&needle)
                || p.code.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Entries overlapping a window.
pub fn tasks_in_range<'a, I>(tasks: I, range: &DateRange) -> Vec<&'a GanttTask>
where
    I: IntoIterator<Item = &'a GanttTask>,
{
    tasks.into_iter().filter(|t| t.overlaps(range)).collect()
}

/// Top-level rows only (projects and milestones), as on the dashboard.
pub fn project_level_tasks(tasks: &[GanttTask]) -> Vec<&GanttTask> {
    tasks.iter().filter(|t| t.kind != TaskType::Task).collect()
}
