use std::collections::HashSet;

use serde::Serialize;

use crate::model::{Project, ProjectStatus};

/// Headline numbers for the dashboard cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_projects: usize,
    /// Planning, design, development or testing.
    pub in_progress_projects: usize,
    pub completed_projects: usize,
    /// Distinct client names.
    pub client_count: usize,
}

impl DashboardStats {
    pub fn from_projects(projects: &[Project]) -> Self {
        Self {
            total_projects: projects.len(),
            in_progress_projects: projects.iter().filter(|p| p.status.is_active()).count(),
            completed_projects: projects
                .iter()
                .filter(|p| p.status == ProjectStatus::Completed)
                .count(),
            client_count: projects
                .iter()
                .map(|p| p.client.as_str())
                .collect::<HashSet<_>>()
                .len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample;

    #[test]
    fn sample_dashboard() {
        let data = sample::sample_data();
        let stats = DashboardStats::from_projects(&data.projects);
        assert_eq!(
            stats,
            DashboardStats {
                total_projects: 5,
                in_progress_projects: 4,
                completed_projects: 1,
                client_count: 5,
            }
        );
    }

    #[test]
    fn on_hold_counts_as_neither() {
        let mut data = sample::sample_data();
        data.projects[1].status = ProjectStatus::OnHold;
        data.projects[2].client = data.projects[0].client.clone();
        let stats = DashboardStats::from_projects(&data.projects);
        assert_eq!(stats.in_progress_projects, 3);
        assert_eq!(stats.completed_projects, 1);
        assert_eq!(stats.client_count, 4);
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(DashboardStats::from_projects(&[]), DashboardStats::default());
    }
}
