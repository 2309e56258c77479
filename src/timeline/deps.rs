//! Best-effort predecessor lookup for drawing relationship lines.
//!
//! Dependencies are display hints, not constraints: ids that do not resolve
//! are skipped without error.

use super::chart::ChartLayout;
use super::range::DisplayDates;
use crate::model::GanttTask;

/// Predecessors of `task`, in the order listed, skipping unknown ids.
pub fn resolve_dependencies<'a>(task: &GanttTask, all: &'a [GanttTask]) -> Vec<&'a GanttTask> {
    task.dependencies
        .iter()
        .filter_map(|id| all.iter().find(|t| t.id == *id))
        .collect()
}

/// A connector between two rows of the day grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLink<'a> {
    pub predecessor: &'a GanttTask,
    pub dependent: &'a GanttTask,
    /// Column of the predecessor's last visible day.
    pub from_column: usize,
    /// Column of the dependent's first visible day.
    pub to_column: usize,
}

/// Grid connectors for `task`. A link is produced only when both entries
/// overlap the displayed window; endpoints are clipped to its edges.
pub fn grid_links<'a>(
    task: &'a GanttTask,
    all: &'a [GanttTask],
    dates: &DisplayDates,
) -> Vec<GridLink<'a>> {
    let window = dates.window();
    if !task.overlaps(&window) {
        return Vec::new();
    }
    let Some(to_column) = dates.index_of(task.start.clamp(window.start, window.end)) else {
        return Vec::new();
    };
    resolve_dependencies(task, all)
        .into_iter()
        .filter(|pred| pred.overlaps(&window))
        .filter_map(|pred| {
            let from_column = dates.index_of(pred.end.clamp(window.start, window.end))?;
            Some(GridLink {
                predecessor: pred,
                dependent: task,
                from_column,
                to_column,
            })
        })
        .collect()
}

/// A horizontal connector on the continuous axis, from the predecessor's
/// bar start to the dependent's bar start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarLink<'a> {
    pub predecessor: &'a GanttTask,
    pub dependent: &'a GanttTask,
    pub from_x: f32,
    pub to_x: f32,
}

impl BarLink<'_> {
    /// Signed length; negative when the dependent starts first.
    pub fn length(&self) -> f32 {
        self.to_x - self.from_x
    }
}

pub fn bar_links<'a>(task: &'a GanttTask, all: &'a [GanttTask], chart: &ChartLayout) -> Vec<BarLink<'a>> {
    let to_x = chart.bar(task).left;
    resolve_dependencies(task, all)
        .into_iter()
        .map(|pred| BarLink {
            predecessor: pred,
            dependent: task,
            from_x: chart.bar(pred).left,
            to_x,
        })
        .collect()
}
