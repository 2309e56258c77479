//! Timeline engine: visible window resolution, grid and bar projection,
//! dependency links.

pub mod chart;
pub mod deps;
pub mod grid;
pub mod range;

pub use chart::{progress_label, BarGeometry, ChartLayout};
pub use deps::{bar_links, grid_links, resolve_dependencies, BarLink, GridLink};
pub use grid::{header_cells, project_grid, project_row, CellFacts, GridRow, HeaderCell, Shade};
pub use range::{display_dates, resolve_range, DisplayDates, Padding};

use crate::model::GanttTask;

/// Row order for charts: grouped by owning project, then by start date.
/// The sort is stable, so entries starting the same day keep their order.
pub fn display_order<'a, I>(tasks: I) -> Vec<&'a GanttTask>
where
    I: IntoIterator<Item = &'a GanttTask>,
{
    let mut rows: Vec<&GanttTask> = tasks.into_iter().collect();
    rows.sort_by(|a, b| a.project.cmp(&b.project).then(a.start.cmp(&b.start)));
    rows
}
