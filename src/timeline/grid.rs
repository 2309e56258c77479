//! Grid layout: one fixed-width cell per displayed day.

use chrono::{Datelike, NaiveDate, Weekday};

use super::range::DisplayDates;
use crate::model::{GanttTask, ViewMode};

/// Background treatment of a day column. Weekend wins over today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shade {
    Plain,
    Weekend,
    Today,
}

/// Layout facts for one (entry, day) cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellFacts {
    pub date: NaiveDate,
    pub in_range: bool,
    /// Leading cell of the bar: rounded left edge.
    pub is_start: bool,
    /// Trailing cell of the bar: rounded right edge.
    pub is_end: bool,
    pub is_weekend: bool,
    pub is_today: bool,
}

impl CellFacts {
    /// The progress label is drawn once, on the bar's first cell.
    pub fn shows_progress_label(&self) -> bool {
        self.in_range && self.is_start
    }

    pub fn shade(&self) -> Shade {
        shade(self.is_weekend, self.is_today)
    }
}

fn shade(is_weekend: bool, is_today: bool) -> Shade {
    if is_weekend {
        Shade::Weekend
    } else if is_today {
        Shade::Today
    } else {
        Shade::Plain
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Compute the facts for a single cell.
pub fn project_cell(task: &GanttTask, date: NaiveDate, today: NaiveDate) -> CellFacts {
    CellFacts {
        date,
        in_range: task.contains(date),
        is_start: date == task.start,
        is_end: date == task.end,
        is_weekend: is_weekend(date),
        is_today: date == today,
    }
}

/// One entry laid out across the display window.
#[derive(Debug, Clone)]
pub struct GridRow<'a> {
    pub task: &'a GanttTask,
    pub cells: Vec<CellFacts>,
}

impl<'a> GridRow<'a> {
    /// First and last in-range column, inclusive. `None` when the entry lies
    /// entirely outside the window.
    pub fn span(&self) -> Option<(usize, usize)> {
        let first = self.cells.iter().position(|c| c.in_range)?;
        let last = self.cells.iter().rposition(|c| c.in_range)?;
        Some((first, last))
    }

    pub fn is_visible(&self) -> bool {
        self.span().is_some()
    }

    /// Column carrying the progress label; absent when the start day is
    /// clipped off the window.
    pub fn label_column(&self) -> Option<usize> {
        self.cells.iter().position(CellFacts::shows_progress_label)
    }

    /// The bar is cut by the left edge of the window.
    pub fn clipped_left(&self) -> bool {
        self.span().is_some() && !self.cells.iter().any(|c| c.is_start)
    }

    /// The bar is cut by the right edge of the window.
    pub fn clipped_right(&self) -> bool {
        self.span().is_some() && !self.cells.iter().any(|c| c.is_end)
    }
}

/// Lay out one entry over every displayed day.
pub fn project_row<'a>(task: &'a GanttTask, dates: &DisplayDates, today: NaiveDate) -> GridRow<'a> {
    let mut cursor = dates.clone();
    cursor.restart();
    GridRow {
        task,
        cells: cursor.map(|date| project_cell(task, date, today)).collect(),
    }
}

/// Lay out several entries; order is preserved.
pub fn project_grid<'a, I>(tasks: I, dates: &DisplayDates, today: NaiveDate) -> Vec<GridRow<'a>>
where
    I: IntoIterator<Item = &'a GanttTask>,
{
    tasks
        .into_iter()
        .map(|task| project_row(task, dates, today))
        .collect()
}

/// A column header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub date: NaiveDate,
    pub primary: String,
    pub secondary: String,
    pub is_weekend: bool,
    pub is_today: bool,
}

impl HeaderCell {
    pub fn shade(&self) -> Shade {
        shade(self.is_weekend, self.is_today)
    }
}

/// Two-line header text for a day column under a view mode.
pub fn header_labels(mode: ViewMode, date: NaiveDate) -> (String, String) {
    match mode {
        ViewMode::Day => (date.format("%m/%d").to_string(), date.format("%A").to_string()),
        ViewMode::Week => (
            format!("W{}", date.iso_week().week()),
            date.format("%m/%d").to_string(),
        ),
        ViewMode::Month | ViewMode::Quarter => {
            (date.format("%m/%d").to_string(), date.format("%a").to_string())
        }
    }
}

pub fn header_cells(mode: ViewMode, dates: &DisplayDates, today: NaiveDate) -> Vec<HeaderCell> {
    let mut cursor = dates.clone();
    cursor.restart();
    cursor
        .map(|date| {
            let (primary, secondary) = header_labels(mode, date);
            HeaderCell {
                date,
                primary,
                secondary,
                is_weekend: is_weekend(date),
                is_today: date == today,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::range::{display_dates, Padding};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn weekend_detection() {
        assert!(is_weekend(d(2023, 8, 19))); // Sat
        assert!(is_weekend(d(2023, 8, 20))); // Sun
        assert!(!is_weekend(d(2023, 8, 21)));
    }

    #[test]
    fn bar_clipped_by_window_start() {
        let task = GanttTask::new("t", "Kickoff", d(2023, 7, 28), d(2023, 8, 3), "p");
        let dates = display_dates(ViewMode::Month, d(2023, 8, 15), Padding::NONE);
        let row = project_row(&task, &dates, d(2023, 8, 2));

        assert_eq!(row.span(), Some((0, 2)));
        assert!(row.clipped_left());
        assert!(!row.clipped_right());
        assert_eq!(row.label_column(), None);
        let ends: Vec<_> = row.cells.iter().filter(|c| c.is_end).map(|c| c.date).collect();
        assert_eq!(ends, [d(2023, 8, 3)]);
        assert!(row.cells[1].is_today);
    }

    #[test]
    fn label_sits_on_start_cell() {
        let task = GanttTask::new("t", "Build", d(2023, 8, 9), d(2023, 8, 11), "p");
        let dates = display_dates(ViewMode::Week, d(2023, 8, 9), Padding::NONE);
        let row = project_row(&task, &dates, d(2000, 1, 1));
        assert_eq!(row.span(), Some((2, 4)));
        assert_eq!(row.label_column(), Some(2));
        assert!(row.cells[2].is_start && !row.cells[2].is_end);
        assert!(row.cells[4].is_end);
    }

    #[test]
    fn out_of_window_entry_is_invisible() {
        let task = GanttTask::new("t", "Later", d(2024, 1, 1), d(2024, 1, 9), "p");
        let dates = display_dates(ViewMode::Month, d(2023, 8, 15), Padding::SIMPLE);
        let row = project_row(&task, &dates, d(2023, 8, 15));
        assert_eq!(row.cells.len(), 37);
        assert!(!row.is_visible());
        assert!(!row.clipped_left() && !row.clipped_right());
    }

    #[test]
    fn reversed_entry_renders_nothing() {
        let task = GanttTask::new("t", "Broken", d(2023, 8, 10), d(2023, 8, 5), "p");
        let dates = display_dates(ViewMode::Month, d(2023, 8, 15), Padding::NONE);
        assert!(!project_row(&task, &dates, d(2023, 8, 15)).is_visible());
    }

    #[test]
    fn shade_prefers_weekend() {
        let sat = CellFacts {
            date: d(2023, 8, 19),
            in_range: false,
            is_start: false,
            is_end: false,
            is_weekend: true,
            is_today: true,
        };
        assert_eq!(sat.shade(), Shade::Weekend);
        assert_eq!(CellFacts { is_weekend: false, ..sat }.shade(), Shade::Today);
    }

    #[test]
    fn headers_follow_view_mode() {
        let date = d(2023, 8, 15);
        assert_eq!(header_labels(ViewMode::Day, date), ("08/15".into(), "Tuesday".into()));
        assert_eq!(header_labels(ViewMode::Week, date), ("W33".into(), "08/15".into()));
        assert_eq!(header_labels(ViewMode::Quarter, date), ("08/15".into(), "Tue".into()));

        let dates = display_dates(ViewMode::Week, date, Padding::NONE);
        let cells = header_cells(ViewMode::Week, &dates, date);
        assert_eq!(cells.len(), 7);
        assert!(cells[1].is_today);
        assert_eq!(cells[6].shade(), Shade::Weekend);
    }
}
