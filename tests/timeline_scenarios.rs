use chrono::NaiveDate;

use pms_timeline::filter::tasks_in_range;
use pms_timeline::model::{parse_dependency_list, GanttTask, ViewMode};
use pms_timeline::timeline::{
    display_dates, header_cells, project_row, resolve_dependencies, resolve_range, ChartLayout,
    Padding, Shade,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn month_view_mid_august() {
    let range = resolve_range(ViewMode::Month, d(2023, 8, 15));
    assert_eq!((range.start, range.end), (d(2023, 8, 1), d(2023, 8, 31)));

    let entry = GanttTask::new("x", "Kickoff", d(2023, 7, 28), d(2023, 8, 3), "p");
    assert_eq!(tasks_in_range([&entry], &range).len(), 1);

    let dates = display_dates(ViewMode::Month, d(2023, 8, 15), Padding::NONE);
    let row = project_row(&entry, &dates, d(2023, 8, 15));
    let in_range: Vec<_> = row.cells.iter().filter(|c| c.in_range).map(|c| c.date).collect();
    assert_eq!(in_range, [d(2023, 8, 1), d(2023, 8, 2), d(2023, 8, 3)]);

    let ends: Vec<_> = row.cells.iter().filter(|c| c.is_end).map(|c| c.date).collect();
    assert_eq!(ends, [d(2023, 8, 3)]);
    // the start day is before the window, so no cell carries the label
    assert!(row.cells.iter().all(|c| !c.is_start));
    assert!(row.clipped_left());
    assert_eq!(row.span(), Some((0, 2)));
}

#[test]
fn single_day_bar() {
    let entry = GanttTask::new("x", "Release", d(2023, 8, 1), d(2023, 8, 1), "p");
    let chart = ChartLayout::new(d(2023, 7, 27), d(2023, 8, 10), 40.0);
    let bar = chart.bar(&entry);
    assert_eq!(bar.left, 200.0);
    assert_eq!(bar.width, 40.0);
}

#[test]
fn split_panel_padding_widens_window() {
    let dates = display_dates(ViewMode::Week, d(2023, 8, 16), Padding::SPLIT_PANEL);
    let window = dates.window();
    assert_eq!(window.start, d(2023, 8, 12));
    assert_eq!(window.end, d(2023, 8, 22));
    assert_eq!(dates.len(), 11);

    let header = header_cells(ViewMode::Week, &dates, d(2023, 8, 16));
    assert_eq!(header.len(), 11);
    assert_eq!(header[0].shade(), Shade::Weekend);
    assert_eq!(header[4].shade(), Shade::Today);
    assert_eq!(header[4].primary, "W33");
}

#[test]
fn dependencies_skip_unknown_ids() {
    let a = GanttTask::new("a", "A", d(2023, 8, 1), d(2023, 8, 2), "p");
    let b = GanttTask::new("b", "B", d(2023, 8, 3), d(2023, 8, 4), "p");
    let mut c = GanttTask::new("c", "C", d(2023, 8, 5), d(2023, 8, 6), "p");
    c.dependencies = parse_dependency_list("a, missing, b");
    let all = vec![a, b, c.clone()];
    let ids: Vec<_> = resolve_dependencies(&c, &all).iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["a", "b"]);
}

#[test]
fn reversed_external_entry_projects_to_nothing() {
    // the store refuses these, but loaded data may still carry one
    let entry = GanttTask::new("x", "Broken", d(2023, 8, 10), d(2023, 8, 5), "p");
    let dates = display_dates(ViewMode::Month, d(2023, 8, 15), Padding::NONE);
    let row = project_row(&entry, &dates, d(2023, 8, 15));
    assert!(!row.is_visible());

    let chart = ChartLayout::new(d(2023, 8, 1), d(2023, 8, 31), 40.0);
    assert!(chart.bar(&entry).is_empty());
}
