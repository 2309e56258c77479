use std::path::Path;

use chrono::NaiveDate;
use tracing::warn;

use crate::error::SyncError;
use crate::model::{parse_dependency_list, GanttTask, ProjectStatus, TaskType};

/// Parsed rows plus the number of rows that could not be used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    pub tasks: Vec<GanttTask>,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Id,
    Name,
    Start,
    End,
    Progress,
    Dependencies,
    Kind,
    Project,
    Status,
    Assignee,
}

/// Try parsing a date string with several common formats.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d", "%Y.%m.%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Accepts `65`, `65%` or a status word.
fn parse_progress(s: &str) -> Option<u8> {
    let s = s.trim();
    if s.is_empty() {
        return Some(0);
    }
    if let Ok(n) = s.trim_end_matches('%').trim().parse::<u16>() {
        return Some(n.min(100) as u8);
    }
    match s.to_lowercase().as_str() {
        "finished" | "done" | "complete" | "completed" => Some(100),
        "in progress" | "in-progress" | "active" | "started" => Some(50),
        "not started" | "not-started" | "new" => Some(0),
        _ => None,
    }
}

/// Detect delimiter by checking the first line for common separators.
fn detect_delimiter(first_line: &str) -> u8 {
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    let tabs = first_line.matches('\t').count();

    if semicolons >= commas && semicolons >= tabs {
        b';'
    } else if tabs >= commas {
        b'\t'
    } else {
        b','
    }
}

fn header_to_column(header: &str) -> Option<Column> {
    let normalized = header.trim().to_lowercase().replace([' ', '-', '_'], "");
    let column = match normalized.as_str() {
        "id" | "taskid" | "key" => Column::Id,
        "name" | "task" | "taskname" | "tasklabel" | "label" | "title" | "activity" => Column::Name,
        "start" | "startdate" | "from" | "begin" => Column::Start,
        "end" | "enddate" | "to" | "finish" | "due" | "duedate" => Column::End,
        "progress" | "percent" | "complete" | "%complete" => Column::Progress,
        "dependencies" | "dependson" | "predecessors" | "deps" => Column::Dependencies,
        "type" | "kind" | "milestone" => Column::Kind,
        "project" | "projectid" => Column::Project,
        "status" | "state" | "stage" => Column::Status,
        "assignee" | "owner" | "resource" => Column::Assignee,
        _ => return None,
    };
    Some(column)
}

/// Import timeline entries from a CSV file. See [`parse_csv`].
pub fn import_csv(path: &Path, default_project: Option<&str>) -> Result<ImportOutcome, SyncError> {
    let content = std::fs::read_to_string(path).map_err(|e| SyncError::io(path, e))?;
    parse_csv(&content, default_project)
}

/// Parse CSV text into timeline entries.
///
/// The delimiter (semicolon, comma or tab) is detected from the first line
/// and headers are matched loosely. Name, start and end columns are
/// required. Rows without a name, with unparseable or reversed dates, or
/// without an owning project (and no `default_project`) are skipped and
/// counted.
pub fn parse_csv(content: &str, default_project: Option<&str>) -> Result<ImportOutcome, SyncError> {
    let first_line = content.lines().next().unwrap_or("");
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(first_line))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let columns: Vec<Option<Column>> = reader.headers()?.iter().map(header_to_column).collect();
    for required in [Column::Name, Column::Start, Column::End] {
        if !columns.contains(&Some(required)) {
            return Err(SyncError::InvalidCsv(format!("missing column {required:?}")));
        }
    }

    let mut outcome = ImportOutcome::default();
    for (i, result) in reader.records().enumerate() {
        let line = i + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(line, error = %e, "skipping unreadable csv row");
                outcome.skipped += 1;
                continue;
            }
        };
        let field = |column: Column| {
            columns
                .iter()
                .position(|c| *c == Some(column))
                .and_then(|idx| record.get(idx))
                .filter(|v| !v.is_empty())
        };

        let Some(name) = field(Column::Name) else {
            warn!(line, "skipping csv row without a name");
            outcome.skipped += 1;
            continue;
        };
        let (Some(start), Some(end)) = (
            field(Column::Start).and_then(parse_date),
            field(Column::End).and_then(parse_date),
        ) else {
            warn!(line, task = name, "skipping csv row with invalid dates");
            outcome.skipped += 1;
            continue;
        };
        if end < start {
            warn!(line, task = name, %start, %end, "skipping csv row that ends before it starts");
            outcome.skipped += 1;
            continue;
        }
        let Some(project) = field(Column::Project).or(default_project) else {
            warn!(line, task = name, "skipping csv row without a project");
            outcome.skipped += 1;
            continue;
        };

        let kind = match field(Column::Kind).map(str::to_lowercase).as_deref() {
            Some("true" | "yes" | "1" | "milestone") => TaskType::Milestone,
            Some(other) => other.parse().unwrap_or_default(),
            None if start == end => TaskType::Milestone,
            None => TaskType::Task,
        };

        let id = field(Column::Id).map(str::to_string).unwrap_or_default();
        let mut task = if kind == TaskType::Milestone {
            GanttTask::new_milestone(id, name, start, project)
        } else {
            GanttTask::new(id, name, start, end, project)
        };
        if kind == TaskType::Project {
            task.kind = TaskType::Project;
        }
        task.progress = field(Column::Progress).and_then(parse_progress).unwrap_or(0);
        task.dependencies = field(Column::Dependencies).map(parse_dependency_list).unwrap_or_default();
        task.status = field(Column::Status).and_then(|s| s.parse::<ProjectStatus>().ok());
        task.assignee = field(Column::Assignee).map(str::to_string);
        outcome.tasks.push(task);
    }

    Ok(outcome)
}
