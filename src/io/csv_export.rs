use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::error::SyncError;
use crate::model::GanttTask;

pub const HEADER: [&str; 10] = [
    "Id",
    "Name",
    "Start",
    "End",
    "Progress",
    "Dependencies",
    "Type",
    "Project",
    "Status",
    "Assignee",
];

/// Export timeline entries as semicolon-delimited CSV with ISO dates,
/// in the column order of [`HEADER`]. Returns the number of rows written.
pub fn export_csv(tasks: &[GanttTask], path: &Path) -> Result<usize, SyncError> {
    let file = std::fs::File::create(path).map_err(|e| SyncError::io(path, e))?;
    let written = write_csv(tasks, file)?;
    info!(rows = written, path = %path.display(), "exported timeline entries");
    Ok(written)
}

/// Same as [`export_csv`] but into any writer.
pub fn write_csv<W: Write>(tasks: &[GanttTask], writer: W) -> Result<usize, SyncError> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(HEADER)?;
    for task in tasks {
        let start = task.start.format("%Y-%m-%d").to_string();
        let end = task.end.format("%Y-%m-%d").to_string();
        let progress = task.progress.to_string();
        let dependencies = task.dependencies_text();
        wtr.write_record([
            task.id.as_str(),
            task.name.as_str(),
            start.as_str(),
            end.as_str(),
            progress.as_str(),
            dependencies.as_str(),
            task.kind.as_str(),
            task.project.as_str(),
            task.status.map(|s| s.as_str()).unwrap_or_default(),
            task.assignee.as_deref().unwrap_or_default(),
        ])?;
    }
    wtr.flush().map_err(|e| SyncError::io("<csv writer>", e))?;
    Ok(tasks.len())
}
