use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SyncError;
use crate::model::{GanttTask, Project, User};

/// Everything persisted in a data file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default, rename = "ganttTasks")]
    pub tasks: Vec<GanttTask>,
    #[serde(default)]
    pub users: Vec<User>,
    /// Id of the signed-in user, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_user: Option<String>,
}

/// Save a snapshot to a JSON file, creating parent directories as needed.
pub fn save_snapshot(snapshot: &Snapshot, path: &Path) -> Result<(), SyncError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| SyncError::io(dir, e))?;
    }
    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, json).map_err(|e| SyncError::io(path, e))
}

/// Load a snapshot from a JSON file.
pub fn load_snapshot(path: &Path) -> Result<Snapshot, SyncError> {
    let json = std::fs::read_to_string(path).map_err(|e| SyncError::io(path, e))?;
    Ok(serde_json::from_str(&json)?)
}
