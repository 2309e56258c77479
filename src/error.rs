use std::fmt;
use std::path::PathBuf;

/// Result alias used by every fallible store and session operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Which collection an id was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Project,
    Task,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Project => write!(f, "project"),
            Self::Task => write!(f, "timeline entry"),
        }
    }
}

/// Top-level error for store mutations and backend round-trips.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required field was missing or a field combination was invalid.
    /// Raised before any mutation is applied.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The operation referenced an id the store does not hold.
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    /// The persistence collaborator failed. The store keeps its last-known-good state.
    #[error(transparent)]
    Sync(#[from] SyncError),
}

impl Error {
    pub(crate) fn project_not_found(id: &str) -> Self {
        Self::NotFound {
            kind: EntityKind::Project,
            id: id.to_string(),
        }
    }

    pub(crate) fn task_not_found(id: &str) -> Self {
        Self::NotFound {
            kind: EntityKind::Task,
            id: id.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_sync(&self) -> bool {
        matches!(self, Self::Sync(_))
    }
}

/// A single field-level message, suitable for showing next to a form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// One or more field errors collected while validating an input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: {}", summary(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

fn summary(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError {
                field,
                message: message.into(),
            }],
        }
    }

    /// Message for a given field, if that field failed.
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

/// Accumulates field errors; converts into `Err` only if something failed.
#[derive(Debug, Default)]
pub(crate) struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Record a "required" error when `value` is blank.
    pub fn require_text(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, "is required");
        }
    }

    pub fn require<T>(&mut self, field: &'static str, value: Option<&T>) {
        if value.is_none() {
            self.push(field, "is required");
        }
    }

    pub fn finish(self) -> std::result::Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                errors: self.errors,
            })
        }
    }
}

/// Failures at the persistence/identity boundary.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid csv: {0}")]
    InvalidCsv(String),

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

impl SyncError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
