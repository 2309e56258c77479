pub mod project;
pub mod task;
pub mod timeline;
pub mod user;

pub use project::{MemberRole, Project, ProjectDraft, ProjectPatch, ProjectStatus};
pub use task::{parse_dependency_list, GanttTask, TaskDraft, TaskPatch, TaskType};
pub use timeline::{DateRange, ViewMode, ViewState};
pub use user::{Role, User};
