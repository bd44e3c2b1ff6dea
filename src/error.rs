use thiserror::Error;

#[derive(Debug, Error)]
pub enum SprigError {
    #[error("task {0} not found")]
    TaskNotFound(String),

    #[error("parent task {0} not found")]
    ParentNotFound(String),

    #[error("task id prefix '{0}' is ambiguous (matches: {1})")]
    TaskIdAmbiguous(String, String),

    #[error("task title must not be empty")]
    EmptyTitle,

    #[error("task {0} cannot be its own parent")]
    SelfParent(String),

    #[error("cannot move task {0} inside its own subtree")]
    MoveCycle(String),

    #[error("reorder must name each top-level task exactly once")]
    ReorderMismatch,

    #[error("task {0} has subtasks; complete or move them first")]
    HasSubtasks(String),

    #[error("recurrence interval must be a positive number of days: {0}")]
    BadRecurrence(String),

    #[error("could not understand date expression '{0}'")]
    BadDateExpr(String),

    #[error("task store is corrupted: {0}")]
    CorruptStore(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SprigError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::TaskNotFound(_) => "task_not_found",
            Self::ParentNotFound(_) => "parent_not_found",
            Self::TaskIdAmbiguous(_, _) => "task_id_ambiguous",
            Self::EmptyTitle => "empty_title",
            Self::SelfParent(_) => "self_parent",
            Self::MoveCycle(_) => "move_cycle",
            Self::ReorderMismatch => "reorder_mismatch",
            Self::HasSubtasks(_) => "has_subtasks",
            Self::BadRecurrence(_) => "bad_recurrence",
            Self::BadDateExpr(_) => "bad_date_expr",
            Self::CorruptStore(_) => "corrupt_store",
            Self::Io(_) => "io_error",
            Self::Json(_) => "json_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, SprigError>;
