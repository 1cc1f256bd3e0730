use crate::error::AppError;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub const MAX_DESCRIPTION_LEN: usize = 200;

/// Persisted task record. Timestamps are RFC3339 strings; the JSON file
/// uses camelCase keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u32,
    pub description: String,
    pub created_date: String,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub completed_date: Option<String>,
}

/// Derived on every read, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Completed,
    Overdue,
}

impl TaskStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Overdue => "overdue",
        }
    }
}

impl Task {
    pub fn status_at(&self, now: OffsetDateTime) -> Result<TaskStatus, AppError> {
        derive_status(self.completed_date.as_deref(), self.due_date.as_deref(), now)
    }

    pub fn status(&self) -> Result<TaskStatus, AppError> {
        self.status_at(OffsetDateTime::now_utc())
    }
}

/// Status is a pure function of the two completion-related timestamps and
/// the current instant. A set `completedDate` wins over everything else.
pub fn derive_status(
    completed_date: Option<&str>,
    due_date: Option<&str>,
    now: OffsetDateTime,
) -> Result<TaskStatus, AppError> {
    if completed_date.is_some() {
        return Ok(TaskStatus::Completed);
    }

    let due_date = match due_date {
        Some(value) => value,
        None => return Ok(TaskStatus::Pending),
    };

    let due = OffsetDateTime::parse(due_date, &Rfc3339)
        .map_err(|_| AppError::corrupt_data("dueDate must be RFC3339"))?;

    if due < now {
        Ok(TaskStatus::Overdue)
    } else {
        Ok(TaskStatus::Pending)
    }
}
