use crate::error::AppError;
use crate::model::{MAX_DESCRIPTION_LEN, Task};
use crate::storage::TaskStore;
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};

/// Business logic over the task collection. Every operation runs a full
/// load, mutate, save cycle against the injected store; nothing is cached
/// between calls. Input validation always happens before storage I/O.
pub struct TaskRepository {
    store: Box<dyn TaskStore>,
}

impl TaskRepository {
    pub fn new(store: Box<dyn TaskStore>) -> Self {
        Self { store }
    }

    pub fn get_all(&self) -> Result<Vec<Task>, AppError> {
        self.store.load()
    }

    pub fn add(&self, description: &str, due_date: Option<&str>) -> Result<Task, AppError> {
        let description = validate_description(description)?;
        let due_date = validate_due_date(due_date)?;

        let mut tasks = self.store.load()?;
        let task = Task {
            id: next_id(&tasks),
            description,
            created_date: now_rfc3339()?,
            due_date,
            completed_date: None,
        };

        tasks.push(task.clone());
        self.store.save(&tasks)?;

        Ok(task)
    }

    /// Completing an already-completed task is an error, not a no-op.
    pub fn complete(&self, id: u32) -> Result<Task, AppError> {
        let mut tasks = self.store.load()?;
        let mut updated_task = None;

        for task in &mut tasks {
            if task.id == id {
                if task.completed_date.is_some() {
                    return Err(AppError::already_completed(format!(
                        "task {id} is already completed"
                    )));
                }

                task.completed_date = Some(now_rfc3339()?);
                updated_task = Some(task.clone());
                break;
            }
        }

        let updated =
            updated_task.ok_or_else(|| AppError::not_found(format!("no task with id {id}")))?;
        self.store.save(&tasks)?;

        Ok(updated)
    }

    pub fn delete(&self, id: u32) -> Result<Task, AppError> {
        let mut tasks = self.store.load()?;
        let index = tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| AppError::not_found(format!("no task with id {id}")))?;

        let removed = tasks.remove(index);
        self.store.save(&tasks)?;

        Ok(removed)
    }

    /// Case-insensitive substring match over descriptions. Read-only.
    pub fn search(&self, query: &str) -> Result<Vec<Task>, AppError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation("search query is required"));
        }

        let needle = trimmed.to_lowercase();
        let tasks = self.store.load()?;

        Ok(tasks
            .into_iter()
            .filter(|task| task.description.to_lowercase().contains(&needle))
            .collect())
    }
}

fn next_id(tasks: &[Task]) -> u32 {
    tasks.iter().map(|task| task.id).max().unwrap_or(0) + 1
}

fn validate_description(description: &str) -> Result<String, AppError> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("description is required"));
    }
    if trimmed.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(AppError::validation(format!(
            "description must be at most {MAX_DESCRIPTION_LEN} characters"
        )));
    }

    Ok(trimmed.to_string())
}

// Date-only comparison in the local offset: a due date earlier today is
// still acceptable, yesterday is not.
fn validate_due_date(due_date: Option<&str>) -> Result<Option<String>, AppError> {
    let raw = match due_date {
        Some(value) => value.trim(),
        None => return Ok(None),
    };
    if raw.is_empty() {
        return Err(AppError::validation("due date must not be blank"));
    }

    let parsed = OffsetDateTime::parse(raw, &Rfc3339)
        .map_err(|_| AppError::validation("due date must be RFC3339"))?;

    let offset = local_offset();
    let today = OffsetDateTime::now_utc().to_offset(offset).date();
    if parsed.to_offset(offset).date() < today {
        return Err(AppError::validation("due date cannot be in the past"));
    }

    let normalized = parsed
        .format(&Rfc3339)
        .map_err(|err| AppError::validation(err.to_string()))?;
    Ok(Some(normalized))
}

fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

fn now_rfc3339() -> Result<String, AppError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|err| AppError::corrupt_data(err.to_string()))
}
