use crate::error::AppError;
use crate::model::Task;
use std::path::PathBuf;

mod json_store;

pub use json_store::{JsonFileStore, store_path};

/// Durable storage for the task collection. The repository only talks to
/// this trait; production wires in [`JsonFileStore`], tests substitute
/// their own.
pub trait TaskStore {
    /// Read the whole collection. A missing or blank backing file is an
    /// empty collection; unparseable content is a `CorruptData` error and
    /// must leave the file untouched.
    fn load(&self) -> Result<Vec<Task>, AppError>;

    /// Replace the whole collection. Backs up the previous file first
    /// (best-effort), then writes atomically. All failures surface as
    /// `Persistence`.
    fn save(&self, tasks: &[Task]) -> Result<(), AppError>;

    /// Copy the current primary file to a timestamped sibling. Returns the
    /// backup path, or `None` when there is no primary file yet.
    fn backup(&self) -> Result<Option<PathBuf>, AppError>;
}
