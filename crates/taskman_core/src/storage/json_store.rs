use crate::error::AppError;
use crate::model::Task;
use crate::storage::TaskStore;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};
use tracing::{debug, warn};

const STORE_FILE_NAME: &str = "tasks.json";

const BACKUP_STAMP: &[BorrowedFormatItem<'static>] =
    format_description!("[year][month][day]_[hour][minute][second]");

pub fn store_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var("TASKMAN_STORE_PATH")
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::io("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("taskman").join(STORE_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::io("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("taskman")
            .join(STORE_FILE_NAME))
    }
}

/// JSON-file-backed [`TaskStore`]. The file holds a pretty-printed array of
/// task records and is only ever replaced by a fully written temp file, so
/// a crash mid-save leaves the previous file intact.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self::new(store_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }

    fn backup_path(&self, now_local: OffsetDateTime) -> Result<PathBuf, AppError> {
        let stamp = now_local
            .format(&BACKUP_STAMP)
            .map_err(|err| AppError::io(err.to_string()))?;
        let stem = self
            .path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "tasks".to_string());
        let name = match self.path.extension() {
            Some(ext) => format!("{stem}.backup_{stamp}.{}", ext.to_string_lossy()),
            None => format!("{stem}.backup_{stamp}"),
        };
        Ok(self.path.with_file_name(name))
    }
}

fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

impl TaskStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Task>, AppError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "store file missing, starting empty");
            return Ok(Vec::new());
        }

        let content =
            fs::read_to_string(&self.path).map_err(|err| AppError::io(err.to_string()))?;
        if content.trim().is_empty() {
            debug!(path = %self.path.display(), "store file blank, starting empty");
            return Ok(Vec::new());
        }

        let tasks: Vec<Task> = serde_json::from_str(&content).map_err(|err| {
            AppError::corrupt_data(format!("invalid JSON in {}: {}", self.path.display(), err))
        })?;

        debug!(count = tasks.len(), "loaded tasks");
        Ok(tasks)
    }

    fn save(&self, tasks: &[Task]) -> Result<(), AppError> {
        // Backup is best-effort; a failed copy must not block the save.
        if let Err(err) = self.backup() {
            warn!(error = %err, "backup failed, saving anyway");
        }

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|err| AppError::persistence(err.to_string()))?;
        }

        let content = serde_json::to_string_pretty(tasks)
            .map_err(|err| AppError::persistence(err.to_string()))?;

        // Write the full document to a sibling temp file, flush it, then
        // swap it into place. The primary path only ever holds a complete
        // document.
        let temp_path = self.temp_path();
        let mut file =
            File::create(&temp_path).map_err(|err| AppError::persistence(err.to_string()))?;
        file.write_all(content.as_bytes())
            .map_err(|err| AppError::persistence(err.to_string()))?;
        file.sync_all()
            .map_err(|err| AppError::persistence(err.to_string()))?;
        drop(file);

        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|err| AppError::persistence(err.to_string()))?;
        }
        fs::rename(&temp_path, &self.path)
            .map_err(|err| AppError::persistence(err.to_string()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&self.path, permissions)
                .map_err(|err| AppError::persistence(err.to_string()))?;
        }

        debug!(count = tasks.len(), path = %self.path.display(), "saved tasks");
        Ok(())
    }

    fn backup(&self) -> Result<Option<PathBuf>, AppError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let now_local = OffsetDateTime::now_utc().to_offset(local_offset());
        let backup_path = self.backup_path(now_local)?;
        fs::copy(&self.path, &backup_path).map_err(|err| AppError::io(err.to_string()))?;

        debug!(path = %backup_path.display(), "created backup");
        Ok(Some(backup_path))
    }
}

#[cfg(test)]
mod tests {
    use super::JsonFileStore;
    use crate::model::Task;
    use crate::storage::TaskStore;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("taskman-{nanos}"));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn sample_task(id: u32, description: &str) -> Task {
        Task {
            id,
            description: description.to_string(),
            created_date: "2025-12-01T00:00:00Z".to_string(),
            due_date: None,
            completed_date: None,
        }
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = temp_dir();
        let store = JsonFileStore::new(dir.join("tasks.json"));
        let tasks = vec![
            sample_task(1, "first"),
            Task {
                id: 2,
                description: "second".to_string(),
                created_date: "2025-12-01T00:00:00Z".to_string(),
                due_date: Some("2025-12-22T09:00:00Z".to_string()),
                completed_date: Some("2025-12-23T10:00:00Z".to_string()),
            },
        ];

        store.save(&tasks).unwrap();
        let loaded = store.load().unwrap();
        fs::remove_dir_all(&dir).ok();

        assert_eq!(loaded, tasks);
    }

    #[test]
    fn load_missing_file_returns_empty() {
        let dir = temp_dir();
        let store = JsonFileStore::new(dir.join("tasks.json"));

        let loaded = store.load().unwrap();
        fs::remove_dir_all(&dir).ok();

        assert!(loaded.is_empty());
    }

    #[test]
    fn load_blank_file_returns_empty() {
        let dir = temp_dir();
        let path = dir.join("tasks.json");
        fs::write(&path, "   \n\t  ").unwrap();

        let store = JsonFileStore::new(&path);
        let loaded = store.load().unwrap();
        fs::remove_dir_all(&dir).ok();

        assert!(loaded.is_empty());
    }

    #[test]
    fn load_invalid_json_fails_and_keeps_file() {
        let dir = temp_dir();
        let path = dir.join("tasks.json");
        fs::write(&path, "{ not json ]").unwrap();

        let store = JsonFileStore::new(&path);
        let err = store.load().unwrap_err();
        let content = fs::read_to_string(&path).unwrap();
        fs::remove_dir_all(&dir).ok();

        assert_eq!(err.code(), "corrupt_data");
        assert_eq!(content, "{ not json ]");
    }

    #[test]
    fn save_writes_pretty_camel_case_array() {
        let dir = temp_dir();
        let path = dir.join("tasks.json");
        let store = JsonFileStore::new(&path);

        store.save(&[sample_task(1, "demo")]).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        fs::remove_dir_all(&dir).ok();

        assert!(content.trim_start().starts_with('['));
        assert!(content.contains("\"createdDate\""));
        assert!(content.contains("\"dueDate\""));
        assert!(content.contains('\n'));
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let dir = temp_dir();
        let path = dir.join("tasks.json");
        let store = JsonFileStore::new(&path);

        store.save(&[sample_task(1, "demo")]).unwrap();
        let temp_exists = path.with_extension("tmp").exists();
        fs::remove_dir_all(&dir).ok();

        assert!(!temp_exists);
    }

    #[test]
    fn save_over_existing_file_creates_backup_with_prior_content() {
        let dir = temp_dir();
        let path = dir.join("tasks.json");
        let store = JsonFileStore::new(&path);

        store.save(&[sample_task(1, "before")]).unwrap();
        let before = fs::read_to_string(&path).unwrap();
        store.save(&[sample_task(1, "after")]).unwrap();

        let backups: Vec<PathBuf> = fs::read_dir(&dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|entry| {
                entry
                    .file_name()
                    .map(|name| name.to_string_lossy().contains(".backup_"))
                    .unwrap_or(false)
            })
            .collect();

        assert_eq!(backups.len(), 1);
        let backup_content = fs::read_to_string(&backups[0]).unwrap();
        let backup_name = backups[0].file_name().unwrap().to_string_lossy().into_owned();
        fs::remove_dir_all(&dir).ok();

        assert_eq!(backup_content, before);
        assert!(backup_name.starts_with("tasks.backup_"));
        assert!(backup_name.ends_with(".json"));
    }

    #[test]
    fn first_save_creates_no_backup() {
        let dir = temp_dir();
        let store = JsonFileStore::new(dir.join("tasks.json"));

        store.save(&[sample_task(1, "demo")]).unwrap();
        let backups = fs::read_dir(&dir)
            .unwrap()
            .filter(|entry| {
                entry
                    .as_ref()
                    .unwrap()
                    .file_name()
                    .to_string_lossy()
                    .contains(".backup_")
            })
            .count();
        fs::remove_dir_all(&dir).ok();

        assert_eq!(backups, 0);
    }

    #[test]
    fn backup_without_primary_is_noop() {
        let dir = temp_dir();
        let store = JsonFileStore::new(dir.join("tasks.json"));

        let result = store.backup().unwrap();
        fs::remove_dir_all(&dir).ok();

        assert!(result.is_none());
    }

    #[test]
    fn leftover_temp_file_does_not_affect_load() {
        // A crash between the temp write and the rename leaves only a
        // stale .tmp behind; the primary file must read back unchanged.
        let dir = temp_dir();
        let path = dir.join("tasks.json");
        let store = JsonFileStore::new(&path);
        let tasks = vec![sample_task(1, "stable")];

        store.save(&tasks).unwrap();
        fs::write(path.with_extension("tmp"), "[{\"half\":").unwrap();

        let loaded = store.load().unwrap();
        fs::remove_dir_all(&dir).ok();

        assert_eq!(loaded, tasks);
    }

    #[test]
    fn save_reports_persistence_error_when_parent_is_a_file() {
        let dir = temp_dir();
        let blocker = dir.join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let store = JsonFileStore::new(blocker.join("tasks.json"));
        let err = store.save(&[sample_task(1, "demo")]).unwrap_err();
        fs::remove_dir_all(&dir).ok();

        assert_eq!(err.code(), "persistence");
    }
}
