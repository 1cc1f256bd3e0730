use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    Validation(String),
    NotFound(String),
    AlreadyCompleted(String),
    CorruptData(String),
    Io(String),
    Persistence(String),
}

impl AppError {
    pub fn validation<M: Into<String>>(message: M) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found<M: Into<String>>(message: M) -> Self {
        Self::NotFound(message.into())
    }

    pub fn already_completed<M: Into<String>>(message: M) -> Self {
        Self::AlreadyCompleted(message.into())
    }

    pub fn corrupt_data<M: Into<String>>(message: M) -> Self {
        Self::CorruptData(message.into())
    }

    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io(message.into())
    }

    pub fn persistence<M: Into<String>>(message: M) -> Self {
        Self::Persistence(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::AlreadyCompleted(_) => "already_completed",
            Self::CorruptData(_) => "corrupt_data",
            Self::Io(_) => "io_error",
            Self::Persistence(_) => "persistence",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Validation(message) => message,
            Self::NotFound(message) => message,
            Self::AlreadyCompleted(message) => message,
            Self::CorruptData(message) => message,
            Self::Io(message) => message,
            Self::Persistence(message) => message,
        }
    }

    /// Errors the user can fix by re-entering input, as opposed to faults
    /// that need attention outside the program.
    pub fn is_correctable(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::NotFound(_) | Self::AlreadyCompleted(_)
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.code(), self.message())
    }
}

impl std::error::Error for AppError {}
