use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeskError {
    /// The persistent medium could not be opened or written (quota, permissions,
    /// missing root). Stores keep serving an in-memory overlay after this.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Record not found: {0}")]
    RecordNotFound(u64),

    #[error("Chapter {id} has no revision scheduled on {day}")]
    RevisionNotScheduled { id: u64, day: NaiveDate },

    #[error("Fetch failed: {0}")]
    NetworkFetch(String),

    #[error("Unknown setting: {0}")]
    UnknownSetting(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] confique::Error),
}

impl DeskError {
    /// True for failures the caller should survive by carrying on in memory.
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, DeskError::StorageUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, DeskError>;
