//! Error taxonomy shared by every game operation.
//!
//! All failures are per-request: nothing here is retried and nothing is fatal
//! to the process. Callers branch on [`GameError::kind`].

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Conflict,
    Storage,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Validation => "validation",
            Self::Conflict => "conflict",
            Self::Storage => "storage",
        }
    }
}

/// Game errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("no stories available")]
    NoStories,

    #[error("story not found: {story_id}")]
    StoryNotFound { story_id: String },

    #[error("folder not found: {folder_id}")]
    FolderNotFound { folder_id: i64 },

    #[error("round not found: {round_token}")]
    RoundNotFound { round_token: String },

    #[error("missing required fields: {}", fields.join(", "))]
    MissingFields { fields: Vec<String> },

    #[error("invalid choice: {choice:?} (expected \"T\" or \"H\")")]
    InvalidChoice { choice: String },

    #[error("invalid folder filter: {raw:?}")]
    InvalidFilter { raw: String },

    #[error("round {round_token} was issued for story {expected}, not {actual}")]
    RoundStoryMismatch {
        round_token: String,
        expected: String,
        actual: String,
    },

    #[error("invalid {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("round already answered: {round_token}")]
    RoundAlreadyAnswered { round_token: String },

    #[error("story id already exists: {story_id}")]
    DuplicateStory { story_id: String },

    #[error("folder name already exists: {name}")]
    DuplicateFolder { name: String },

    #[error("story {story_id} is referenced by {responses} response(s); delete with cascade")]
    StoryReferenced { story_id: String, responses: u64 },

    #[error("folder {folder_id} is the default folder and cannot be deleted")]
    ProtectedFolder { folder_id: i64 },

    #[error("database error: {0}")]
    Storage(String),
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoStories
            | Self::StoryNotFound { .. }
            | Self::FolderNotFound { .. }
            | Self::RoundNotFound { .. } => ErrorKind::NotFound,
            Self::MissingFields { .. }
            | Self::InvalidChoice { .. }
            | Self::InvalidFilter { .. }
            | Self::RoundStoryMismatch { .. }
            | Self::InvalidField { .. } => ErrorKind::Validation,
            Self::RoundAlreadyAnswered { .. }
            | Self::DuplicateStory { .. }
            | Self::DuplicateFolder { .. }
            | Self::StoryReferenced { .. }
            | Self::ProtectedFolder { .. } => ErrorKind::Conflict,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }

    pub fn missing(fields: &[&str]) -> Self {
        Self::MissingFields {
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn invalid_field(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Config file could not be read, parsed or accepted.
#[derive(Debug, Error)]
#[error("ConfigError: {0}")]
pub struct ConfigError(pub String);

impl From<rusqlite::Error> for GameError {
    fn from(e: rusqlite::Error) -> Self {
        GameError::Storage(e.to_string())
    }
}

impl From<anyhow::Error> for GameError {
    fn from(e: anyhow::Error) -> Self {
        GameError::Storage(format!("{e:#}"))
    }
}
