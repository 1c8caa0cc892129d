//! Wire shapes shared by the routes.

use hoax_core::{ErrorKind, GameError};
use hyper::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FolderBody {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionBody {
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FolderDeleted {
    pub folder_id: i64,
    pub stories_moved: u64,
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<&GameError> for ErrorBody {
    fn from(e: &GameError) -> Self {
        Self {
            error: e.kind().as_str().to_string(),
            message: e.to_string(),
        }
    }
}
