//! Process exit codes. Scripts branch on these; keep them stable.

use hoax_core::errors::ConfigError;
use hoax_core::{ErrorKind, GameError};

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1; // Unclassified failure (I/O, server)
pub const VALIDATION: i32 = 2; // Bad input or bad config
pub const NOT_FOUND: i32 = 3;
pub const CONFLICT: i32 = 4;
pub const STORAGE: i32 = 5;

pub fn for_kind(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Validation => VALIDATION,
        ErrorKind::NotFound => NOT_FOUND,
        ErrorKind::Conflict => CONFLICT,
        ErrorKind::Storage => STORAGE,
    }
}

pub fn for_error(e: &anyhow::Error) -> i32 {
    if let Some(game) = e.downcast_ref::<GameError>() {
        return for_kind(game.kind());
    }
    if e.downcast_ref::<ConfigError>().is_some() {
        return VALIDATION;
    }
    FAILURE
}
