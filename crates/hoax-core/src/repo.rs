//! Collaborator seams for the game components.
//!
//! The round generator, answer evaluator and statistics aggregator only see
//! these traits. [`crate::Store`] implements all three over SQLite.

use crate::errors::GameError;
use crate::model::{FolderFilter, NewResponse, ResponseEvent, RoundTicket, SessionId, Story, Tally};

pub trait StoryRepository {
    /// Stories in scope, in stable enumeration order.
    ///
    /// A filter naming an unknown folder is [`GameError::FolderNotFound`].
    fn stories(&self, filter: FolderFilter) -> Result<Vec<Story>, GameError>;

    fn story(&self, story_id: &str) -> Result<Option<Story>, GameError>;
}

pub trait RoundLedger {
    fn open_round(&self, ticket: &RoundTicket) -> Result<(), GameError>;

    fn round(&self, round_token: &str) -> Result<Option<RoundTicket>, GameError>;

    /// Remove unanswered rounds issued before the RFC 3339 cutoff. Returns the count.
    fn expire_rounds(&self, issued_before: &str) -> Result<u64, GameError>;
}

pub trait ResponseLog {
    /// Append one event and mark its round answered, all-or-nothing.
    fn record_response(&self, response: &NewResponse<'_>) -> Result<ResponseEvent, GameError>;

    fn session_tally(&self, session: &SessionId, filter: FolderFilter)
        -> Result<Tally, GameError>;

    fn story_tally(&self, story_id: &str) -> Result<Tally, GameError>;
}
