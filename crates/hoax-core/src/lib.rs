pub mod config;
pub mod errors;
pub mod game;
pub mod model;
pub mod repo;
pub mod seed;
pub mod storage;

pub use errors::{ErrorKind, GameError};
pub use game::{AnswerEvaluator, AnswerOutcome, RoundGenerator, StatsAggregator, Submission};
pub use model::{
    Folder, FolderFilter, FolderWithCount, NewStory, ResponseEvent, RoundView, SessionId,
    SessionStats, SlotLabel, Story, StoryStats, Version, GENERAL_FOLDER_ID,
};
pub use storage::Store;
