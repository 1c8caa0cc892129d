use crate::errors::GameError;
use crate::model::{FolderFilter, SessionId, SessionStats, StoryStats};
use crate::repo::{ResponseLog, StoryRepository};

/// Read-only accuracy summaries over the response log.
pub struct StatsAggregator<'a, S> {
    store: &'a S,
}

impl<'a, S> StatsAggregator<'a, S>
where
    S: StoryRepository + ResponseLog,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn session_stats(
        &self,
        session: &SessionId,
        filter: FolderFilter,
    ) -> Result<SessionStats, GameError> {
        let tally = self.store.session_tally(session, filter)?;
        Ok(tally.into())
    }

    /// One entry per story in scope, in repository order.
    ///
    /// An empty unfiltered repository is [`GameError::NoStories`]; an empty
    /// folder yields an empty list.
    pub fn story_stats(&self, filter: FolderFilter) -> Result<Vec<StoryStats>, GameError> {
        let stories = self.store.stories(filter)?;
        if stories.is_empty() && filter == FolderFilter::All {
            return Err(GameError::NoStories);
        }
        stories
            .into_iter()
            .map(|story| {
                let tally = self.store.story_tally(&story.id)?;
                Ok(StoryStats {
                    accuracy: tally.accuracy(),
                    story_id: story.id,
                    event: story.event,
                    total_attempts: tally.total,
                    correct: tally.correct,
                })
            })
            .collect()
    }
}
