use crate::errors::GameError;
use crate::model::{NewResponse, SessionId, SlotLabel};
use crate::repo::{ResponseLog, RoundLedger, StoryRepository};
use serde::{Deserialize, Serialize};

/// A raw answer submission, as received from a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub story_id: Option<String>,
    #[serde(default)]
    pub choice: Option<String>,
    #[serde(default)]
    pub round_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub input_id: i64,
    pub is_correct: bool,
    pub true_slot: SlotLabel,
    pub explanation: String,
    pub feedback: String,
}

/// Checks a choice against the round's true slot and records the answer.
pub struct AnswerEvaluator<'a, S> {
    store: &'a S,
}

impl<'a, S> AnswerEvaluator<'a, S>
where
    S: StoryRepository + RoundLedger + ResponseLog,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn evaluate(&self, submission: &Submission) -> Result<AnswerOutcome, GameError> {
        let [session_id, story_id, choice, round_token] = required(submission)?;
        let session = SessionId::new(session_id)?;
        let choice = SlotLabel::parse(choice)?;

        let round = self
            .store
            .round(round_token)?
            .ok_or_else(|| GameError::RoundNotFound {
                round_token: round_token.to_string(),
            })?;
        if round.story_id != story_id {
            return Err(GameError::RoundStoryMismatch {
                round_token: round_token.to_string(),
                expected: round.story_id,
                actual: story_id.to_string(),
            });
        }
        let story = self
            .store
            .story(story_id)?
            .ok_or_else(|| GameError::StoryNotFound {
                story_id: story_id.to_string(),
            })?;

        let is_correct = choice == round.true_slot;
        let event = self
            .store
            .record_response(&NewResponse {
                session_id: &session,
                story_id,
                choice,
                is_correct,
                round_token,
            })
            .map_err(|e| {
                tracing::warn!(round_token, error = %e, "answer rejected");
                e
            })?;
        tracing::info!(
            input_id = event.input_id,
            story_id,
            is_correct,
            "answer recorded"
        );

        let feedback = if is_correct {
            format!("Correct! This is the true story. {}", story.explanation)
        } else {
            format!("Incorrect. The other story is true. {}", story.explanation)
        };
        Ok(AnswerOutcome {
            input_id: event.input_id,
            is_correct,
            true_slot: round.true_slot,
            explanation: story.explanation,
            feedback,
        })
    }
}

fn required(s: &Submission) -> Result<[&str; 4], GameError> {
    let fields = [
        ("session_id", &s.session_id),
        ("story_id", &s.story_id),
        ("choice", &s.choice),
        ("round_token", &s.round_token),
    ];
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, v)| v.as_deref().map_or(true, |v| v.trim().is_empty()))
        .map(|(k, _)| *k)
        .collect();
    if !missing.is_empty() {
        return Err(GameError::missing(&missing));
    }
    Ok(fields.map(|(_, v)| v.as_deref().unwrap_or_default().trim()))
}
