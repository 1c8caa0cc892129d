//! Domain types: stories, folders, slot labels, response events and stats.

use crate::errors::GameError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The default folder. Never deletable; selecting it as a filter means "all stories".
pub const GENERAL_FOLDER_ID: i64 = 1;
pub const GENERAL_FOLDER_NAME: &str = "General";

/// One of the two displayed slots a player can pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotLabel {
    T,
    H,
}

impl SlotLabel {
    pub fn parse(raw: &str) -> Result<Self, GameError> {
        match raw {
            "T" => Ok(Self::T),
            "H" => Ok(Self::H),
            other => Err(GameError::InvalidChoice {
                choice: other.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::T => "T",
            Self::H => "H",
        }
    }

    pub fn other(&self) -> Self {
        match self {
            Self::T => Self::H,
            Self::H => Self::T,
        }
    }
}

impl fmt::Display for SlotLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which narrative a slot carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    True,
    Fake,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub id: String,
    pub folder_id: i64,
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub introduction: Option<String>,
    pub true_version: String,
    pub fake_version: String,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl Story {
    pub fn text(&self, version: Version) -> &str {
        match version {
            Version::True => &self.true_version,
            Version::Fake => &self.fake_version,
        }
    }
}

/// Story fields supplied by an administrator. The id is assigned by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStory {
    #[serde(default)]
    pub folder_id: Option<i64>,
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub introduction: Option<String>,
    #[serde(default)]
    pub true_version: String,
    #[serde(default)]
    pub fake_version: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub hint: Option<String>,
}

impl NewStory {
    /// Reject blank required text. Optional fields that are blank become `None`.
    pub fn validate(mut self) -> Result<Self, GameError> {
        let missing: Vec<&str> = [
            ("event", &self.event),
            ("true_version", &self.true_version),
            ("fake_version", &self.fake_version),
            ("explanation", &self.explanation),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| k)
        .collect();
        if !missing.is_empty() {
            return Err(GameError::missing(&missing));
        }
        if self.true_version.trim() == self.fake_version.trim() {
            return Err(GameError::invalid_field(
                "fake_version",
                "must differ from true_version",
            ));
        }
        self.event = self.event.trim().to_string();
        self.introduction = non_blank(self.introduction);
        self.hint = non_blank(self.hint);
        Ok(self)
    }
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderWithCount {
    pub id: i64,
    pub name: String,
    pub story_count: u64,
}

/// Grouping filter for rounds and statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FolderFilter {
    #[default]
    All,
    Folder(i64),
}

impl FolderFilter {
    /// Absent, blank, `all` and the General folder id are the "show all" sentinel.
    pub fn parse(raw: Option<&str>) -> Result<Self, GameError> {
        let Some(raw) = raw.map(str::trim) else {
            return Ok(Self::All);
        };
        if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        match raw.parse::<i64>() {
            Ok(id) if id > 0 => Ok(Self::from_id(id)),
            _ => Err(GameError::InvalidFilter {
                raw: raw.to_string(),
            }),
        }
    }

    pub fn from_id(id: i64) -> Self {
        if id == GENERAL_FOLDER_ID {
            Self::All
        } else {
            Self::Folder(id)
        }
    }
}

/// Opaque per-browser-session token. Carries no identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(raw: impl Into<String>) -> Result<Self, GameError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(GameError::missing(&["session_id"]));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn mint() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One immutable answer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEvent {
    pub input_id: i64,
    pub session_id: String,
    pub story_id: String,
    pub choice: SlotLabel,
    pub is_correct: bool,
    pub round_token: String,
    pub answered_at: String,
}

/// Response fields to append. `input_id` and `answered_at` are assigned on write.
#[derive(Debug, Clone)]
pub struct NewResponse<'a> {
    pub session_id: &'a SessionId,
    pub story_id: &'a str,
    pub choice: SlotLabel,
    pub is_correct: bool,
    pub round_token: &'a str,
}

/// Server-side record of an issued round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTicket {
    pub round_token: String,
    pub story_id: String,
    pub true_slot: SlotLabel,
    pub issued_at: String,
    pub answered: bool,
}

/// What the player sees. The true slot stays server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundView {
    pub round_token: String,
    pub story_id: String,
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub introduction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(rename = "T")]
    pub slot_t: String,
    #[serde(rename = "H")]
    pub slot_h: String,
}

/// Raw counts behind an accuracy figure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub total: u64,
    pub correct: u64,
}

impl Tally {
    /// Percentage rounded to 2 decimals; 0 when there are no events.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let pct = self.correct as f64 * 100.0 / self.total as f64;
        (pct * 100.0).round() / 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total: u64,
    pub correct: u64,
    pub accuracy: f64,
}

impl From<Tally> for SessionStats {
    fn from(t: Tally) -> Self {
        Self {
            total: t.total,
            correct: t.correct,
            accuracy: t.accuracy(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryStats {
    pub story_id: String,
    pub event: String,
    pub total_attempts: u64,
    pub correct: u64,
    pub accuracy: f64,
}
