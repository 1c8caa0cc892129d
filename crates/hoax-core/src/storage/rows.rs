use crate::errors::GameError;
use crate::model::{ResponseEvent, RoundTicket, SlotLabel, Story};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::Row;

pub(crate) const STORY_COLUMNS: &str =
    "id, folder_id, event, introduction, true_version, fake_version, explanation, hint";

pub(crate) const RESPONSE_COLUMNS: &str =
    "input_id, session_id, story_id, choice, is_correct, round_token, answered_at";

impl ToSql for SlotLabel {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for SlotLabel {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_str()?;
        SlotLabel::parse(raw).map_err(|e: GameError| FromSqlError::Other(Box::new(e)))
    }
}

pub(crate) fn story_from_row(row: &Row<'_>) -> rusqlite::Result<Story> {
    Ok(Story {
        id: row.get(0)?,
        folder_id: row.get(1)?,
        event: row.get(2)?,
        introduction: row.get(3)?,
        true_version: row.get(4)?,
        fake_version: row.get(5)?,
        explanation: row.get(6)?,
        hint: row.get(7)?,
    })
}

pub(crate) fn response_from_row(row: &Row<'_>) -> rusqlite::Result<ResponseEvent> {
    Ok(ResponseEvent {
        input_id: row.get(0)?,
        session_id: row.get(1)?,
        story_id: row.get(2)?,
        choice: row.get(3)?,
        is_correct: row.get::<_, i64>(4)? != 0,
        round_token: row.get(5)?,
        answered_at: row.get(6)?,
    })
}

pub(crate) fn round_from_row(row: &Row<'_>) -> rusqlite::Result<RoundTicket> {
    let answered_at: Option<String> = row.get(4)?;
    Ok(RoundTicket {
        round_token: row.get(0)?,
        story_id: row.get(1)?,
        true_slot: row.get(2)?,
        issued_at: row.get(3)?,
        answered: answered_at.is_some(),
    })
}

/// Numeric suffix of an `S<n>` story id.
pub(crate) fn story_seq(story_id: &str) -> Option<i64> {
    story_id
        .strip_prefix('S')
        .and_then(|n| n.parse::<i64>().ok())
        .filter(|n| *n > 0)
}
