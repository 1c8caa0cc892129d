use super::folders::ensure_filter_impl;
use super::rounds::settle_round_impl;
use crate::errors::GameError;
use crate::model::{FolderFilter, NewResponse, ResponseEvent, SessionId, Tally};
use crate::storage::rows::{response_from_row, RESPONSE_COLUMNS};
use chrono::Utc;
use rusqlite::{params, Connection};

/// Caller owns the transaction; settle and insert must commit together.
pub(crate) fn record_response_impl(
    conn: &Connection,
    r: &NewResponse<'_>,
) -> Result<ResponseEvent, GameError> {
    let answered_at = Utc::now().to_rfc3339();
    settle_round_impl(conn, r.round_token, &answered_at)?;

    conn.execute(
        "INSERT INTO responses (session_id, story_id, choice, is_correct, round_token, answered_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            r.session_id.as_str(),
            r.story_id,
            r.choice,
            r.is_correct as i32,
            r.round_token,
            answered_at,
        ],
    )?;

    Ok(ResponseEvent {
        input_id: conn.last_insert_rowid(),
        session_id: r.session_id.as_str().to_string(),
        story_id: r.story_id.to_string(),
        choice: r.choice,
        is_correct: r.is_correct,
        round_token: r.round_token.to_string(),
        answered_at,
    })
}

pub(crate) fn session_tally_impl(
    conn: &Connection,
    session: &SessionId,
    filter: FolderFilter,
) -> Result<Tally, GameError> {
    ensure_filter_impl(conn, filter)?;
    let folder = match filter {
        FolderFilter::All => None,
        FolderFilter::Folder(id) => Some(id),
    };
    let (total, correct): (i64, i64) = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(r.is_correct), 0)
         FROM responses r
         JOIN stories s ON s.id = r.story_id
         WHERE r.session_id = ?1 AND (?2 IS NULL OR s.folder_id = ?2)",
        params![session.as_str(), folder],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok(Tally {
        total: total as u64,
        correct: correct as u64,
    })
}

pub(crate) fn story_tally_impl(conn: &Connection, story_id: &str) -> Result<Tally, GameError> {
    let (total, correct): (i64, i64) = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(is_correct), 0) FROM responses WHERE story_id = ?1",
        [story_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok(Tally {
        total: total as u64,
        correct: correct as u64,
    })
}

pub(crate) fn count_for_story_impl(conn: &Connection, story_id: &str) -> Result<u64, GameError> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM responses WHERE story_id = ?1",
        [story_id],
        |row| row.get(0),
    )?;
    Ok(n as u64)
}

pub(crate) fn session_history_impl(
    conn: &Connection,
    session: &SessionId,
) -> Result<Vec<ResponseEvent>, GameError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RESPONSE_COLUMNS} FROM responses WHERE session_id = ?1 ORDER BY input_id ASC"
    ))?;
    let rows = stmt
        .query_map([session.as_str()], response_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
