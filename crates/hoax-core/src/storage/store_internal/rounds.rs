use crate::errors::GameError;
use crate::model::RoundTicket;
use crate::storage::rows::round_from_row;
use rusqlite::{params, Connection, OptionalExtension};

pub(crate) fn open_round_impl(conn: &Connection, ticket: &RoundTicket) -> Result<(), GameError> {
    conn.execute(
        "INSERT INTO rounds (round_token, story_id, true_slot, issued_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            ticket.round_token,
            ticket.story_id,
            ticket.true_slot,
            ticket.issued_at,
        ],
    )?;
    Ok(())
}

pub(crate) fn get_round_impl(
    conn: &Connection,
    round_token: &str,
) -> Result<Option<RoundTicket>, GameError> {
    let ticket = conn
        .query_row(
            "SELECT round_token, story_id, true_slot, issued_at, answered_at
             FROM rounds WHERE round_token = ?1",
            [round_token],
            round_from_row,
        )
        .optional()?;
    Ok(ticket)
}

/// Drop unanswered rounds issued before `issued_before` (RFC 3339).
///
/// Answered rounds are kept: their responses reference them.
pub(crate) fn expire_rounds_impl(
    conn: &Connection,
    issued_before: &str,
) -> Result<u64, GameError> {
    let removed = conn.execute(
        "DELETE FROM rounds WHERE answered_at IS NULL AND issued_at < ?1",
        [issued_before],
    )?;
    Ok(removed as u64)
}

/// Mark a round answered. Only the first caller wins.
pub(crate) fn settle_round_impl(
    conn: &Connection,
    round_token: &str,
    answered_at: &str,
) -> Result<(), GameError> {
    let changed = conn.execute(
        "UPDATE rounds SET answered_at = ?1
         WHERE round_token = ?2 AND answered_at IS NULL",
        params![answered_at, round_token],
    )?;
    if changed == 1 {
        return Ok(());
    }
    match get_round_impl(conn, round_token)? {
        Some(_) => Err(GameError::RoundAlreadyAnswered {
            round_token: round_token.to_string(),
        }),
        None => Err(GameError::RoundNotFound {
            round_token: round_token.to_string(),
        }),
    }
}
