use super::folders::{ensure_filter_impl, ensure_folder_impl};
use super::responses::count_for_story_impl;
use crate::errors::GameError;
use crate::model::{FolderFilter, NewStory, Story, GENERAL_FOLDER_ID};
use crate::storage::rows::{story_from_row, story_seq, STORY_COLUMNS};
use crate::storage::DeletedStory;
use rusqlite::{params, Connection, OptionalExtension};

pub(crate) fn list_stories_impl(
    conn: &Connection,
    filter: FolderFilter,
) -> Result<Vec<Story>, GameError> {
    ensure_filter_impl(conn, filter)?;
    let folder = match filter {
        FolderFilter::All => None,
        FolderFilter::Folder(id) => Some(id),
    };
    let mut stmt = conn.prepare(&format!(
        "SELECT {STORY_COLUMNS} FROM stories
         WHERE ?1 IS NULL OR folder_id = ?1
         ORDER BY seq ASC"
    ))?;
    let rows = stmt
        .query_map(params![folder], story_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(count = rows.len(), ?filter, "listed stories");
    Ok(rows)
}

pub(crate) fn get_story_impl(conn: &Connection, story_id: &str) -> Result<Option<Story>, GameError> {
    let story = conn
        .query_row(
            &format!("SELECT {STORY_COLUMNS} FROM stories WHERE id = ?1"),
            [story_id],
            story_from_row,
        )
        .optional()?;
    Ok(story)
}

pub(crate) fn story_count_impl(conn: &Connection) -> Result<u64, GameError> {
    let n: i64 = conn.query_row("SELECT COUNT(*) FROM stories", [], |row| row.get(0))?;
    Ok(n as u64)
}

pub(crate) fn create_story_impl(
    conn: &Connection,
    requested_id: Option<&str>,
    story: &NewStory,
) -> Result<Story, GameError> {
    let folder_id = story.folder_id.unwrap_or(GENERAL_FOLDER_ID);
    ensure_folder_impl(conn, folder_id)?;

    let (story_id, seq) = match requested_id {
        Some(id) => {
            let seq = story_seq(id)
                .ok_or_else(|| GameError::invalid_field("id", format!("{id:?} is not S<n>")))?;
            let taken: i64 = conn.query_row(
                "SELECT COUNT(*) FROM stories WHERE id = ?1 OR seq = ?2",
                params![id, seq],
                |row| row.get(0),
            )?;
            if taken > 0 {
                return Err(GameError::DuplicateStory {
                    story_id: id.to_string(),
                });
            }
            (id.to_string(), seq)
        }
        None => {
            let max: Option<i64> =
                conn.query_row("SELECT MAX(seq) FROM stories", [], |row| row.get(0))?;
            let seq = max.unwrap_or(0) + 1;
            (format!("S{seq}"), seq)
        }
    };

    conn.execute(
        "INSERT INTO stories (
            id, seq, folder_id, event, introduction,
            true_version, fake_version, explanation, hint
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            story_id,
            seq,
            folder_id,
            story.event,
            story.introduction,
            story.true_version,
            story.fake_version,
            story.explanation,
            story.hint,
        ],
    )?;
    tracing::info!(story_id = %story_id, folder_id, "story created");

    get_story_impl(conn, &story_id)?.ok_or(GameError::StoryNotFound { story_id })
}

pub(crate) fn update_story_impl(
    conn: &Connection,
    story_id: &str,
    story: &NewStory,
) -> Result<Story, GameError> {
    let existing = get_story_impl(conn, story_id)?.ok_or_else(|| GameError::StoryNotFound {
        story_id: story_id.to_string(),
    })?;
    let folder_id = story.folder_id.unwrap_or(existing.folder_id);
    ensure_folder_impl(conn, folder_id)?;

    conn.execute(
        "UPDATE stories SET
            folder_id = ?1, event = ?2, introduction = ?3, true_version = ?4,
            fake_version = ?5, explanation = ?6, hint = ?7
         WHERE id = ?8",
        params![
            folder_id,
            story.event,
            story.introduction,
            story.true_version,
            story.fake_version,
            story.explanation,
            story.hint,
            story_id,
        ],
    )?;
    tracing::info!(story_id, folder_id, "story updated");

    get_story_impl(conn, story_id)?.ok_or_else(|| GameError::StoryNotFound {
        story_id: story_id.to_string(),
    })
}

/// Caller owns the transaction so a cascade removes everything or nothing.
pub(crate) fn delete_story_impl(
    conn: &Connection,
    story_id: &str,
    cascade: bool,
) -> Result<DeletedStory, GameError> {
    if get_story_impl(conn, story_id)?.is_none() {
        return Err(GameError::StoryNotFound {
            story_id: story_id.to_string(),
        });
    }

    let responses = count_for_story_impl(conn, story_id)?;
    if responses > 0 && !cascade {
        return Err(GameError::StoryReferenced {
            story_id: story_id.to_string(),
            responses,
        });
    }

    let responses_removed = conn.execute("DELETE FROM responses WHERE story_id = ?1", [story_id])?;
    let rounds_removed = conn.execute("DELETE FROM rounds WHERE story_id = ?1", [story_id])?;
    conn.execute("DELETE FROM stories WHERE id = ?1", [story_id])?;
    tracing::info!(
        story_id,
        responses_removed,
        rounds_removed,
        cascade,
        "story deleted"
    );

    Ok(DeletedStory {
        story_id: story_id.to_string(),
        responses_removed: responses_removed as u64,
        rounds_removed: rounds_removed as u64,
    })
}
