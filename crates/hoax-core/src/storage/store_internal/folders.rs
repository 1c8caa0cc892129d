use crate::errors::GameError;
use crate::model::{Folder, FolderFilter, FolderWithCount, GENERAL_FOLDER_ID};
use rusqlite::{params, Connection, OptionalExtension};

const MAX_FOLDER_NAME: usize = 255;

pub(crate) fn list_folders_impl(
    conn: &Connection,
    query: Option<&str>,
) -> Result<Vec<FolderWithCount>, GameError> {
    let pattern = query.map(|q| format!("%{}%", escape_like(q)));
    let mut stmt = conn.prepare(
        "SELECT f.id, f.name, COUNT(s.id)
         FROM folders f
         LEFT JOIN stories s ON s.folder_id = f.id
         WHERE ?1 IS NULL OR f.name LIKE ?1 ESCAPE '\\'
         GROUP BY f.id, f.name
         ORDER BY f.id ASC",
    )?;
    let rows = stmt
        .query_map(params![pattern], |row| {
            Ok(FolderWithCount {
                id: row.get(0)?,
                name: row.get(1)?,
                story_count: row.get::<_, i64>(2)? as u64,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub(crate) fn get_folder_impl(conn: &Connection, folder_id: i64) -> Result<Option<Folder>, GameError> {
    let folder = conn
        .query_row(
            "SELECT id, name FROM folders WHERE id = ?1",
            [folder_id],
            |row| {
                Ok(Folder {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(folder)
}

pub(crate) fn ensure_folder_impl(conn: &Connection, folder_id: i64) -> Result<Folder, GameError> {
    get_folder_impl(conn, folder_id)?.ok_or(GameError::FolderNotFound { folder_id })
}

/// The "show all" sentinel needs no lookup; a concrete folder must exist.
pub(crate) fn ensure_filter_impl(conn: &Connection, filter: FolderFilter) -> Result<(), GameError> {
    if let FolderFilter::Folder(folder_id) = filter {
        ensure_folder_impl(conn, folder_id)?;
    }
    Ok(())
}

pub(crate) fn create_folder_impl(conn: &Connection, name: &str) -> Result<Folder, GameError> {
    let name = validate_name(name)?;
    if name_taken(conn, &name, None)? {
        return Err(GameError::DuplicateFolder { name });
    }
    conn.execute("INSERT INTO folders (name) VALUES (?1)", [&name])?;
    let id = conn.last_insert_rowid();
    tracing::info!(folder_id = id, name = %name, "folder created");
    Ok(Folder { id, name })
}

pub(crate) fn rename_folder_impl(
    conn: &Connection,
    folder_id: i64,
    name: &str,
) -> Result<Folder, GameError> {
    let name = validate_name(name)?;
    ensure_folder_impl(conn, folder_id)?;
    if name_taken(conn, &name, Some(folder_id))? {
        return Err(GameError::DuplicateFolder { name });
    }
    conn.execute(
        "UPDATE folders SET name = ?1 WHERE id = ?2",
        params![name, folder_id],
    )?;
    tracing::info!(folder_id, name = %name, "folder renamed");
    Ok(Folder { id: folder_id, name })
}

pub(crate) fn delete_folder_impl(conn: &Connection, folder_id: i64) -> Result<u64, GameError> {
    if folder_id == GENERAL_FOLDER_ID {
        return Err(GameError::ProtectedFolder { folder_id });
    }
    ensure_folder_impl(conn, folder_id)?;
    let moved = conn.execute(
        "UPDATE stories SET folder_id = ?1 WHERE folder_id = ?2",
        params![GENERAL_FOLDER_ID, folder_id],
    )?;
    conn.execute("DELETE FROM folders WHERE id = ?1", [folder_id])?;
    tracing::info!(folder_id, moved, "folder deleted; stories moved to General");
    Ok(moved as u64)
}

fn validate_name(name: &str) -> Result<String, GameError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(GameError::missing(&["name"]));
    }
    if name.chars().count() > MAX_FOLDER_NAME {
        return Err(GameError::invalid_field(
            "name",
            format!("longer than {MAX_FOLDER_NAME} characters"),
        ));
    }
    Ok(name.to_string())
}

fn name_taken(conn: &Connection, name: &str, except: Option<i64>) -> Result<bool, GameError> {
    // `name` is declared COLLATE NOCASE, so equality is case-insensitive.
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM folders WHERE name = ?1 AND (?2 IS NULL OR id != ?2)",
        params![name, except],
        |row| row.get(0),
    )?;
    Ok(n > 0)
}

fn escape_like(q: &str) -> String {
    let mut out = String::with_capacity(q.len());
    for c in q.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
