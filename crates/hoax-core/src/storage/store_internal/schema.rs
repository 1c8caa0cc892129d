//! Connection bootstrap and additive migrations.

use super::super::{Store, GAME_SCHEMA};
use crate::errors::GameError;
use anyhow::Context;
use rusqlite::Connection;
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub(crate) fn open_impl(path: &Path) -> Result<Store, GameError> {
    let conn = Connection::open(path)?;
    init_connection_impl(&conn)?;
    tracing::debug!(path = %path.display(), "opened game store");
    Ok(Store {
        conn: Arc::new(Mutex::new(conn)),
    })
}

pub(crate) fn memory_impl() -> Result<Store, GameError> {
    let conn = Connection::open_in_memory()?;
    init_connection_impl(&conn)?;
    Ok(Store {
        conn: Arc::new(Mutex::new(conn)),
    })
}

pub(crate) fn from_connection_impl(conn: Connection) -> Result<Store, GameError> {
    init_connection_impl(&conn)?;
    Ok(Store {
        conn: Arc::new(Mutex::new(conn)),
    })
}

pub(crate) fn init_connection_impl(conn: &Connection) -> Result<(), GameError> {
    conn.execute("PRAGMA foreign_keys = ON", [])?;
    // WAL mode for file-backed DBs (no-op for in-memory)
    let _ = conn.execute("PRAGMA journal_mode = WAL", []);
    conn.busy_timeout(Duration::from_millis(5000))?;
    conn.execute_batch(GAME_SCHEMA)?;
    migrate_story_columns_impl(conn)?;
    Ok(())
}

/// `introduction` and `hint` arrived after the first schema; add them in place.
pub(crate) fn migrate_story_columns_impl(conn: &Connection) -> anyhow::Result<()> {
    let cols = get_columns_impl(conn, "stories")?;
    add_column_if_missing_impl(conn, &cols, "stories", "introduction", "TEXT")?;
    add_column_if_missing_impl(conn, &cols, "stories", "hint", "TEXT")?;
    Ok(())
}

pub(crate) fn get_columns_impl(conn: &Connection, table: &str) -> anyhow::Result<HashSet<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({})", table))
        .context("prepare pragma table_info")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;
    let mut out = HashSet::new();
    for r in rows {
        out.insert(r?);
    }
    Ok(out)
}

pub(crate) fn add_column_if_missing_impl(
    conn: &Connection,
    cols: &HashSet<String>,
    table: &str,
    col: &str,
    ty: &str,
) -> anyhow::Result<()> {
    if !cols.contains(col) {
        let sql = format!("ALTER TABLE {} ADD COLUMN {} {}", table, col, ty);
        conn.execute(&sql, [])
            .with_context(|| format!("add column {table}.{col}"))?;
        tracing::info!(table, column = col, "migrated: added column");
    }
    Ok(())
}
