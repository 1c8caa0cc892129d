use crate::errors::GameError;
use rusqlite::Connection;

/// Run `f` inside `BEGIN IMMEDIATE`; commit on `Ok`, roll back on `Err`.
pub(crate) fn in_txn_impl<T>(
    conn: &Connection,
    f: impl FnOnce(&Connection) -> Result<T, GameError>,
) -> Result<T, GameError> {
    // BEGIN IMMEDIATE acquires write lock immediately
    conn.execute("BEGIN IMMEDIATE", [])?;

    let result = f(conn);

    match &result {
        Ok(_) => {
            conn.execute("COMMIT", [])?;
        }
        Err(_) => {
            let _ = conn.execute("ROLLBACK", []);
        }
    }

    result
}
