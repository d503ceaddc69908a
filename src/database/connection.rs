//! Database connection management.

use anyhow::{anyhow, Result};
use rusqlite::Connection;
use tracing::debug;

/// Open the backing database at `path`, or in memory when `None`.
///
/// The connection is configured with the settings the rest of the crate
/// assumes; callers get it back ready for statement execution.
pub(crate) fn open(path: Option<&str>) -> Result<Connection> {
    let conn = match path {
        Some(p) => Connection::open(p)
            .map_err(|e| anyhow!("Failed to open database at '{}': {}", p, e))?,
        None => Connection::open_in_memory()
            .map_err(|e| anyhow!("Failed to create in-memory database: {}", e))?,
    };
    configure(&conn)?;
    debug!(path = path.unwrap_or(":memory:"), "opened database connection");
    Ok(conn)
}

fn configure(conn: &Connection) -> Result<()> {
    // WAL keeps readers unblocked while the single writer holds the handle
    let _: String = conn
        .query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))
        .map_err(|e| anyhow!("Failed to set journal mode: {}", e))?;

    conn.execute("PRAGMA synchronous=NORMAL", [])
        .map_err(|e| anyhow!("Failed to set synchronous mode: {}", e))?;

    conn.execute("PRAGMA foreign_keys=ON", [])
        .map_err(|e| anyhow!("Failed to enable foreign keys: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        assert!(open(None).is_ok());
    }

    #[test]
    fn test_open_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quarry.sqlite3");
        let conn = open(path.to_str()).unwrap();
        conn.execute("CREATE TABLE t (id INTEGER PRIMARY KEY)", [])
            .unwrap();
    }

    #[test]
    fn test_open_bad_path() {
        assert!(open(Some("/nonexistent-dir/quarry.sqlite3")).is_err());
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let conn = open(None).unwrap();
        let enabled: i32 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }
}
