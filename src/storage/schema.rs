//! Database schema definitions
//!
//! The index is a single table. `visited` and `path` stay NULL until a fetch
//! succeeds; rows are always inserted with explicit NULLs, so the column default
//! only matters for rows written by other tools.

/// SQL schema for the index database
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS url_index (
    url TEXT UNIQUE NOT NULL,
    visited DATETIME DEFAULT CURRENT_TIMESTAMP,
    path TEXT DEFAULT NULL
);
"#;

/// Initializes the database schema
///
/// Safe to call on an index created by an earlier run.
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::{params, Connection};

    #[test]
    fn test_schema_initializes() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(initialize_schema(&conn).is_ok());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        assert!(initialize_schema(&conn).is_ok());
    }

    #[test]
    fn test_table_exists_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params!["url_index"],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_url_is_unique() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        conn.execute(
            "INSERT INTO url_index (url, visited, path) VALUES (?1, NULL, NULL)",
            params!["http://example.com/"],
        )
        .unwrap();
        let second = conn.execute(
            "INSERT INTO url_index (url, visited, path) VALUES (?1, NULL, NULL)",
            params!["http://example.com/"],
        );
        assert!(second.is_err());
    }
}
