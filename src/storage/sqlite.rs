//! SQLite index implementation
//!
//! This module provides a SQLite-based implementation of the VisitIndex trait.
//! Every statement binds the URL as a parameter, so quote characters in a URL
//! cannot change the meaning of a query.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{IndexResult, VisitIndex};
use crate::storage::{IndexStats, UrlRecord};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::Path;

/// SQLite-backed visitation index
pub struct SqliteIndex {
    conn: Connection,
}

impl SqliteIndex {
    /// Opens the index at `path`, creating the file and table if needed
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteIndex)` - Successfully opened/created index
    /// * `Err(IndexError)` - The file could not be opened or initialized
    pub fn open(path: &Path) -> IndexResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory index (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> IndexResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Sets the visit timestamp of an existing record to now
    fn touch(&self, url: &str) -> IndexResult<usize> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE url_index SET visited = ?1 WHERE url = ?2",
            params![now, url],
        )?;
        Ok(updated)
    }
}

impl VisitIndex for SqliteIndex {
    fn record_discovered(&mut self, url: &str) -> IndexResult<()> {
        let inserted = self.conn.execute(
            "INSERT INTO url_index (url, visited, path) VALUES (?1, NULL, NULL)",
            params![url],
        );

        match inserted {
            Ok(_) => {
                tracing::trace!("Discovered {}", url);
                Ok(())
            }
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                // Already known: discovery doubles as a touch
                self.touch(url)?;
                tracing::trace!("Touched {}", url);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn record_fetched(&mut self, url: &str, content_path: &str) -> IndexResult<bool> {
        let updated = self.conn.execute(
            "UPDATE url_index SET path = ?1 WHERE url = ?2",
            params![content_path, url],
        )?;
        Ok(updated > 0)
    }

    fn complete_visit(&mut self, url: &str, content_path: &str) -> IndexResult<bool> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE url_index SET path = ?1, visited = ?2 WHERE url = ?3",
            params![content_path, now, url],
        )?;
        Ok(updated > 0)
    }

    fn exists(&self, url: &str) -> bool {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM url_index WHERE url = ?1 LIMIT 1",
                params![url],
                |row| row.get::<_, i64>(0),
            )
            .optional();

        match found {
            Ok(row) => row.is_some(),
            Err(e) => {
                tracing::debug!("Index lookup failed for {}, treating as unknown: {}", url, e);
                false
            }
        }
    }

    fn is_visited(&self, url: &str) -> bool {
        let visited = self
            .conn
            .query_row(
                "SELECT visited IS NOT NULL FROM url_index WHERE url = ?1 LIMIT 1",
                params![url],
                |row| row.get::<_, bool>(0),
            )
            .optional();

        match visited {
            Ok(flag) => flag.unwrap_or(false),
            Err(e) => {
                tracing::debug!("Visit lookup failed for {}, treating as unvisited: {}", url, e);
                false
            }
        }
    }

    fn unvisited_urls(&self) -> IndexResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT url FROM url_index WHERE visited IS NULL ORDER BY rowid")?;

        let urls = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(urls)
    }

    fn get_record(&self, url: &str) -> IndexResult<Option<UrlRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT url, visited, path FROM url_index WHERE url = ?1",
                params![url],
                |row| {
                    let visited: Option<String> = row.get(1)?;
                    Ok(UrlRecord {
                        url: row.get(0)?,
                        visited_at: visited.as_deref().and_then(parse_timestamp),
                        content_path: row.get(2)?,
                    })
                },
            )
            .optional()?;

        Ok(record)
    }

    fn stats(&self) -> IndexResult<IndexStats> {
        let (total, visited, stored): (i64, i64, i64) = self.conn.query_row(
            "SELECT COUNT(*), COUNT(visited), COUNT(path) FROM url_index",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        Ok(IndexStats {
            total: total as u64,
            visited: visited as u64,
            pending: (total - visited) as u64,
            stored: stored as u64,
        })
    }
}

/// Parses a stored visit timestamp
///
/// Accepts RFC 3339 (written by this crate) and SQLite's `CURRENT_TIMESTAMP`
/// format (`YYYY-MM-DD HH:MM:SS`, UTC).
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}
