//! Storage layer for groundtrack.
//!
//! This module provides `SQLite`-based persistent storage for named TLE
//! records. A [`TleStore`] owns its connection and is passed explicitly to
//! whoever needs it; there is no process-wide handle.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::tle::TleRecord;

/// What [`TleStore::upsert`] did with a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new record was created with this id.
    Inserted(i64),
    /// An existing record's lines were replaced.
    Updated(i64),
    /// The stored lines were already identical.
    Unchanged(i64),
}

/// Storage engine for named TLE records.
#[derive(Debug)]
pub struct TleStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl TleStore {
    /// Open or create a TLE database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert a record, or replace the lines of the record with the same name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn upsert(&self, record: &TleRecord) -> Result<UpsertOutcome> {
        let existing: Option<(i64, String)> = self
            .conn
            .query_row(
                "SELECT id, content_hash FROM tle_records WHERE name = ?1",
                [&record.name],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match existing {
            Some((id, hash)) if hash == record.content_hash => {
                debug!("TLE '{}' unchanged", record.name);
                Ok(UpsertOutcome::Unchanged(id))
            }
            Some((id, _)) => {
                self.conn.execute(
                    r"
                    UPDATE tle_records
                    SET line1 = ?1, line2 = ?2, content_hash = ?3, updated_at = ?4
                    WHERE id = ?5
                    ",
                    params![
                        record.line1,
                        record.line2,
                        record.content_hash,
                        record.updated_at.to_rfc3339(),
                        id,
                    ],
                )?;
                info!("Updated TLE '{}'", record.name);
                Ok(UpsertOutcome::Updated(id))
            }
            None => {
                self.conn.execute(
                    r"
                    INSERT INTO tle_records (name, line1, line2, content_hash, created_at, updated_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    ",
                    params![
                        record.name,
                        record.line1,
                        record.line2,
                        record.content_hash,
                        record.created_at.to_rfc3339(),
                        record.updated_at.to_rfc3339(),
                    ],
                )?;
                let id = self.conn.last_insert_rowid();
                info!("Stored TLE '{}' with id {}", record.name, id);
                Ok(UpsertOutcome::Inserted(id))
            }
        }
    }

    /// Get a record by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, name: &str) -> Result<Option<TleRecord>> {
        let result = self
            .conn
            .query_row(
                r"
                SELECT id, name, line1, line2, content_hash, created_at, updated_at
                FROM tle_records WHERE name = ?1
                ",
                [name],
                Self::row_to_record,
            )
            .optional()?;
        Ok(result)
    }

    /// Get a record by name, failing if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecordNotFound`] if no record has that name.
    pub fn require(&self, name: &str) -> Result<TleRecord> {
        self.get(name)?.ok_or_else(|| Error::RecordNotFound {
            name: name.to_string(),
        })
    }

    /// List all records, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list(&self) -> Result<Vec<TleRecord>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, name, line1, line2, content_hash, created_at, updated_at
            FROM tle_records ORDER BY name ASC
            ",
        )?;

        let records = stmt
            .query_map([], Self::row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Count stored records.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tle_records", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete a record by name.
    ///
    /// Returns `true` if a record was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete(&self, name: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM tle_records WHERE name = ?1", [name])?;
        if affected > 0 {
            info!("Deleted TLE '{}'", name);
        }
        Ok(affected > 0)
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<TleRecord> {
        let created_at: String = row.get(5)?;
        let updated_at: String = row.get(6)?;

        Ok(TleRecord {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            line1: row.get(2)?,
            line2: row.get(3)?,
            content_hash: row.get(4)?,
            created_at: parse_timestamp(&created_at),
            updated_at: parse_timestamp(&updated_at),
        })
    }
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value).map_or_else(
        |_| {
            warn!("Unparseable stored timestamp: {}, using now", value);
            Utc::now()
        },
        |dt| dt.with_timezone(&Utc),
    )
}
