//! SQLite-backed movie store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{MovieEnrichment, MovieRecord, MovieStore, MovieSummary, MovieTable, StoreError};
use crate::yts::Torrent;

const COLUMNS: &str = "imdb_id, title, poster_url, year, genres, plot, runtime, ratings, \
                       cast_members, torrents, source, release_date, updated_at";

/// SQLite-backed movie store.
pub struct SqliteMovieStore {
    conn: Mutex<Connection>,
}

impl SqliteMovieStore {
    /// Open (or create) the database file and both movie tables.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(db_err)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        for table in MovieTable::all() {
            let name = table.table_name();
            conn.execute_batch(&format!(
                r#"
                CREATE TABLE IF NOT EXISTS {name} (
                    imdb_id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    poster_url TEXT,
                    year INTEGER,
                    genres TEXT NOT NULL DEFAULT '[]',
                    plot TEXT,
                    runtime INTEGER,
                    ratings TEXT,
                    cast_members TEXT NOT NULL DEFAULT '[]',
                    torrents TEXT NOT NULL DEFAULT '[]',
                    source TEXT,
                    release_date TEXT,
                    updated_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_{name}_title ON {name}(title);
                "#
            ))
            .map_err(db_err)?;
        }
        Ok(())
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<MovieRecord> {
        let updated_at_str: String = row.get(12)?;
        let updated_at = DateTime::parse_from_rfc3339(&updated_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(MovieRecord {
            imdb_id: row.get(0)?,
            title: row.get(1)?,
            poster_url: row.get(2)?,
            year: row.get(3)?,
            genres: from_json_column(row, 4)?.unwrap_or_default(),
            plot: row.get(5)?,
            runtime: row.get(6)?,
            ratings: from_json_column(row, 7)?,
            cast: from_json_column(row, 8)?.unwrap_or_default(),
            torrents: from_json_column(row, 9)?.unwrap_or_default(),
            source: row.get(10)?,
            release_date: row.get(11)?,
            updated_at,
        })
    }

    fn exists_sync(&self, table: MovieTable, imdb_id: &str) -> Result<bool, StoreError> {
        let conn = self.conn();
        let found: Option<i32> = conn
            .query_row(
                &format!("SELECT 1 FROM {} WHERE imdb_id = ?", table.table_name()),
                params![imdb_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_err)?;
        Ok(found.is_some())
    }

    fn get_sync(&self, table: MovieTable, imdb_id: &str) -> Result<Option<MovieRecord>, StoreError> {
        let conn = self.conn();
        conn.query_row(
            &format!(
                "SELECT {} FROM {} WHERE imdb_id = ?",
                COLUMNS,
                table.table_name()
            ),
            params![imdb_id],
            Self::row_to_record,
        )
        .optional()
        .map_err(db_err)
    }

    fn insert_sync(&self, table: MovieTable, record: &MovieRecord) -> Result<(), StoreError> {
        let conn = self.conn();
        let result = conn.execute(
            &format!(
                "INSERT INTO {} ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                table.table_name(),
                COLUMNS
            ),
            params![
                record.imdb_id,
                record.title,
                record.poster_url,
                record.year,
                to_json(&record.genres)?,
                record.plot,
                record.runtime,
                record.ratings.as_ref().map(to_json).transpose()?,
                to_json(&record.cast)?,
                to_json(&record.torrents)?,
                record.source,
                record.release_date,
                record.updated_at.to_rfc3339(),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(StoreError::Conflict(record.imdb_id.clone()))
            }
            Err(e) => Err(db_err(e)),
        }
    }

    fn apply_enrichment_sync(
        &self,
        table: MovieTable,
        imdb_id: &str,
        e: &MovieEnrichment,
    ) -> Result<bool, StoreError> {
        let conn = self.conn();
        let changed = conn
            .execute(
                &format!(
                    "UPDATE {} SET poster_url = COALESCE(?1, poster_url), plot = COALESCE(?2, plot),
                     runtime = COALESCE(?3, runtime), ratings = COALESCE(?4, ratings),
                     torrents = ?5, source = COALESCE(?6, source), updated_at = ?7
                     WHERE imdb_id = ?8",
                    table.table_name()
                ),
                params![
                    e.poster_url,
                    e.plot,
                    e.runtime,
                    e.ratings.as_ref().map(to_json).transpose()?,
                    to_json(&e.torrents)?,
                    e.source,
                    e.updated_at.to_rfc3339(),
                    imdb_id,
                ],
            )
            .map_err(db_err)?;
        Ok(changed > 0)
    }

    fn update_torrents_sync(
        &self,
        table: MovieTable,
        imdb_id: &str,
        torrents: &[Torrent],
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let conn = self.conn();
        let changed = conn
            .execute(
                &format!(
                    "UPDATE {} SET torrents = ?1, updated_at = ?2 WHERE imdb_id = ?3",
                    table.table_name()
                ),
                params![to_json(&torrents)?, updated_at.to_rfc3339(), imdb_id],
            )
            .map_err(db_err)?;
        Ok(changed > 0)
    }

    fn search_sync(
        &self,
        table: MovieTable,
        query: &str,
        limit: u32,
    ) -> Result<Vec<MovieSummary>, StoreError> {
        let conn = self.conn();
        let pattern = format!("%{}%", escape_like(query.trim()));

        let mut stmt = conn
            .prepare(&format!(
                "SELECT imdb_id, title, year, poster_url FROM {}
                 WHERE title LIKE ?1 ESCAPE '\\'
                 ORDER BY year IS NULL, year DESC, title
                 LIMIT ?2",
                table.table_name()
            ))
            .map_err(db_err)?;

        let rows = stmt
            .query_map(params![pattern, limit], |row| {
                Ok(MovieSummary {
                    imdb_id: row.get(0)?,
                    title: row.get(1)?,
                    year: row.get(2)?,
                    poster_url: row.get(3)?,
                    table,
                })
            })
            .map_err(db_err)?;

        let mut hits = Vec::new();
        for row in rows {
            hits.push(row.map_err(db_err)?);
        }
        Ok(hits)
    }
}

#[async_trait]
impl MovieStore for SqliteMovieStore {
    async fn exists(&self, table: MovieTable, imdb_id: &str) -> Result<bool, StoreError> {
        self.exists_sync(table, imdb_id)
    }

    async fn get(
        &self,
        table: MovieTable,
        imdb_id: &str,
    ) -> Result<Option<MovieRecord>, StoreError> {
        self.get_sync(table, imdb_id)
    }

    async fn insert(&self, table: MovieTable, record: &MovieRecord) -> Result<(), StoreError> {
        self.insert_sync(table, record)
    }

    async fn apply_enrichment(
        &self,
        table: MovieTable,
        imdb_id: &str,
        enrichment: &MovieEnrichment,
    ) -> Result<bool, StoreError> {
        self.apply_enrichment_sync(table, imdb_id, enrichment)
    }

    async fn update_torrents(
        &self,
        table: MovieTable,
        imdb_id: &str,
        torrents: &[Torrent],
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        self.update_torrents_sync(table, imdb_id, torrents, updated_at)
    }

    async fn search(
        &self,
        table: MovieTable,
        query: &str,
        limit: u32,
    ) -> Result<Vec<MovieSummary>, StoreError> {
        self.search_sync(table, query, limit)
    }
}

fn db_err(e: rusqlite::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn from_json_column<T: DeserializeOwned>(
    row: &rusqlite::Row,
    idx: usize,
) -> rusqlite::Result<Option<T>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        serde_json::from_str(&s).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
    })
    .transpose()
}

fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Ratings;
    use crate::testing::fixtures;
    use tokio_test::{assert_err, assert_ok};

    fn store() -> SqliteMovieStore {
        SqliteMovieStore::in_memory().unwrap()
    }

    #[tokio::test]
    async fn test_insert_get_roundtrip() {
        let store = store();
        let mut record = fixtures::movie_record("tt0133093", "The Matrix", Some(1999));
        record.ratings = Some(Ratings {
            imdb: Some(8.7),
            ..Default::default()
        });
        record.torrents = vec![fixtures::torrent("HASH1", "1080p")];

        store.insert(MovieTable::Mini, &record).await.unwrap();

        let loaded = store.get(MovieTable::Mini, "tt0133093").await.unwrap().unwrap();
        assert_eq!(loaded.title, "The Matrix");
        assert_eq!(loaded.torrents, record.torrents);
        assert_eq!(loaded.ratings, record.ratings);
        assert_eq!(loaded.genres, record.genres);
        assert!(store.exists(MovieTable::Mini, "tt0133093").await.unwrap());
        assert!(!store.exists(MovieTable::Full, "tt0133093").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_insert_conflicts() {
        let store = store();
        let record = fixtures::movie_record("tt1", "One", None);
        assert_ok!(store.insert(MovieTable::Mini, &record).await);

        let err = assert_err!(store.insert(MovieTable::Mini, &record).await);
        assert!(matches!(err, StoreError::Conflict(id) if id == "tt1"));
    }

    #[tokio::test]
    async fn test_apply_enrichment_touches_only_enrichable_fields() {
        let store = store();
        let mut record = fixtures::movie_record("tt1", "Original Title", Some(2001));
        record.genres = vec!["Drama".to_string()];
        record.cast = vec!["Someone".to_string()];
        store.insert(MovieTable::Mini, &record).await.unwrap();

        let enrichment = MovieEnrichment {
            poster_url: Some("https://img/new.jpg".to_string()),
            plot: Some("New plot".to_string()),
            runtime: Some(101),
            ratings: Some(Ratings {
                imdb: Some(6.5),
                ..Default::default()
            }),
            torrents: vec![fixtures::torrent("H", "720p")],
            source: Some("yts".to_string()),
            updated_at: Utc::now(),
        };
        assert!(store
            .apply_enrichment(MovieTable::Mini, "tt1", &enrichment)
            .await
            .unwrap());

        let loaded = store.get(MovieTable::Mini, "tt1").await.unwrap().unwrap();
        assert_eq!(loaded.title, "Original Title");
        assert_eq!(loaded.year, Some(2001));
        assert_eq!(loaded.genres, vec!["Drama".to_string()]);
        assert_eq!(loaded.cast, vec!["Someone".to_string()]);
        assert_eq!(loaded.plot.as_deref(), Some("New plot"));
        assert_eq!(loaded.runtime, Some(101));
        assert_eq!(loaded.torrents.len(), 1);
        assert_eq!(loaded.source.as_deref(), Some("yts"));
    }

    #[tokio::test]
    async fn test_sparse_enrichment_keeps_stored_values() {
        let store = store();
        let mut record = fixtures::movie_record("tt2", "Kept", Some(2010));
        record.plot = Some("Stored plot".to_string());
        record.runtime = Some(95);
        record.poster_url = Some("https://img/old.jpg".to_string());
        record.ratings = Some(Ratings {
            imdb: Some(7.7),
            ..Default::default()
        });
        store.insert(MovieTable::Mini, &record).await.unwrap();

        let enrichment = MovieEnrichment {
            poster_url: None,
            plot: None,
            runtime: None,
            ratings: None,
            torrents: vec![fixtures::torrent("NEW", "1080p")],
            source: Some("yts".to_string()),
            updated_at: Utc::now(),
        };
        assert!(store
            .apply_enrichment(MovieTable::Mini, "tt2", &enrichment)
            .await
            .unwrap());

        let loaded = store.get(MovieTable::Mini, "tt2").await.unwrap().unwrap();
        assert_eq!(loaded.plot.as_deref(), Some("Stored plot"));
        assert_eq!(loaded.runtime, Some(95));
        assert_eq!(loaded.poster_url.as_deref(), Some("https://img/old.jpg"));
        assert_eq!(loaded.ratings.and_then(|r| r.imdb), Some(7.7));
        assert_eq!(loaded.torrents[0].hash, "NEW");
        assert_eq!(loaded.source.as_deref(), Some("yts"));
    }

    #[tokio::test]
    async fn test_updates_on_missing_row_report_no_match() {
        let store = store();
        let matched = store
            .update_torrents(MovieTable::Mini, "tt404", &[], Utc::now())
            .await
            .unwrap();
        assert!(!matched);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_escaped() {
        let store = store();
        for (id, title, year) in [
            ("tt1", "The Matrix", Some(1999)),
            ("tt2", "The Matrix Reloaded", Some(2003)),
            ("tt3", "100% Wolf", Some(2020)),
        ] {
            store
                .insert(MovieTable::Full, &fixtures::movie_record(id, title, year))
                .await
                .unwrap();
        }

        let hits = store.search(MovieTable::Full, "matrix", 10).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].imdb_id, "tt2");
        assert_eq!(hits[0].table, MovieTable::Full);

        let hits = store.search(MovieTable::Full, "0%", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].imdb_id, "tt3");

        let hits = store.search(MovieTable::Full, "the", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movies.db");

        {
            let store = SqliteMovieStore::new(&path).unwrap();
            store
                .insert(MovieTable::Mini, &fixtures::movie_record("tt9", "Nine", None))
                .await
                .unwrap();
        }

        let reopened = SqliteMovieStore::new(&path).unwrap();
        assert!(reopened.exists(MovieTable::Mini, "tt9").await.unwrap());
    }
}
