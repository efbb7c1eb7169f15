//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ResultStore trait.

use crate::query::{QueryPlan, RESULT_COLUMNS};
use crate::record::{CrawlResult, HtmlVersion};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ResultStore, StorageError, StorageResult};
use crate::storage::ResultPage;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        Self::from_connection(conn)
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StorageResult<Self> {
        // Title/URL search is substring containment, not case folding
        conn.execute_batch("PRAGMA case_sensitive_like = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

/// Maps a `crawl_results` row selected with `RESULT_COLUMNS`
fn row_to_result(row: &Row<'_>) -> rusqlite::Result<CrawlResult> {
    let html_version: String = row.get(1)?;
    let heading_counts: Option<String> = row.get(4)?;
    let created_at: Option<String> = row.get(10)?;

    let heading_counts = match heading_counts.as_deref() {
        None | Some("") => BTreeMap::new(),
        Some(json) => serde_json::from_str(json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?,
    };

    Ok(CrawlResult {
        id: Some(row.get(0)?),
        html_version: HtmlVersion::from_label(&html_version).unwrap_or_default(),
        url: row.get(2)?,
        page_title: row.get(3)?,
        heading_counts,
        internal_link_count: row.get(5)?,
        external_link_count: row.get(6)?,
        inaccessible_link_count: row.get(7)?,
        has_login_form: row.get(8)?,
        error: row.get(9)?,
        created_at: created_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc)),
    })
}

impl ResultStore for SqliteStorage {
    fn save(&mut self, record: &CrawlResult) -> StorageResult<i64> {
        let heading_counts = serde_json::to_string(&record.heading_counts)?;
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO crawl_results (
                html_version, url, page_title, heading_counts,
                internal_link_count, external_link_count, inaccessible_link_count,
                has_login_form, error, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;
        stmt.execute(params![
            record.html_version.label(),
            record.url,
            record.page_title,
            heading_counts,
            record.internal_link_count,
            record.external_link_count,
            record.inaccessible_link_count,
            record.has_login_form,
            record.error,
            now,
        ])?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_by_id(&self, id: i64) -> StorageResult<Option<CrawlResult>> {
        let sql = format!("SELECT {} FROM crawl_results WHERE id = ?1", RESULT_COLUMNS);
        let record = self
            .conn
            .query_row(&sql, params![id], row_to_result)
            .optional()?;
        Ok(record)
    }

    fn list_page(&self, plan: &QueryPlan) -> StorageResult<ResultPage> {
        let filter: Vec<Value> = plan
            .search_pattern
            .iter()
            .map(|pattern| Value::Text(pattern.clone()))
            .collect();

        let total_count: i64 = self.conn.query_row(
            &plan.count_sql(),
            params_from_iter(filter.iter()),
            |row| row.get(0),
        )?;

        let mut page_params = filter;
        page_params.push(Value::Integer(plan.limit()));
        page_params.push(Value::Integer(plan.offset()));

        let mut stmt = self.conn.prepare(&plan.select_sql())?;
        let records = stmt
            .query_map(params_from_iter(page_params.iter()), row_to_result)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ResultPage {
            records,
            total_count: total_count as u64,
        })
    }

    fn delete_by_ids(&mut self, ids: &[i64]) -> StorageResult<usize> {
        let ids: BTreeSet<i64> = ids.iter().copied().collect();
        if ids.is_empty() {
            return Ok(0);
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("DELETE FROM crawl_results WHERE id IN ({})", placeholders);

        let deleted = self.conn.execute(&sql, params_from_iter(ids.iter()))?;
        if deleted == 0 {
            return Err(StorageError::NotFound(
                "no records found for batch delete with provided IDs".to_string(),
            ));
        }

        Ok(deleted)
    }
}
