//! Storage module for persisting crawl results
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Saving crawl results and assigning their identity
//! - Executing listing plans (page of rows + total count)
//! - Batch deletion by id

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{ResultStore, StorageError, StorageResult};

use crate::record::CrawlResult;
use crate::ProbeError;
use serde::Serialize;
use std::path::Path;
use std::sync::Mutex;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(ProbeError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> Result<SqliteStorage, ProbeError> {
    Ok(SqliteStorage::new(path)?)
}

/// One page of stored results plus the size of the whole filtered set
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultPage {
    #[serde(rename = "list")]
    pub records: Vec<CrawlResult>,

    pub total_count: u64,
}

/// Deletes the given results in one statement
///
/// Duplicate ids are ignored and an empty id list is a no-op. Fails with
/// `StorageError::NotFound` when none of the ids exist.
pub fn delete_results<S: ResultStore>(
    store: &Mutex<S>,
    ids: &[i64],
) -> Result<usize, ProbeError> {
    let mut store = store
        .lock()
        .map_err(|_| StorageError::Database("result store lock poisoned".to_string()))?;

    match store.delete_by_ids(ids) {
        Ok(deleted) => {
            tracing::info!(requested = ids.len(), deleted, "Deleted crawl results");
            Ok(deleted)
        }
        Err(e) => {
            tracing::warn!(requested = ids.len(), error = %e, "Batch delete failed");
            Err(e.into())
        }
    }
}

/// Gets a single stored result
pub fn find_result<S: ResultStore>(
    store: &Mutex<S>,
    id: i64,
) -> Result<Option<CrawlResult>, ProbeError> {
    let store = store
        .lock()
        .map_err(|_| StorageError::Database("result store lock poisoned".to_string()))?;
    Ok(store.get_by_id(id)?)
}
