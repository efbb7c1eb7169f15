//! Storage traits and error types
//!
//! This module defines the trait interface for result store backends and
//! associated error types.

use crate::query::QueryPlan;
use crate::record::CrawlResult;
use crate::storage::ResultPage;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for result store implementations
///
/// Writes take `&mut self`; callers sharing a store across tasks wrap it in
/// a mutex.
pub trait ResultStore {
    /// Persists a new crawl result
    ///
    /// The record's own `id` and `created_at` are ignored; the store assigns
    /// both.
    ///
    /// # Returns
    ///
    /// The identity assigned to the stored row
    fn save(&mut self, record: &CrawlResult) -> StorageResult<i64>;

    /// Gets a single result by identity
    fn get_by_id(&self, id: i64) -> StorageResult<Option<CrawlResult>>;

    /// Executes a listing plan
    ///
    /// Returns the requested page of rows and the number of rows matching
    /// the plan's filter, ignoring paging.
    fn list_page(&self, plan: &QueryPlan) -> StorageResult<ResultPage>;

    /// Deletes every result whose id is in `ids`, as one statement
    ///
    /// An empty id set is a no-op. A delete that removes nothing fails with
    /// `StorageError::NotFound`; a partial match is a success.
    ///
    /// # Returns
    ///
    /// The number of rows removed
    fn delete_by_ids(&mut self, ids: &[i64]) -> StorageResult<usize>;
}
