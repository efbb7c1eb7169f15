//! Query construction for listing stored crawl results
//!
//! This module turns untrusted paging, search and sort input into a
//! parameterized `QueryPlan`. Only the filter text is ever bound as a
//! parameter; column names come exclusively from the `SortKey` allow-list.

mod plan;
mod sort;

pub use plan::{build_list_plan, QueryPlan, DEFAULT_PAGE, DEFAULT_PAGE_SIZE, RESULT_COLUMNS};
pub use sort::{parse_sort_spec, SortKey, SortTerm};

use crate::storage::{ResultPage, ResultStore, StorageError};
use crate::ProbeError;
use std::sync::Mutex;

/// Runs a listing plan against a shared store
///
/// Build the plan with `build_list_plan`; its `page` and `page_size` are the
/// normalized values the returned page corresponds to.
pub fn list_results<S: ResultStore>(
    store: &Mutex<S>,
    plan: &QueryPlan,
) -> Result<ResultPage, ProbeError> {
    tracing::debug!(
        page = plan.page,
        page_size = plan.page_size,
        filtered = plan.search_pattern.is_some(),
        sort_terms = plan.order_by.len(),
        "Listing crawl results"
    );

    let store = store
        .lock()
        .map_err(|_| StorageError::Database("result store lock poisoned".to_string()))?;
    let result_page = store.list_page(plan)?;

    tracing::debug!(
        returned = result_page.records.len(),
        total_count = result_page.total_count,
        "Listed crawl results"
    );
    Ok(result_page)
}
