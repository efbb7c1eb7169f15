use crate::query::sort::{parse_sort_spec, SortTerm};
use crate::ProbeError;

/// Page used when the caller asks for page < 1
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when the caller asks for a size < 1
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Columns selected for every listed row, in scan order
pub const RESULT_COLUMNS: &str = "id, html_version, url, page_title, heading_counts, \
     internal_link_count, external_link_count, inaccessible_link_count, \
     has_login_form, error, created_at";

/// Ordering used when no sort terms are given: most recent identity first
const DEFAULT_ORDER_BY: &str = " ORDER BY id DESC";

/// A parameterized listing query over `crawl_results`
///
/// The plan renders two statements sharing one filter predicate: the page
/// query (filter, order, limit, offset) and the count query (filter only).
/// Placeholders are numbered; with a filter `?1` is the search pattern and
/// the page query's limit and offset follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    /// 1-based page number
    pub page: i64,

    /// Rows per page
    pub page_size: i64,

    /// LIKE pattern matched against title and URL, already escaped and
    /// wrapped in wildcards
    pub search_pattern: Option<String>,

    /// Explicit ordering; empty means the default order
    pub order_by: Vec<SortTerm>,
}

impl QueryPlan {
    /// Number of rows skipped before the requested page
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    fn where_clause(&self) -> &'static str {
        if self.search_pattern.is_some() {
            " WHERE (page_title LIKE ?1 ESCAPE '\\' OR url LIKE ?1 ESCAPE '\\')"
        } else {
            ""
        }
    }

    fn order_by_clause(&self) -> String {
        if self.order_by.is_empty() {
            return DEFAULT_ORDER_BY.to_string();
        }
        let terms: Vec<String> = self.order_by.iter().map(SortTerm::to_sql).collect();
        format!(" ORDER BY {}", terms.join(", "))
    }

    /// Index of the first placeholder after the filter parameters
    fn first_paging_param(&self) -> usize {
        if self.search_pattern.is_some() {
            2
        } else {
            1
        }
    }

    /// SQL for the requested page of rows
    pub fn select_sql(&self) -> String {
        let limit_param = self.first_paging_param();
        format!(
            "SELECT {} FROM crawl_results{}{} LIMIT ?{} OFFSET ?{}",
            RESULT_COLUMNS,
            self.where_clause(),
            self.order_by_clause(),
            limit_param,
            limit_param + 1
        )
    }

    /// SQL for the total number of rows matching the filter
    pub fn count_sql(&self) -> String {
        format!("SELECT COUNT(*) FROM crawl_results{}", self.where_clause())
    }
}

/// Builds the listing plan for one page of results
///
/// # Arguments
///
/// * `page` - 1-based page number; values < 1 become `DEFAULT_PAGE`
/// * `page_size` - rows per page; values < 1 become `DEFAULT_PAGE_SIZE`.
///   No upper bound is applied here.
/// * `search_text` - case-sensitive substring matched against title or URL;
///   empty means no filter
/// * `sort_spec` - serialized sort spec (see `parse_sort_spec`); `None` or
///   blank means most recent first
///
/// # Errors
///
/// `ProbeError::SortSpecInvalid` if the sort spec cannot be parsed or names
/// an unknown column.
///
/// # Example
///
/// ```
/// use sumi_probe::query::build_list_plan;
///
/// let plan = build_list_plan(0, 0, "", None).unwrap();
/// assert_eq!((plan.page, plan.page_size, plan.offset()), (1, 10, 0));
/// ```
pub fn build_list_plan(
    page: i64,
    page_size: i64,
    search_text: &str,
    sort_spec: Option<&str>,
) -> Result<QueryPlan, ProbeError> {
    let page = if page < 1 { DEFAULT_PAGE } else { page };
    let page_size = if page_size < 1 {
        DEFAULT_PAGE_SIZE
    } else {
        page_size
    };

    let search_pattern = if search_text.is_empty() {
        None
    } else {
        Some(format!("%{}%", escape_like(search_text)))
    };

    let order_by = match sort_spec {
        Some(spec) => parse_sort_spec(spec)?,
        None => Vec::new(),
    };

    Ok(QueryPlan {
        page,
        page_size,
        search_pattern,
        order_by,
    })
}

/// Escapes LIKE metacharacters so the text only matches itself
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
