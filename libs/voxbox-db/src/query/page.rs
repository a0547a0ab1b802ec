use serde::{Deserialize, Serialize};

use super::field::QueryFields;
use super::filter::apply_filter;
use super::sort::{SortDirection, apply_sort};

/// Upper bound on `page_size`; larger requests are clamped.
pub const MAX_PAGE_SIZE: usize = 100;
const DEFAULT_PAGE_SIZE: usize = 10;

/// Paging, sorting and filtering parameters of a list request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageRequest {
    /// 1-based.
    pub page_number: usize,
    pub page_size: usize,
    pub sort_by: Option<String>,
    pub sort_direction: SortDirection,
    pub filter: Option<String>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort_by: None,
            sort_direction: SortDirection::Ascending,
            filter: None,
        }
    }
}

impl PageRequest {
    #[must_use]
    pub fn take(&self) -> usize {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    #[must_use]
    pub fn skip(&self) -> usize {
        self.page_number.max(1).saturating_sub(1).saturating_mul(self.take())
    }
}

/// One page of results plus the total count after filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_number: usize,
    pub page_size: usize,
    pub total_count: usize,
}

impl<T> Page<T> {
    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.total_count.div_ceil(self.page_size.max(1))
    }
}

/// Filters, sorts, counts and slices `items`, in that order.
#[must_use]
pub fn paginate<M: QueryFields>(items: Vec<M>, req: &PageRequest) -> Page<M> {
    let filtered = apply_filter(items, req.filter.as_deref());
    let sorted = apply_sort(filtered, req.sort_by.as_deref(), req.sort_direction);
    let total_count = sorted.len();
    let items = sorted.into_iter().skip(req.skip()).take(req.take()).collect();
    Page {
        items,
        page_number: req.page_number.max(1),
        page_size: req.take(),
        total_count,
    }
}
