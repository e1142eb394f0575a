//! Page envelope returned by paged queries.

use serde::{Deserialize, Serialize};

use super::sorting::SortOrder;

/// One page of results plus the totals needed to render a pager.
///
/// `number` is zero-based and derived from the window offset, so offset-driven
/// paging reports `offset / size`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// The records on this page, in query order.
    pub data: Vec<T>,
    /// Number of records matching the criteria across all pages.
    pub total_elements: u64,
    /// Number of pages at the current size.
    pub total_pages: u64,
    /// Requested page size.
    pub size: u64,
    /// Zero-based page index.
    pub number: u64,
    /// Number of records on this page.
    pub number_of_elements: u64,
    /// Sort applied to the query.
    pub sort: Vec<SortOrder>,
    /// Whether a further page exists.
    pub has_next: bool,
    /// Whether an earlier page exists.
    pub has_previous: bool,
}

impl<T> Page<T> {
    /// Build a page from a window (`offset`, `size`) and the total match count.
    pub fn new(data: Vec<T>, offset: u64, size: u64, total_elements: u64, sort: Vec<SortOrder>) -> Self {
        let size = size.max(1);
        let number = offset / size;
        let total_pages = total_elements.div_ceil(size);
        Self {
            number_of_elements: data.len() as u64,
            data,
            total_elements,
            total_pages,
            size,
            number,
            sort,
            has_next: number + 1 < total_pages,
            has_previous: number > 0,
        }
    }

    /// Transform the records while keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            size: self.size,
            number: self.number,
            number_of_elements: self.number_of_elements,
            sort: self.sort,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}
