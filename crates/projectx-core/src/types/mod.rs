//! Shared value types returned by the query engine.

pub mod pagination;
pub mod sorting;

pub use pagination::Page;
pub use sorting::{SortDirection, SortOrder};
