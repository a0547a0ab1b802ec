//! In-memory sorting, filtering and paging by field name.
//!
//! Field names come straight from request parameters, so lookups are
//! case-insensitive and ignore underscores: `IsActive`, `isactive` and
//! `is_active` all name the same field. Unknown fields and unparsable values
//! are skipped rather than reported.
//!
//! - `field`: typed accessors and the per-entity [`FieldMap`]
//! - `sort`: [`apply_sort`]
//! - `filter`: [`apply_filter`] for `field:value;field:value` expressions
//! - `page`: [`PageRequest`] and [`paginate`]

pub mod field;
pub mod filter;
pub mod page;
pub mod sort;

pub use field::{Accessor, FieldKind, FieldMap, QueryFields};
pub use filter::apply_filter;
pub use page::{MAX_PAGE_SIZE, Page, PageRequest, paginate};
pub use sort::{SortDirection, apply_sort};

#[cfg(test)]
mod tests;
