use serde::{Deserialize, Serialize};

use super::field::QueryFields;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(alias = "asc", alias = "ascending", alias = "ASC")]
    Ascending,
    #[serde(alias = "desc", alias = "descending", alias = "DESC")]
    Descending,
}

/// Sorts `items` by the field named `sort_by`.
///
/// A missing, blank or unknown field leaves the order untouched. The sort is
/// stable and null values come first when ascending.
#[must_use]
pub fn apply_sort<M: QueryFields>(
    mut items: Vec<M>,
    sort_by: Option<&str>,
    direction: SortDirection,
) -> Vec<M> {
    let Some(name) = sort_by.map(str::trim).filter(|s| !s.is_empty()) else {
        return items;
    };
    let Some(accessor) = M::fields().get(name) else {
        tracing::debug!(field = name, "ignoring sort by unknown field");
        return items;
    };
    items.sort_by(|a, b| {
        let ord = accessor.compare(a, b);
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
    items
}
