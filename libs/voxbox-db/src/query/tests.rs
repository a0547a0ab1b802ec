#![cfg_attr(coverage_nightly, coverage(off))]
#![allow(clippy::unwrap_used)]

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::*;

#[derive(Debug, Clone, PartialEq)]
struct Org {
    id: Uuid,
    name: String,
    is_active: bool,
    seats: i64,
    weight: Option<Decimal>,
    created_at: DateTime<Utc>,
}

impl QueryFields for Org {
    fn fields() -> &'static FieldMap<Self> {
        static FIELDS: LazyLock<FieldMap<Org>> = LazyLock::new(|| {
            FieldMap::<Org>::new()
                .uuid("id", |m| Some(m.id))
                .string("name", |m| Some(m.name.as_str()))
                .bool("is_active", |m| Some(m.is_active))
                .i64("seats", |m| Some(m.seats))
                .decimal("weight", |m| m.weight)
                .datetime("created_at", |m| Some(m.created_at))
        });
        &FIELDS
    }
}

fn org(n: u128, name: &str, is_active: bool, seats: i64) -> Org {
    Org {
        id: Uuid::from_u128(n),
        name: name.to_owned(),
        is_active,
        seats,
        weight: None,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

fn sample() -> Vec<Org> {
    vec![
        org(1, "Acme Corp", true, 10),
        org(2, "Beta Acme", false, 5),
        org(3, "Gamma", true, 20),
    ]
}

fn names(items: &[Org]) -> Vec<&str> {
    items.iter().map(|o| o.name.as_str()).collect()
}

#[test]
fn field_lookup_ignores_case_and_underscores() {
    let fields = Org::fields();
    assert_eq!(fields.kind("IsActive"), Some(FieldKind::Bool));
    assert_eq!(fields.kind("is_active"), Some(FieldKind::Bool));
    assert_eq!(fields.kind("ISACTIVE"), Some(FieldKind::Bool));
    assert_eq!(fields.kind("CreatedAt"), Some(FieldKind::DateTimeUtc));
    assert!(fields.get("missing").is_none());
    assert_eq!(fields.len(), 6);
}

#[test]
fn sort_by_name_descending() {
    let sorted = apply_sort(sample(), Some("Name"), SortDirection::Descending);
    assert_eq!(names(&sorted), ["Gamma", "Beta Acme", "Acme Corp"]);
}

#[test]
fn sort_field_name_is_case_insensitive() {
    let sorted = apply_sort(sample(), Some("SEATS"), SortDirection::Ascending);
    assert_eq!(names(&sorted), ["Beta Acme", "Acme Corp", "Gamma"]);
}

#[test]
fn sort_with_unknown_or_blank_field_keeps_order() {
    let unknown = apply_sort(sample(), Some("DoesNotExist"), SortDirection::Descending);
    assert_eq!(unknown, sample());

    let blank = apply_sort(sample(), Some("   "), SortDirection::Descending);
    assert_eq!(blank, sample());

    let none = apply_sort(sample(), None, SortDirection::Descending);
    assert_eq!(none, sample());
}

#[test]
fn sort_is_stable_and_puts_nulls_first() {
    let mut items = sample();
    items[0].weight = Some(Decimal::from(3));
    items[2].weight = Some(Decimal::from(1));
    let sorted = apply_sort(items, Some("weight"), SortDirection::Ascending);
    assert_eq!(names(&sorted), ["Beta Acme", "Gamma", "Acme Corp"]);

    let ties = apply_sort(sample(), Some("created_at"), SortDirection::Descending);
    assert_eq!(ties, sample());
}

#[test]
fn filter_combines_clauses_with_and() {
    let filtered = apply_filter(sample(), Some("IsActive:true;Name:acme"));
    assert_eq!(names(&filtered), ["Acme Corp"]);
}

#[test]
fn filter_tells_same_named_rows_apart_by_flag() {
    let rows = vec![org(1, "Acme Corp", true, 10), org(2, "Acme Corp", false, 10)];
    let filtered = apply_filter(rows, Some("IsActive:true;Name:acme"));
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, Uuid::from_u128(1));
    assert!(filtered[0].is_active);
}

#[test]
fn filter_string_match_is_case_insensitive_contains() {
    let filtered = apply_filter(sample(), Some("name:ACME"));
    assert_eq!(names(&filtered), ["Acme Corp", "Beta Acme"]);
}

#[test]
fn filter_skips_bad_clauses() {
    let unparsable = apply_filter(sample(), Some("IsActive:maybe"));
    assert_eq!(unparsable.len(), 3);

    let unknown_field = apply_filter(sample(), Some("Colour:red;seats:20"));
    assert_eq!(names(&unknown_field), ["Gamma"]);

    let no_colon = apply_filter(sample(), Some("gamma;;  ;"));
    assert_eq!(no_colon.len(), 3);

    assert_eq!(apply_filter(sample(), None).len(), 3);
    assert_eq!(apply_filter(sample(), Some("")).len(), 3);
}

#[test]
fn filter_trims_field_and_value() {
    let filtered = apply_filter(sample(), Some("  seats :  5 "));
    assert_eq!(names(&filtered), ["Beta Acme"]);
}

#[test]
fn filter_splits_on_first_colon_only() {
    let mut items = sample();
    items[1].name = "Time 10:30".to_owned();
    let filtered = apply_filter(items, Some("name:10:30"));
    assert_eq!(names(&filtered), ["Time 10:30"]);
}

#[test]
fn filter_typed_equality() {
    let mut items = sample();
    items[2].weight = Some(Decimal::from_str("1.50").unwrap());
    items[2].created_at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

    let by_decimal = apply_filter(items.clone(), Some("weight:1.5"));
    assert_eq!(names(&by_decimal), ["Gamma"]);

    let by_date = apply_filter(items.clone(), Some("CreatedAt:2024-06-01"));
    assert_eq!(names(&by_date), ["Gamma"]);

    let by_id = apply_filter(items, Some("id:00000000-0000-0000-0000-000000000002"));
    assert_eq!(names(&by_id), ["Beta Acme"]);
}

#[test]
fn null_values_never_match() {
    let filtered = apply_filter(sample(), Some("weight:0"));
    assert!(filtered.is_empty());
}

#[test]
fn paginate_filters_then_sorts_then_slices() {
    let items: Vec<Org> = (1..=25)
        .map(|n| org(n, &format!("org-{n:02}"), n % 2 == 1, i64::try_from(n).unwrap()))
        .collect();
    let req = PageRequest {
        page_number: 2,
        page_size: 5,
        sort_by: Some("seats".to_owned()),
        sort_direction: SortDirection::Descending,
        filter: Some("isactive:true".to_owned()),
    };

    let page = paginate(items, &req);
    assert_eq!(page.total_count, 13);
    assert_eq!(page.total_pages(), 3);
    let seats: Vec<i64> = page.items.iter().map(|o| o.seats).collect();
    assert_eq!(seats, [15, 13, 11, 9, 7]);
}

#[test]
fn page_request_defaults_and_clamping() {
    let req = PageRequest::default();
    assert_eq!((req.page_number, req.page_size), (1, 10));
    assert_eq!(req.skip(), 0);

    let huge = PageRequest {
        page_size: 10_000,
        page_number: 0,
        ..PageRequest::default()
    };
    assert_eq!(huge.take(), MAX_PAGE_SIZE);
    assert_eq!(huge.skip(), 0);
}

#[test]
fn page_request_deserializes_query_shape() {
    let req: PageRequest = serde_json::from_str(
        r#"{"pageNumber":3,"pageSize":20,"sortBy":"Name","sortDirection":"desc","filter":"IsActive:true"}"#,
    )
    .unwrap();
    assert_eq!(req.skip(), 40);
    assert_eq!(req.sort_direction, SortDirection::Descending);
    assert_eq!(req.filter.as_deref(), Some("IsActive:true"));

    let empty: PageRequest = serde_json::from_str("{}").unwrap();
    assert_eq!(empty, PageRequest::default());
}
