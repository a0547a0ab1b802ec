use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::field::{Accessor, QueryFields};

/// One parsed `field:value` clause.
enum Predicate<M> {
    Contains(fn(&M) -> Option<&str>, String),
    Bool(fn(&M) -> Option<bool>, bool),
    I64(fn(&M) -> Option<i64>, i64),
    Decimal(fn(&M) -> Option<Decimal>, Decimal),
    Uuid(fn(&M) -> Option<Uuid>, Uuid),
    DateTime(fn(&M) -> Option<DateTime<Utc>>, DateTime<Utc>),
}

impl<M> Predicate<M> {
    fn parse(accessor: Accessor<M>, raw: &str) -> Option<Self> {
        let predicate = match accessor {
            Accessor::String(get) => Predicate::Contains(get, raw.to_lowercase()),
            Accessor::Bool(get) => Predicate::Bool(get, parse_bool(raw)?),
            Accessor::I64(get) => Predicate::I64(get, raw.parse().ok()?),
            Accessor::Decimal(get) => Predicate::Decimal(get, Decimal::from_str(raw).ok()?),
            Accessor::Uuid(get) => Predicate::Uuid(get, Uuid::parse_str(raw).ok()?),
            Accessor::DateTimeUtc(get) => Predicate::DateTime(get, parse_datetime(raw)?),
        };
        Some(predicate)
    }

    fn matches(&self, item: &M) -> bool {
        match self {
            Predicate::Contains(get, needle) => {
                get(item).is_some_and(|value| value.to_lowercase().contains(needle.as_str()))
            }
            Predicate::Bool(get, want) => get(item) == Some(*want),
            Predicate::I64(get, want) => get(item) == Some(*want),
            Predicate::Decimal(get, want) => get(item) == Some(*want),
            Predicate::Uuid(get, want) => get(item) == Some(*want),
            Predicate::DateTime(get, want) => get(item) == Some(*want),
        }
    }
}

/// Keeps the items matching every clause of `expression`.
///
/// The expression is a `;`-separated list of `field:value` clauses. Only the
/// first `:` splits a clause, so values may contain colons. String fields match
/// by case-insensitive substring; other kinds by equality after parsing.
/// Clauses with no `:`, an unknown field or an unparsable value are skipped.
#[must_use]
pub fn apply_filter<M: QueryFields>(items: Vec<M>, expression: Option<&str>) -> Vec<M> {
    let predicates = parse_expression::<M>(expression.unwrap_or_default());
    if predicates.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|item| predicates.iter().all(|p| p.matches(item)))
        .collect()
}

fn parse_expression<M: QueryFields>(expression: &str) -> Vec<Predicate<M>> {
    let fields = M::fields();
    expression
        .split(';')
        .map(str::trim)
        .filter(|clause| !clause.is_empty())
        .filter_map(|clause| {
            let Some((field, value)) = clause.split_once(':') else {
                tracing::debug!(clause, "ignoring filter clause without ':'");
                return None;
            };
            let (field, value) = (field.trim(), value.trim());
            let Some(accessor) = fields.get(field) else {
                tracing::debug!(field, "ignoring filter on unknown field");
                return None;
            };
            let predicate = Predicate::parse(*accessor, value);
            if predicate.is_none() {
                tracing::debug!(
                    field,
                    value,
                    kind = %accessor.kind(),
                    "ignoring unparsable filter value"
                );
            }
            predicate
        })
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` and bare
/// dates. Values without an offset are taken as UTC.
fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn bools_parse_case_insensitively() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("False"), Some(false));
        assert_eq!(parse_bool("yes"), None);
    }

    #[test]
    fn datetimes_accept_common_shapes() {
        let midnight = parse_datetime("2024-03-01").unwrap();
        assert_eq!(midnight.to_rfc3339(), "2024-03-01T00:00:00+00:00");

        let spaced = parse_datetime("2024-03-01 12:30:00").unwrap();
        let iso = parse_datetime("2024-03-01T12:30:00").unwrap();
        let offset = parse_datetime("2024-03-01T14:30:00+02:00").unwrap();
        assert_eq!(spaced, iso);
        assert_eq!(iso, offset);

        assert!(parse_datetime("yesterday").is_none());
    }
}
