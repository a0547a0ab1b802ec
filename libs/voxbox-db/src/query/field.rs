use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Logical type of a queryable field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Bool,
    I64,
    Decimal,
    Uuid,
    DateTimeUtc,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::String => write!(f, "String"),
            FieldKind::Bool => write!(f, "Bool"),
            FieldKind::I64 => write!(f, "I64"),
            FieldKind::Decimal => write!(f, "Decimal"),
            FieldKind::Uuid => write!(f, "Uuid"),
            FieldKind::DateTimeUtc => write!(f, "DateTimeUtc"),
        }
    }
}

/// Typed read access to one field of `M`. `None` stands for a null value.
pub enum Accessor<M> {
    String(fn(&M) -> Option<&str>),
    Bool(fn(&M) -> Option<bool>),
    I64(fn(&M) -> Option<i64>),
    Decimal(fn(&M) -> Option<Decimal>),
    Uuid(fn(&M) -> Option<Uuid>),
    DateTimeUtc(fn(&M) -> Option<DateTime<Utc>>),
}

impl<M> Clone for Accessor<M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for Accessor<M> {}

impl<M> fmt::Debug for Accessor<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Accessor({})", self.kind())
    }
}

impl<M> Accessor<M> {
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        match self {
            Accessor::String(_) => FieldKind::String,
            Accessor::Bool(_) => FieldKind::Bool,
            Accessor::I64(_) => FieldKind::I64,
            Accessor::Decimal(_) => FieldKind::Decimal,
            Accessor::Uuid(_) => FieldKind::Uuid,
            Accessor::DateTimeUtc(_) => FieldKind::DateTimeUtc,
        }
    }

    /// Orders `a` and `b` by this field, nulls first.
    #[must_use]
    pub fn compare(&self, a: &M, b: &M) -> Ordering {
        match self {
            Accessor::String(get) => get(a).cmp(&get(b)),
            Accessor::Bool(get) => get(a).cmp(&get(b)),
            Accessor::I64(get) => get(a).cmp(&get(b)),
            Accessor::Decimal(get) => get(a).cmp(&get(b)),
            Accessor::Uuid(get) => get(a).cmp(&get(b)),
            Accessor::DateTimeUtc(get) => get(a).cmp(&get(b)),
        }
    }
}

/// Registry of the fields of `M` that may be sorted and filtered on.
pub struct FieldMap<M> {
    map: HashMap<String, Accessor<M>>,
}

impl<M> Default for FieldMap<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> fmt::Debug for FieldMap<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.map.iter()).finish()
    }
}

impl<M> FieldMap<M> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    #[must_use]
    pub fn insert(mut self, name: &str, accessor: Accessor<M>) -> Self {
        self.map.insert(normalize(name), accessor);
        self
    }

    #[must_use]
    pub fn string(self, name: &str, get: fn(&M) -> Option<&str>) -> Self {
        self.insert(name, Accessor::String(get))
    }

    #[must_use]
    pub fn bool(self, name: &str, get: fn(&M) -> Option<bool>) -> Self {
        self.insert(name, Accessor::Bool(get))
    }

    #[must_use]
    pub fn i64(self, name: &str, get: fn(&M) -> Option<i64>) -> Self {
        self.insert(name, Accessor::I64(get))
    }

    #[must_use]
    pub fn decimal(self, name: &str, get: fn(&M) -> Option<Decimal>) -> Self {
        self.insert(name, Accessor::Decimal(get))
    }

    #[must_use]
    pub fn uuid(self, name: &str, get: fn(&M) -> Option<Uuid>) -> Self {
        self.insert(name, Accessor::Uuid(get))
    }

    #[must_use]
    pub fn datetime(self, name: &str, get: fn(&M) -> Option<DateTime<Utc>>) -> Self {
        self.insert(name, Accessor::DateTimeUtc(get))
    }

    /// Case-insensitive lookup that also ignores underscores.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Accessor<M>> {
        self.map.get(&normalize(name))
    }

    #[must_use]
    pub fn kind(&self, name: &str) -> Option<FieldKind> {
        self.get(name).map(Accessor::kind)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

fn normalize(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Types that expose a [`FieldMap`] for dynamic queries.
///
/// ```ignore
/// impl QueryFields for tenant::Model {
///     fn fields() -> &'static FieldMap<Self> {
///         static FIELDS: LazyLock<FieldMap<tenant::Model>> = LazyLock::new(|| {
///             FieldMap::new()
///                 .string("name", |m| Some(m.name.as_str()))
///                 .bool("is_active", |m| Some(m.is_active))
///         });
///         &FIELDS
///     }
/// }
/// ```
pub trait QueryFields: Sized + 'static {
    fn fields() -> &'static FieldMap<Self>;
}
