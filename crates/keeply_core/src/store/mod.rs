//! Entity store contracts and filter/sort vocabulary.
//!
//! # Responsibility
//! - Define the read contract every record backend must satisfy.
//! - Define the field-equality filter and sort vocabulary shared by the
//!   scoped query path and concrete stores.
//!
//! # Invariants
//! - Stores are read-only from the scoped query path; maintenance writes
//!   live on concrete implementations only.
//! - A store never silently swallows a transport or query failure; the
//!   fault-safe boundary above it owns that decision.

use crate::model::record::{EntityKind, Record};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod sqlite_store;

pub use sqlite_store::SqliteRecordStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Generic store error for record query operations.
#[derive(Debug)]
pub enum StoreError {
    /// Local persistence failure.
    Db(crate::db::DbError),
    /// Persisted state that cannot be mapped back to a valid record.
    InvalidData(String),
    /// Maintenance target does not exist.
    NotFound(crate::model::record::RecordId),
    /// Remote/transport failure reported by a backend adapter.
    Backend(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::Backend(message) => write!(f, "store backend failure: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
            Self::NotFound(_) => None,
            Self::Backend(_) => None,
        }
    }
}

impl From<crate::db::DbError> for StoreError {
    fn from(value: crate::db::DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(crate::db::DbError::Sqlite(value))
    }
}

/// Required value for one field-equality predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Bool(bool),
    Integer(i64),
    Text(String),
}

/// Deterministic set of field-equality predicates.
///
/// Backed by a `BTreeMap` so predicate order (and therefore generated query
/// shape and log output) is stable across calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    fields: BTreeMap<String, FilterValue>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the default base filters for one entity kind: its lifecycle
    /// flag must be false.
    pub fn active_for(kind: EntityKind) -> Self {
        Self::new().with(kind.lifecycle_field(), FilterValue::Bool(false))
    }

    /// Adds one predicate, replacing any existing predicate on `field`.
    pub fn with(mut self, field: impl Into<String>, value: FilterValue) -> Self {
        self.insert(field, value);
        self
    }

    /// Adds one predicate in place, replacing any existing one on `field`.
    pub fn insert(&mut self, field: impl Into<String>, value: FilterValue) {
        self.fields.insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Option<&FilterValue> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.fields.iter().map(|(field, value)| (field.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Sort direction for one sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Single-field sort specifier.
///
/// Understands the external `"-created_at"` convention: a leading `-` means
/// descending, otherwise ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    field: String,
    direction: SortDirection,
}

impl SortKey {
    /// Descending creation time, the canonical recency order.
    pub fn created_at_desc() -> Self {
        Self {
            field: "created_at".to_string(),
            direction: SortDirection::Descending,
        }
    }

    /// Parses a sort specifier such as `"-created_at"` or `"title"`.
    ///
    /// Returns `None` for an empty or bare-`-` specifier.
    pub fn parse(spec: &str) -> Option<Self> {
        let trimmed = spec.trim();
        let (direction, field) = match trimmed.strip_prefix('-') {
            Some(rest) => (SortDirection::Descending, rest),
            None => (SortDirection::Ascending, trimmed),
        };
        if field.is_empty() {
            return None;
        }
        Some(Self {
            field: field.to_string(),
            direction,
        })
    }

    pub fn field(&self) -> &str {
        self.field.as_str()
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }
}

impl Default for SortKey {
    fn default() -> Self {
        Self::created_at_desc()
    }
}

/// Read contract for record backends.
///
/// `Ok(None)` models a backend that answered with an absent body instead of
/// an empty page; callers above the fault-safe boundary must treat the two
/// identically.
pub trait RecordStore {
    /// Returns records of `kind` matching every predicate in `filters`,
    /// ordered by `sort`.
    fn filter_records(
        &self,
        kind: EntityKind,
        filters: &FilterSet,
        sort: &SortKey,
    ) -> StoreResult<Option<Vec<Record>>>;
}

impl<T: RecordStore + ?Sized> RecordStore for &T {
    fn filter_records(
        &self,
        kind: EntityKind,
        filters: &FilterSet,
        sort: &SortKey,
    ) -> StoreResult<Option<Vec<Record>>> {
        (**self).filter_records(kind, filters, sort)
    }
}
