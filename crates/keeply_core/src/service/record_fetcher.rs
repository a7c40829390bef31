//! Owner-scoped record fetching.
//!
//! # Responsibility
//! - Merge the resolved identity into every record read (`query_owned`).
//! - Provide the fault-safe fetch boundary consumed by presentation layers
//!   (`RecordFetcher`).
//!
//! # Invariants
//! - Every returned record belongs to the resolved identity and passes its
//!   kind's lifecycle filter.
//! - `RecordFetcher::fetch_owned` never returns an error and never touches
//!   the store without a resolved identity.
//! - Unauthenticated and failed reads are indistinguishable in the return
//!   value; only the emitted diagnostics differ.

use crate::identity::{IdentityProvider, UserId};
use crate::model::record::{EntityKind, Record};
use crate::store::{FilterSet, FilterValue, RecordStore, SortKey, StoreError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Predicate field carrying the resolved owner identity.
pub const OWNER_FIELD: &str = "owner_id";

/// Scoped query failure.
#[derive(Debug)]
pub enum ScopedQueryError {
    /// Caller passed an unresolved or blank owner identity.
    BlankOwner,
    /// Underlying store failure.
    Store(StoreError),
}

impl Display for ScopedQueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankOwner => write!(f, "owner identity must be resolved and non-empty"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ScopedQueryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::BlankOwner => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for ScopedQueryError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Issues a read restricted to records owned by `owner`.
///
/// Merges `owner_id == owner` into `base_filters` before delegating to the
/// store, so no caller-provided predicate can widen the ownership scope.
/// Store failures surface to the caller unswallowed; the fault-safe boundary
/// above owns their containment.
pub fn query_owned<S: RecordStore>(
    store: &S,
    kind: EntityKind,
    base_filters: &FilterSet,
    owner: &UserId,
    sort: &SortKey,
) -> Result<Option<Vec<Record>>, ScopedQueryError> {
    if owner.is_blank() {
        return Err(ScopedQueryError::BlankOwner);
    }

    let scoped = base_filters
        .clone()
        .with(OWNER_FIELD, FilterValue::Text(owner.as_str().to_string()));

    Ok(store.filter_records(kind, &scoped, sort)?)
}

/// Fault-safe fetch boundary for owner-scoped reads.
///
/// Collapses every failure mode (no identity, resolver failure, store
/// failure, absent result) to an empty sequence so presentation callers can
/// treat "not ready" and "failed" uniformly as "show nothing yet". Callers
/// needing to distinguish those states must get them from their own
/// request-state tracking, not from this return value.
pub struct RecordFetcher<I, S> {
    identity: I,
    store: S,
}

impl<I: IdentityProvider, S: RecordStore> RecordFetcher<I, S> {
    /// Creates a fetcher over explicit identity and store dependencies.
    pub fn new(identity: I, store: S) -> Self {
        Self { identity, store }
    }

    /// Fetches active records of `kind` owned by the current user, newest
    /// first. Never returns an error.
    pub fn fetch_owned(&self, kind: EntityKind) -> Vec<Record> {
        self.fetch_owned_with(kind, FilterSet::active_for(kind), SortKey::created_at_desc())
    }

    /// Fetches the current user's active notes, newest first.
    pub fn fetch_notes(&self) -> Vec<Record> {
        self.fetch_owned(EntityKind::Note)
    }

    /// Fetches the current user's unarchived lists, newest first.
    pub fn fetch_lists(&self) -> Vec<Record> {
        self.fetch_owned(EntityKind::List)
    }

    /// Fetches the current user's active tasks, newest first.
    pub fn fetch_tasks(&self) -> Vec<Record> {
        self.fetch_owned(EntityKind::Task)
    }

    /// Fetches owned records with caller-provided base filters and sort.
    ///
    /// # Contract
    /// - Resolves identity first; without one the store is never consulted.
    /// - An absent store result is normalized to an empty sequence.
    /// - Emits one `fetch_owned` diagnostic event per call.
    pub fn fetch_owned_with(
        &self,
        kind: EntityKind,
        base_filters: FilterSet,
        sort: SortKey,
    ) -> Vec<Record> {
        let owner = match self.identity.resolve_current_user() {
            Ok(Some(user)) => user,
            Ok(None) => {
                info!(
                    "event=fetch_owned module=service kind={} status=unauthenticated",
                    kind.label()
                );
                return Vec::new();
            }
            Err(err) => {
                warn!(
                    "event=fetch_owned module=service kind={} status=unauthenticated error={}",
                    kind.label(),
                    err
                );
                return Vec::new();
            }
        };

        match query_owned(&self.store, kind, &base_filters, &owner, &sort) {
            Ok(Some(records)) => {
                info!(
                    "event=fetch_owned module=service kind={} status=ok count={}",
                    kind.label(),
                    records.len()
                );
                records
            }
            Ok(None) => {
                info!(
                    "event=fetch_owned module=service kind={} status=ok count=0 result=absent",
                    kind.label()
                );
                Vec::new()
            }
            Err(err) => {
                error!(
                    "event=fetch_owned module=service kind={} status=error error={}",
                    kind.label(),
                    err
                );
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{query_owned, RecordFetcher, ScopedQueryError, OWNER_FIELD};
    use crate::identity::{IdentityError, IdentityProvider, IdentityResult, UserId};
    use crate::model::record::{EntityKind, Record};
    use crate::store::{FilterSet, FilterValue, RecordStore, SortKey, StoreError, StoreResult};
    use std::cell::Cell;

    struct FixedIdentity(Option<UserId>);

    impl IdentityProvider for FixedIdentity {
        fn resolve_current_user(&self) -> IdentityResult {
            Ok(self.0.clone())
        }
    }

    struct FailingIdentity;

    impl IdentityProvider for FailingIdentity {
        fn resolve_current_user(&self) -> IdentityResult {
            Err(IdentityError::Provider("session backend down".to_string()))
        }
    }

    /// Records the filters it was called with and counts invocations.
    struct ProbeStore {
        calls: Cell<u32>,
        result: fn() -> StoreResult<Option<Vec<Record>>>,
        last_filters: std::cell::RefCell<Option<FilterSet>>,
    }

    impl ProbeStore {
        fn returning(result: fn() -> StoreResult<Option<Vec<Record>>>) -> Self {
            Self {
                calls: Cell::new(0),
                result,
                last_filters: std::cell::RefCell::new(None),
            }
        }
    }

    impl RecordStore for ProbeStore {
        fn filter_records(
            &self,
            _kind: EntityKind,
            filters: &FilterSet,
            _sort: &SortKey,
        ) -> StoreResult<Option<Vec<Record>>> {
            self.calls.set(self.calls.get() + 1);
            *self.last_filters.borrow_mut() = Some(filters.clone());
            (self.result)()
        }
    }

    fn sample_record(owner: &str) -> Record {
        Record::new(EntityKind::Note, UserId::new(owner), "t", "b", 1_000)
    }

    #[test]
    fn query_owned_merges_owner_predicate() {
        let store = ProbeStore::returning(|| Ok(Some(Vec::new())));
        let base = FilterSet::active_for(EntityKind::Note);

        query_owned(
            &store,
            EntityKind::Note,
            &base,
            &UserId::new("u1"),
            &SortKey::created_at_desc(),
        )
        .unwrap();

        let seen = store.last_filters.borrow().clone().unwrap();
        assert_eq!(
            seen.get(OWNER_FIELD),
            Some(&FilterValue::Text("u1".to_string()))
        );
        assert_eq!(seen.get("is_deleted"), Some(&FilterValue::Bool(false)));
    }

    #[test]
    fn query_owned_rejects_blank_owner_without_store_call() {
        let store = ProbeStore::returning(|| Ok(Some(Vec::new())));

        let err = query_owned(
            &store,
            EntityKind::Task,
            &FilterSet::active_for(EntityKind::Task),
            &UserId::new("  "),
            &SortKey::created_at_desc(),
        )
        .unwrap_err();

        assert!(matches!(err, ScopedQueryError::BlankOwner));
        assert_eq!(store.calls.get(), 0);
    }

    #[test]
    fn unauthenticated_fetch_returns_empty_and_skips_store() {
        let store = ProbeStore::returning(|| Ok(Some(vec![sample_record("u1")])));
        let fetcher = RecordFetcher::new(FixedIdentity(None), &store);

        assert!(fetcher.fetch_notes().is_empty());
        assert_eq!(store.calls.get(), 0);
    }

    #[test]
    fn identity_failure_is_collapsed_to_empty() {
        let store = ProbeStore::returning(|| Ok(Some(vec![sample_record("u1")])));
        let fetcher = RecordFetcher::new(FailingIdentity, &store);

        assert!(fetcher.fetch_tasks().is_empty());
        assert_eq!(store.calls.get(), 0);
    }

    #[test]
    fn store_failure_is_collapsed_to_empty() {
        let store =
            ProbeStore::returning(|| Err(StoreError::Backend("connection reset".to_string())));
        let fetcher = RecordFetcher::new(FixedIdentity(Some(UserId::new("u1"))), &store);

        assert!(fetcher.fetch_notes().is_empty());
        assert_eq!(store.calls.get(), 1);
    }

    #[test]
    fn absent_store_result_normalizes_to_empty() {
        let store = ProbeStore::returning(|| Ok(None));
        let fetcher = RecordFetcher::new(FixedIdentity(Some(UserId::new("u1"))), &store);

        assert!(fetcher.fetch_lists().is_empty());
        assert_eq!(store.calls.get(), 1);
    }

    #[test]
    fn successful_fetch_passes_records_through() {
        let store = ProbeStore::returning(|| Ok(Some(vec![sample_record("u1")])));
        let fetcher = RecordFetcher::new(FixedIdentity(Some(UserId::new("u1"))), &store);

        let records = fetcher.fetch_notes();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].owner, UserId::new("u1"));
    }
}
