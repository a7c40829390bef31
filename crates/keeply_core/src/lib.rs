//! Core domain logic for keeply.
//! This crate owns the user-scoped data access contract: every read of a
//! per-user resource is filtered by an authenticated identity, and failures
//! degrade to empty results at the fetch boundary.

pub mod db;
pub mod identity;
pub mod logging;
pub mod model;
pub mod preview;
pub mod service;
pub mod store;

pub use identity::{IdentityError, IdentityProvider, IdentityResult, SessionIdentityProvider, UserId};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::record::{EntityKind, Record, RecordId};
pub use preview::{default_preview, preview_of, strip_markup, truncate, DEFAULT_PREVIEW_CHARS};
pub use service::record_fetcher::{query_owned, RecordFetcher, ScopedQueryError, OWNER_FIELD};
pub use store::{
    FilterSet, FilterValue, RecordStore, SortDirection, SortKey, SqliteRecordStore, StoreError,
    StoreResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
