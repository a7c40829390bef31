//! Unified domain model for user-owned records.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep a single record-centric shape for the note/list/task projections.
//!
//! # Invariants
//! - Every domain object is identified by a stable `RecordId`.
//! - Every record carries the identity of its owner.
//! - Deletion and archiving are soft lifecycle flags, not hard deletes.

pub mod record;
