//! Owned record domain model.
//!
//! # Responsibility
//! - Define the canonical record shared by note/list/task projections.
//! - Provide lifecycle helpers for soft-delete and archive semantics.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another record.
//! - `owner` identifies the authenticated user the record belongs to.
//! - Notes and tasks use `is_deleted` as their lifecycle flag; lists use
//!   `is_archived`.

use crate::identity::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for every owned record.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type RecordId = Uuid;

/// Category of an owned record.
///
/// All three kinds share one canonical storage shape; the kind decides which
/// lifecycle flag excludes a record from default reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Free-form note with markup body.
    Note,
    /// Named list of items, archived rather than deleted.
    List,
    /// Actionable task.
    Task,
}

impl EntityKind {
    /// Canonical lowercase label, matching the persisted `type` column and
    /// diagnostic output.
    pub fn label(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::List => "list",
            Self::Task => "task",
        }
    }

    /// Returns the predicate field that marks this kind as out of scope for
    /// default reads.
    pub fn lifecycle_field(self) -> &'static str {
        match self {
            Self::Note | Self::Task => "is_deleted",
            Self::List => "is_archived",
        }
    }
}

/// Canonical domain record for user-owned note/list/task data.
///
/// This model intentionally keeps one storage shape for all three kinds, so
/// the scoped query path does not fork per projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Stable global ID used for linking and auditing.
    pub uuid: RecordId,
    /// Serialized as `type` to match external schema naming.
    #[serde(rename = "type")]
    pub kind: EntityKind,
    /// Identifier of the authenticated user that owns this record.
    pub owner: UserId,
    /// Short display title.
    pub title: String,
    /// Markup body (or plain text fallback for simple inputs).
    pub body: String,
    /// Creation timestamp in unix epoch milliseconds.
    pub created_at: i64,
    /// Soft delete tombstone; authoritative for notes and tasks.
    pub is_deleted: bool,
    /// Archive flag; authoritative for lists.
    pub is_archived: bool,
}

impl Record {
    /// Creates a new record with a generated stable ID.
    ///
    /// # Invariants
    /// - Both lifecycle flags start as `false`.
    pub fn new(
        kind: EntityKind,
        owner: UserId,
        title: impl Into<String>,
        body: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), kind, owner, title, body, created_at)
    }

    /// Creates a new record with a caller-provided stable ID.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(
        uuid: RecordId,
        kind: EntityKind,
        owner: UserId,
        title: impl Into<String>,
        body: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            uuid,
            kind,
            owner,
            title: title.into(),
            body: body.into(),
            created_at,
            is_deleted: false,
            is_archived: false,
        }
    }

    /// Marks this record as softly deleted (tombstoned).
    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
    }

    /// Marks this record as archived.
    pub fn archive(&mut self) {
        self.is_archived = true;
    }

    /// Clears both lifecycle flags.
    pub fn restore(&mut self) {
        self.is_deleted = false;
        self.is_archived = false;
    }

    /// Returns whether this record is visible to default reads of its kind.
    pub fn is_active(&self) -> bool {
        match self.kind.lifecycle_field() {
            "is_archived" => !self.is_archived,
            _ => !self.is_deleted,
        }
    }
}
