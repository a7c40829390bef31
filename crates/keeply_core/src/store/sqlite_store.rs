//! SQLite-backed record store.
//!
//! # Responsibility
//! - Implement the `RecordStore` read contract over canonical `records`
//!   storage.
//! - Provide seeding/maintenance writes used by tests and local tooling.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Filter and sort fields are validated against the known column set
//!   before any SQL is assembled.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::identity::UserId;
use crate::model::record::{EntityKind, Record, RecordId};
use crate::store::{
    FilterSet, FilterValue, RecordStore, SortDirection, SortKey, StoreError, StoreResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

const RECORD_SELECT_SQL: &str = "SELECT
    uuid,
    type,
    owner_id,
    title,
    body,
    created_at,
    is_deleted,
    is_archived
FROM records";

const FILTERABLE_FIELDS: &[&str] = &["owner_id", "title", "created_at", "is_deleted", "is_archived"];
const SORTABLE_FIELDS: &[&str] = &["created_at", "title", "uuid"];

/// SQLite-backed record store.
pub struct SqliteRecordStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordStore<'conn> {
    /// Constructs a store from a migrated/ready connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Inserts one record. Used by seeding and local maintenance paths;
    /// the scoped query path never writes.
    pub fn create_record(&self, record: &Record) -> StoreResult<RecordId> {
        if record.owner.is_blank() {
            return Err(StoreError::InvalidData(
                "record owner_id cannot be blank".to_string(),
            ));
        }

        self.conn.execute(
            "INSERT INTO records (
                uuid,
                type,
                owner_id,
                title,
                body,
                created_at,
                is_deleted,
                is_archived
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                record.uuid.to_string(),
                record.kind.label(),
                record.owner.as_str(),
                record.title.as_str(),
                record.body.as_str(),
                record.created_at,
                bool_to_int(record.is_deleted),
                bool_to_int(record.is_archived),
            ],
        )?;

        Ok(record.uuid)
    }

    /// Gets one record by stable ID regardless of lifecycle state.
    pub fn get_record(&self, id: RecordId) -> StoreResult<Option<Record>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RECORD_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query(params![id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_record_row(row)?));
        }

        Ok(None)
    }

    /// Marks one record as softly deleted.
    pub fn soft_delete_record(&self, id: RecordId) -> StoreResult<()> {
        self.set_lifecycle_flag(id, "is_deleted")
    }

    /// Marks one record as archived.
    pub fn archive_record(&self, id: RecordId) -> StoreResult<()> {
        self.set_lifecycle_flag(id, "is_archived")
    }

    fn set_lifecycle_flag(&self, id: RecordId, field: &'static str) -> StoreResult<()> {
        let changed = self.conn.execute(
            &format!("UPDATE records SET {field} = 1 WHERE uuid = ?1;"),
            [id.to_string()],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }

        Ok(())
    }
}

impl RecordStore for SqliteRecordStore<'_> {
    fn filter_records(
        &self,
        kind: EntityKind,
        filters: &FilterSet,
        sort: &SortKey,
    ) -> StoreResult<Option<Vec<Record>>> {
        let mut sql = format!("{RECORD_SELECT_SQL} WHERE type = ?");
        let mut bind_values: Vec<Value> = vec![Value::Text(kind.label().to_string())];

        for (field, value) in filters.iter() {
            if !FILTERABLE_FIELDS.contains(&field) {
                return Err(StoreError::InvalidData(format!(
                    "unknown filter field `{field}`"
                )));
            }
            sql.push_str(&format!(" AND {field} = ?"));
            bind_values.push(filter_value_to_sql(value));
        }

        if !SORTABLE_FIELDS.contains(&sort.field()) {
            return Err(StoreError::InvalidData(format!(
                "unknown sort field `{}`",
                sort.field()
            )));
        }
        let order = match sort.direction() {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        };
        // Secondary uuid order keeps result order stable for equal keys.
        sql.push_str(&format!(" ORDER BY {} {order}, uuid ASC;", sort.field()));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }

        Ok(Some(records))
    }
}

fn parse_record_row(row: &Row<'_>) -> StoreResult<Record> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        StoreError::InvalidData(format!("invalid uuid value `{uuid_text}` in records.uuid"))
    })?;

    let type_text: String = row.get("type")?;
    let kind = parse_entity_kind(&type_text).ok_or_else(|| {
        StoreError::InvalidData(format!("invalid record type `{type_text}` in records.type"))
    })?;

    Ok(Record {
        uuid,
        kind,
        owner: UserId::new(row.get::<_, String>("owner_id")?),
        title: row.get("title")?,
        body: row.get("body")?,
        created_at: row.get("created_at")?,
        is_deleted: parse_flag(row, "is_deleted")?,
        is_archived: parse_flag(row, "is_archived")?,
    })
}

fn parse_flag(row: &Row<'_>, column: &'static str) -> StoreResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(StoreError::InvalidData(format!(
            "invalid {column} value `{other}` in records.{column}"
        ))),
    }
}

fn parse_entity_kind(value: &str) -> Option<EntityKind> {
    match value {
        "note" => Some(EntityKind::Note),
        "list" => Some(EntityKind::List),
        "task" => Some(EntityKind::Task),
        _ => None,
    }
}

fn filter_value_to_sql(value: &FilterValue) -> Value {
    match value {
        FilterValue::Bool(flag) => Value::Integer(bool_to_int(*flag)),
        FilterValue::Integer(number) => Value::Integer(*number),
        FilterValue::Text(text) => Value::Text(text.clone()),
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
