use keeply_core::db::open_db_in_memory;
use keeply_core::{
    EntityKind, FilterSet, FilterValue, Record, RecordStore, SortKey, SqliteRecordStore,
    StoreError, UserId,
};
use uuid::Uuid;

fn record(kind: EntityKind, owner: &str, title: &str, created_at: i64) -> Record {
    Record::new(kind, UserId::new(owner), title, "body", created_at)
}

#[test]
fn filter_constrains_kind_owner_and_lifecycle() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    let kept = record(EntityKind::Note, "u1", "kept", 1_000);
    store.create_record(&kept).unwrap();
    store
        .create_record(&record(EntityKind::Task, "u1", "wrong kind", 1_000))
        .unwrap();
    store
        .create_record(&record(EntityKind::Note, "u2", "wrong owner", 1_000))
        .unwrap();
    let deleted = record(EntityKind::Note, "u1", "deleted", 1_000);
    store.create_record(&deleted).unwrap();
    store.soft_delete_record(deleted.uuid).unwrap();

    let filters = FilterSet::active_for(EntityKind::Note)
        .with("owner_id", FilterValue::Text("u1".to_string()));
    let found = store
        .filter_records(EntityKind::Note, &filters, &SortKey::created_at_desc())
        .unwrap()
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].uuid, kept.uuid);
}

#[test]
fn ascending_sort_specifier_is_honored() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    let late = record(EntityKind::Task, "u1", "late", 2_000);
    let early = record(EntityKind::Task, "u1", "early", 1_000);
    store.create_record(&late).unwrap();
    store.create_record(&early).unwrap();

    let ascending = SortKey::parse("created_at").unwrap();
    let found = store
        .filter_records(EntityKind::Task, &FilterSet::new(), &ascending)
        .unwrap()
        .unwrap();

    let ids: Vec<Uuid> = found.iter().map(|r| r.uuid).collect();
    assert_eq!(ids, vec![early.uuid, late.uuid]);
}

#[test]
fn unknown_filter_field_is_rejected_before_any_query() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    let filters = FilterSet::new().with("nonexistent", FilterValue::Bool(true));
    let err = store
        .filter_records(EntityKind::Note, &filters, &SortKey::created_at_desc())
        .unwrap_err();

    assert!(matches!(err, StoreError::InvalidData(_)));
}

#[test]
fn unknown_sort_field_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    let sort = SortKey::parse("-rowid").unwrap();
    let err = store
        .filter_records(EntityKind::Note, &FilterSet::new(), &sort)
        .unwrap_err();

    assert!(matches!(err, StoreError::InvalidData(_)));
}

#[test]
fn lifecycle_maintenance_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    let list = record(EntityKind::List, "u1", "to archive", 1_000);
    store.create_record(&list).unwrap();
    store.archive_record(list.uuid).unwrap();

    let loaded = store.get_record(list.uuid).unwrap().unwrap();
    assert!(loaded.is_archived);
    assert!(!loaded.is_deleted);
    assert!(!loaded.is_active());
}

#[test]
fn maintenance_on_missing_record_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    let missing = Uuid::new_v4();
    let err = store.soft_delete_record(missing).unwrap_err();
    match err {
        StoreError::NotFound(id) => assert_eq!(id, missing),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn create_rejects_blank_owner() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    let err = store
        .create_record(&record(EntityKind::Note, "  ", "ownerless", 1_000))
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(_)));
}

#[test]
fn record_serializes_with_external_schema_naming() {
    let note = record(EntityKind::Note, "u1", "titled", 1_000);
    let value = serde_json::to_value(&note).unwrap();

    assert_eq!(value["type"], "note");
    assert_eq!(value["owner"], "u1");
    assert_eq!(value["is_deleted"], false);
    assert_eq!(value["is_archived"], false);
}
