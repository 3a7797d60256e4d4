mod common;

use std::fs;

use catering_core::{
    core::services::{EntityService, OrderService, ServiceError},
    domain::{DailyOrder, Driver, Record},
    errors::StoreError,
    storage::{json_backend::JsonStorage, DocumentStore, StoreExt},
};
use tempfile::tempdir;
use uuid::Uuid;

use common::{date, item, place_order, seed};

#[test]
fn collections_survive_reopening_the_store() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("data");
    let order_id = {
        let store = JsonStorage::new(root.clone(), Some(3)).unwrap();
        let seed = seed(&store);
        place_order(
            &store,
            date(2024, 6, 3),
            &seed.ravi,
            vec![item(&seed.office, &seed.lunch, "5,5+7")],
        )
        .id
    };

    let reopened = JsonStorage::new(root, Some(3)).unwrap();
    let order = OrderService::get(&reopened, order_id).expect("order persisted");
    assert_eq!(order.counts().total, 17);
    assert_eq!(order.amount(), 680.0);
    let drivers = EntityService::list::<Driver>(&reopened).unwrap();
    let names: Vec<_> = drivers.iter().map(|driver| driver.name.as_str()).collect();
    assert_eq!(names, vec!["Meena", "Ravi"]);
}

#[test]
fn collection_files_are_pretty_json_arrays() {
    let store = common::temp_store(3);
    EntityService::add(&store, Driver::new("Ravi")).unwrap();
    let path = store.collection_path(Driver::COLLECTION);
    assert!(path.ends_with("collections/drivers.json"));
    let raw = fs::read_to_string(&path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed.as_array().map(Vec::len), Some(1));
    assert!(raw.contains('\n'));
}

#[test]
fn backups_are_rotated_to_the_retention_limit() {
    let store = common::temp_store(2);
    for name in ["Ravi", "Meena", "Arjun", "Kiran", "Leela"] {
        EntityService::add(&store, Driver::new(name)).unwrap();
    }
    let backups = store.list_backups(Driver::COLLECTION).unwrap();
    assert_eq!(backups.len(), 2);
    // Newest first: the latest backup predates only the final write.
    let latest: Vec<serde_json::Value> =
        serde_json::from_str(&fs::read_to_string(&backups[0]).unwrap()).unwrap();
    assert_eq!(latest.len(), 4);
}

#[test]
fn restoring_a_backup_rolls_the_collection_back() {
    let store = common::temp_store(5);
    EntityService::add(&store, Driver::new("Ravi")).unwrap();
    EntityService::add(&store, Driver::new("Meena")).unwrap();
    let backups = store.list_backups(Driver::COLLECTION).unwrap();
    assert_eq!(backups.len(), 1);

    let restored = store.restore_backup(Driver::COLLECTION, &backups[0]).unwrap();
    assert_eq!(restored.len(), 1);
    let drivers = store.all::<Driver>().unwrap();
    assert_eq!(drivers.len(), 1);
    assert_eq!(drivers[0].name, "Ravi");
}

#[test]
fn corrupt_collections_surface_serde_errors() {
    let store = common::temp_store(3);
    let path = store.collection_path(DailyOrder::COLLECTION);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "{ not json").unwrap();
    let err = store.load(DailyOrder::COLLECTION).unwrap_err();
    assert!(matches!(err, StoreError::Serde(_)));
}

#[test]
fn failed_writes_leave_the_collection_untouched() {
    let store = common::temp_store(3);
    let ravi = EntityService::add(&store, Driver::new("Ravi")).unwrap();
    let path = store.collection_path(Driver::COLLECTION);
    let before = fs::read_to_string(&path).unwrap();

    let err = store.insert(&ravi).unwrap_err();
    assert!(matches!(err, StoreError::Duplicate { .. }));
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn removing_missing_records_keeps_files_and_backups() {
    let store = common::temp_store(3);
    let seed = seed(&store);
    for day in 1..=3 {
        place_order(
            &store,
            date(2024, 6, day),
            &seed.ravi,
            vec![item(&seed.office, &seed.lunch, "1")],
        );
    }
    let path = store.collection_path(DailyOrder::COLLECTION);
    let collection = fs::read_to_string(&path).unwrap();
    let backups = store.list_backups(DailyOrder::COLLECTION).unwrap();
    assert_eq!(backups.len(), 2);
    let snapshots: Vec<String> = backups
        .iter()
        .map(|backup| fs::read_to_string(backup).unwrap())
        .collect();

    for _ in 0..3 {
        let err = OrderService::remove(&store, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    assert_eq!(fs::read_to_string(&path).unwrap(), collection);
    let after = store.list_backups(DailyOrder::COLLECTION).unwrap();
    assert_eq!(after, backups);
    let contents: Vec<String> = after
        .iter()
        .map(|backup| fs::read_to_string(backup).unwrap())
        .collect();
    assert_eq!(contents, snapshots);
}
