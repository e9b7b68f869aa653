mod common;

use std::sync::{Arc, Barrier};
use std::thread;

use sart::error::{Error, ErrorKind};
use sart::store::{SqliteStore, Store};
use sart::types::*;

use common::{TestDb, date};

fn soporte() -> LocationPath {
    LocationPath::new("Building 01", "Floor 01", "Area TIC", Some("Soporte Técnico"))
}

#[test]
fn end_to_end_device_lifecycle() {
    let db = TestDb::new();
    let store = db.open();
    let today = date("2024-03-05");

    let resolved = store.resolve_location(&soporte()).unwrap();
    assert!(resolved.created);

    let mut input = NewDevice::new("PC", LocationRef::Id(resolved.location_id));
    input.brand = Some("Dell".into());
    input.serial = Some("CN-0N8176".into());
    let device = store.create_device(&input).unwrap();

    let ticket = store
        .open_ticket(device.id, date("2024-03-01"), Some("no boot"), today)
        .unwrap();

    let err = store.delete_device(device.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let closed = store
        .close_ticket(ticket.id, TicketStatus::Repaired, date("2024-03-05"), None)
        .unwrap();
    assert_eq!(closed.status, TicketStatus::Repaired);

    store.delete_device(device.id).unwrap();
    assert!(store.get_device(device.id).unwrap().is_none());
}

#[test]
fn resolution_is_idempotent() {
    let db = TestDb::new();
    let store = db.open();

    let first = store.resolve_location(&soporte()).unwrap();
    let second = store.resolve_location(&soporte()).unwrap();
    assert_eq!(first.location_id, second.location_id);
    assert!(first.created);
    assert!(!second.created);

    for table in ["buildings", "floors", "areas", "rooms", "locations"] {
        assert_eq!(db.count(table), 1, "{table}");
    }

    // Surrounding whitespace does not create a new chain.
    let padded = LocationPath::new(" Building 01 ", "Floor 01", "Area TIC ", Some("Soporte Técnico"));
    assert_eq!(store.resolve_location(&padded).unwrap().location_id, first.location_id);
}

#[test]
fn hierarchy_mismatch_is_rejected() {
    let db = TestDb::new();
    let store = db.open();

    let tic = store.resolve_location(&soporte()).unwrap();
    let tic = store.get_location(tic.location_id).unwrap().unwrap();
    let archive = store
        .resolve_location(&LocationPath::new("Building 01", "Floor 01", "Archive", None))
        .unwrap();
    let archive = store.get_location(archive.location_id).unwrap().unwrap();
    let locations_before = db.count("locations");

    let err = store
        .resolve_placement(&Placement {
            area_id: archive.location.area_id,
            room_id: tic.location.room_id,
            details: None,
        })
        .unwrap_err();
    assert!(matches!(err, Error::HierarchyMismatch(_)));
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(db.count("locations"), locations_before);
}

#[test]
fn concurrent_resolution_on_shared_store() {
    const THREADS: usize = 8;
    let db = TestDb::new();
    let store = Arc::new(db.open());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                store.resolve_location(&soporte()).unwrap().location_id
            })
        })
        .collect();

    let ids: Vec<i64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(ids.windows(2).all(|w| w[0] == w[1]));
    for table in ["buildings", "floors", "areas", "rooms", "locations"] {
        assert_eq!(db.count(table), 1, "{table}");
    }
}

#[test]
fn concurrent_resolution_across_connections() {
    const THREADS: usize = 6;
    let db = TestDb::new();
    let stores: Vec<SqliteStore> = (0..THREADS).map(|_| db.open()).collect();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = stores
        .into_iter()
        .map(|store| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let path = soporte().with_details("desk 3");
                store.resolve_location(&path).unwrap().location_id
            })
        })
        .collect();

    let ids: Vec<i64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(ids.windows(2).all(|w| w[0] == w[1]));
    for table in ["buildings", "floors", "areas", "rooms", "locations"] {
        assert_eq!(db.count(table), 1, "{table}");
    }
}

#[test]
fn model_must_match_brand() {
    let db = TestDb::new();
    let store = db.open();
    let huawei = store.create_lookup(LookupKind::Brand, "Huawei").unwrap();
    let tp_link = store.create_lookup(LookupKind::Brand, "TP-Link").unwrap();
    let ar157 = store.create_model(huawei.id, "AR 157").unwrap();

    let mut input = NewDevice::new("Modem", LocationRef::Path(soporte()));
    input.brand = Some(LookupRef::Id(tp_link.id));
    input.model = Some(LookupRef::Id(ar157.id));
    let err = store.create_device(&input).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(db.count("devices"), 0);

    input.brand = Some(LookupRef::Id(huawei.id));
    let device = store.create_device(&input).unwrap();
    let view = store.get_device(device.id).unwrap().unwrap();
    assert_eq!(view.model.as_deref(), Some("AR 157"));
    assert_eq!(view.brand.as_deref(), Some("Huawei"));
}

#[test]
fn area_delete_protection() {
    let db = TestDb::new();
    let store = db.open();

    let empty = store
        .resolve_location(&LocationPath::new("Building 02", "Floor 01", "Empty", None))
        .unwrap();
    let empty_area = store.get_location(empty.location_id).unwrap().unwrap().location.area_id;

    // Still referenced by its location.
    let err = store.delete_hierarchy(HierarchyKind::Area, empty_area).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    store
        .delete_hierarchy(HierarchyKind::Location, empty.location_id)
        .unwrap();
    store.delete_hierarchy(HierarchyKind::Area, empty_area).unwrap();

    let tic = store.resolve_location(&soporte()).unwrap();
    let tic_area = store.get_location(tic.location_id).unwrap().unwrap().location.area_id;
    store.delete_hierarchy(HierarchyKind::Location, tic.location_id).unwrap();

    // The room alone still protects the area.
    let err = store.delete_hierarchy(HierarchyKind::Area, tic_area).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(store.list_rooms(tic_area).unwrap().len(), 1);
}

#[test]
fn ticket_date_ordering() {
    let db = TestDb::new();
    let store = db.open();
    let today = date("2024-03-05");
    let device = store
        .create_device(&NewDevice::new("PC", LocationRef::Path(soporte())))
        .unwrap();

    let err = store
        .open_ticket(device.id, date("2024-03-06"), None, today)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let ticket = store
        .open_ticket(device.id, date("2024-03-04"), None, today)
        .unwrap();
    let err = store
        .close_ticket(ticket.id, TicketStatus::Unrepaired, date("2024-03-03"), None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    store
        .close_ticket(ticket.id, TicketStatus::Unrepaired, date("2024-03-04"), None)
        .unwrap();
}

#[test]
fn duplicate_ticket_rejected() {
    let db = TestDb::new();
    let store = db.open();
    let today = date("2024-03-05");
    let device = store
        .create_device(&NewDevice::new("Printer", LocationRef::Path(soporte())))
        .unwrap();

    store
        .open_ticket(device.id, date("2024-03-01"), Some("paper jam"), today)
        .unwrap();
    let err = store
        .open_ticket(device.id, date("2024-03-01"), Some("paper jam"), today)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    store
        .open_ticket(device.id, date("2024-03-01"), Some("toner"), today)
        .unwrap();
    assert_eq!(db.count("tickets"), 2);
}

#[test]
fn concurrent_duplicate_tickets_create_one_row() {
    const THREADS: usize = 6;
    let db = TestDb::new();
    let today = date("2024-03-05");
    let device = db
        .open()
        .create_device(&NewDevice::new("PC", LocationRef::Path(soporte())))
        .unwrap();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let store = db.open();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                store.open_ticket(device.id, today, Some("no boot"), today)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| e.kind() == ErrorKind::Conflict)
    );
    assert_eq!(db.count("tickets"), 1);
}
