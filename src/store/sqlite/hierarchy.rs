use rusqlite::{Connection, OptionalExtension, Row, params};

use super::{count, exists, find_or_insert, is_unique_violation};
use crate::error::{Error, Result};
use crate::store::names::{normalize_name, normalize_optional};
use crate::types::*;

const LOCATION_VIEW_SELECT: &str = "
    SELECT l.id, l.area_id, l.room_id, l.details, b.id, f.id,
           b.name, f.name, a.name, r.name, l.details
    FROM locations l
    JOIN areas a ON a.id = l.area_id
    JOIN floors f ON f.id = a.floor_id
    JOIN buildings b ON b.id = f.building_id
    LEFT JOIN rooms r ON r.id = l.room_id";

/// Reads building, floor, area, room and location details from five
/// consecutive columns starting at `start`.
pub(super) fn path_from_row(row: &Row<'_>, start: usize) -> rusqlite::Result<LocationPath> {
    Ok(LocationPath {
        building: row.get(start)?,
        floor: row.get(start + 1)?,
        area: row.get(start + 2)?,
        room: row.get(start + 3)?,
        details: row.get(start + 4)?,
    })
}

fn location_view_from_row(row: &Row<'_>) -> rusqlite::Result<LocationView> {
    let path = path_from_row(row, 6)?;
    Ok(LocationView {
        location: Location {
            id: row.get(0)?,
            area_id: row.get(1)?,
            room_id: row.get(2)?,
            details: row.get(3)?,
        },
        building_id: row.get(4)?,
        floor_id: row.get(5)?,
        display: path.to_string(),
        path,
    })
}

fn require(conn: &Connection, kind: HierarchyKind, id: i64) -> Result<()> {
    if exists(conn, kind.table(), id)? {
        Ok(())
    } else {
        Err(Error::not_found(format!("{kind} {id} not found")))
    }
}

/// Fails with `HierarchyMismatch` unless `room_id` belongs to `area_id`.
fn check_room_in_area(conn: &Connection, area_id: i64, room_id: i64) -> Result<()> {
    let owner: Option<i64> = conn
        .query_row(
            "SELECT area_id FROM rooms WHERE id = ?1",
            params![room_id],
            |row| row.get(0),
        )
        .optional()?;

    match owner {
        None => Err(Error::not_found(format!("Room {room_id} not found"))),
        Some(owner) if owner != area_id => Err(Error::HierarchyMismatch(format!(
            "room {room_id} belongs to area {owner}, not area {area_id}"
        ))),
        Some(_) => Ok(()),
    }
}

fn find_or_create_location(
    conn: &Connection,
    area_id: i64,
    room_id: Option<i64>,
    details: Option<&str>,
) -> Result<Resolved> {
    let (location_id, created) = find_or_insert(
        conn,
        "SELECT id FROM locations WHERE area_id = ?1 AND room_id IS ?2 AND details IS ?3",
        "INSERT INTO locations (area_id, room_id, details) VALUES (?1, ?2, ?3)",
        params![area_id, room_id, details],
    )?;
    if created {
        tracing::info!(location_id, area_id, ?room_id, "created location");
    }
    Ok(Resolved {
        location_id,
        created,
    })
}

pub(super) fn resolve_path(conn: &Connection, path: &LocationPath) -> Result<Resolved> {
    let building = normalize_name(&path.building, "building")?;
    let floor = normalize_name(&path.floor, "floor")?;
    let area = normalize_name(&path.area, "area")?;
    let room = normalize_optional(path.room.as_deref());
    let details = normalize_optional(path.details.as_deref());
    if let Some(room) = &room {
        normalize_name(room, "room")?;
    }

    let (building_id, _) = find_or_insert(
        conn,
        "SELECT id FROM buildings WHERE name = ?1",
        "INSERT INTO buildings (name) VALUES (?1)",
        params![building],
    )?;
    let (floor_id, _) = find_or_insert(
        conn,
        "SELECT id FROM floors WHERE building_id = ?1 AND name = ?2",
        "INSERT INTO floors (building_id, name) VALUES (?1, ?2)",
        params![building_id, floor],
    )?;
    let (area_id, _) = find_or_insert(
        conn,
        "SELECT id FROM areas WHERE floor_id = ?1 AND name = ?2",
        "INSERT INTO areas (floor_id, name) VALUES (?1, ?2)",
        params![floor_id, area],
    )?;
    let room_id = match &room {
        Some(room) => Some(
            find_or_insert(
                conn,
                "SELECT id FROM rooms WHERE area_id = ?1 AND name = ?2",
                "INSERT INTO rooms (area_id, name) VALUES (?1, ?2)",
                params![area_id, room],
            )?
            .0,
        ),
        None => None,
    };

    find_or_create_location(conn, area_id, room_id, details.as_deref())
}

pub(super) fn resolve_placement(conn: &Connection, placement: &Placement) -> Result<Resolved> {
    require(conn, HierarchyKind::Area, placement.area_id)?;
    if let Some(room_id) = placement.room_id {
        check_room_in_area(conn, placement.area_id, room_id)?;
    }
    let details = normalize_optional(placement.details.as_deref());
    find_or_create_location(conn, placement.area_id, placement.room_id, details.as_deref())
}

pub(super) fn list_buildings(conn: &Connection) -> Result<Vec<Building>> {
    let mut stmt = conn.prepare("SELECT id, name FROM buildings ORDER BY name")?;
    let rows = stmt.query_map([], |row| {
        Ok(Building {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Error::from)
}

pub(super) fn list_floors(conn: &Connection, building_id: i64) -> Result<Vec<Floor>> {
    require(conn, HierarchyKind::Building, building_id)?;
    let mut stmt =
        conn.prepare("SELECT id, building_id, name FROM floors WHERE building_id = ?1 ORDER BY name")?;
    let rows = stmt.query_map(params![building_id], |row| {
        Ok(Floor {
            id: row.get(0)?,
            building_id: row.get(1)?,
            name: row.get(2)?,
        })
    })?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Error::from)
}

pub(super) fn list_areas(conn: &Connection, floor_id: i64) -> Result<Vec<Area>> {
    require(conn, HierarchyKind::Floor, floor_id)?;
    let mut stmt =
        conn.prepare("SELECT id, floor_id, name FROM areas WHERE floor_id = ?1 ORDER BY name")?;
    let rows = stmt.query_map(params![floor_id], |row| {
        Ok(Area {
            id: row.get(0)?,
            floor_id: row.get(1)?,
            name: row.get(2)?,
        })
    })?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Error::from)
}

pub(super) fn list_rooms(conn: &Connection, area_id: i64) -> Result<Vec<Room>> {
    require(conn, HierarchyKind::Area, area_id)?;
    let mut stmt =
        conn.prepare("SELECT id, area_id, name FROM rooms WHERE area_id = ?1 ORDER BY name")?;
    let rows = stmt.query_map(params![area_id], |row| {
        Ok(Room {
            id: row.get(0)?,
            area_id: row.get(1)?,
            name: row.get(2)?,
        })
    })?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Error::from)
}

pub(super) fn list_locations(conn: &Connection) -> Result<Vec<LocationView>> {
    let mut stmt = conn.prepare(&format!(
        "{LOCATION_VIEW_SELECT} ORDER BY b.name, f.name, a.name, r.name, l.details"
    ))?;
    let rows = stmt.query_map([], location_view_from_row)?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Error::from)
}

pub(super) fn get_location(conn: &Connection, id: i64) -> Result<Option<LocationView>> {
    conn.query_row(
        &format!("{LOCATION_VIEW_SELECT} WHERE l.id = ?1"),
        params![id],
        location_view_from_row,
    )
    .optional()
    .map_err(Error::from)
}

pub(super) fn update_location(conn: &Connection, id: i64, placement: &Placement) -> Result<Location> {
    require(conn, HierarchyKind::Location, id)?;
    require(conn, HierarchyKind::Area, placement.area_id)?;
    if let Some(room_id) = placement.room_id {
        check_room_in_area(conn, placement.area_id, room_id)?;
    }
    let details = normalize_optional(placement.details.as_deref());

    let result = conn.execute(
        "UPDATE locations SET area_id = ?1, room_id = ?2, details = ?3 WHERE id = ?4",
        params![placement.area_id, placement.room_id, details, id],
    );
    match result {
        Ok(_) => {}
        Err(e) if is_unique_violation(&e) => {
            return Err(Error::conflict(
                "another location already has this area, room and details",
            ));
        }
        Err(e) => return Err(Error::from(e)),
    }

    Ok(Location {
        id,
        area_id: placement.area_id,
        room_id: placement.room_id,
        details,
    })
}

pub(super) fn rename(conn: &Connection, kind: HierarchyKind, id: i64, name: &str) -> Result<()> {
    if kind == HierarchyKind::Location {
        return Err(Error::validation(
            "locations have no name; update their placement instead",
        ));
    }
    let name = normalize_name(name, &kind.label().to_lowercase())?;

    let sql = format!("UPDATE {} SET name = ?1 WHERE id = ?2", kind.table());
    match conn.execute(&sql, params![name, id]) {
        Ok(0) => Err(Error::not_found(format!("{kind} {id} not found"))),
        Ok(_) => Ok(()),
        Err(e) if is_unique_violation(&e) => Err(Error::conflict(format!(
            "{kind} '{name}' already exists at this level"
        ))),
        Err(e) => Err(Error::from(e)),
    }
}

/// Names the first kind of row still referencing `kind`/`id`, if any.
fn blocking_dependent(conn: &Connection, kind: HierarchyKind, id: i64) -> Result<Option<String>> {
    let checks: &[(&str, &str)] = match kind {
        HierarchyKind::Building => &[("floor", "SELECT COUNT(*) FROM floors WHERE building_id = ?1")],
        HierarchyKind::Floor => &[("area", "SELECT COUNT(*) FROM areas WHERE floor_id = ?1")],
        HierarchyKind::Area => &[
            ("room", "SELECT COUNT(*) FROM rooms WHERE area_id = ?1"),
            ("location", "SELECT COUNT(*) FROM locations WHERE area_id = ?1"),
        ],
        HierarchyKind::Room => &[("location", "SELECT COUNT(*) FROM locations WHERE room_id = ?1")],
        HierarchyKind::Location => &[("device", "SELECT COUNT(*) FROM devices WHERE location_id = ?1")],
    };

    for (dependent, sql) in checks {
        let n = count(conn, sql, params![id])?;
        if n > 0 {
            return Ok(Some(format!("{n} {dependent}(s)")));
        }
    }
    Ok(None)
}

pub(super) fn delete(conn: &Connection, kind: HierarchyKind, id: i64) -> Result<()> {
    require(conn, kind, id)?;

    if let Some(dependents) = blocking_dependent(conn, kind, id)? {
        return Err(Error::conflict(format!(
            "{kind} {id} is still referenced by {dependents}"
        )));
    }

    conn.execute(
        &format!("DELETE FROM {} WHERE id = ?1", kind.table()),
        params![id],
    )?;
    tracing::info!(kind = kind.label(), id, "deleted hierarchy row");
    Ok(())
}
