use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};

use super::filter::{DEVICE_JOINS, DEVICE_SEARCH_COLUMNS, WhereClause};
use super::hierarchy::{self, path_from_row};
use super::lookups::{resolve_model_ref, resolve_ref};
use super::{TicketPolicy, count, exists, is_unique_violation};
use crate::error::{Error, Result};
use crate::store::names::normalize_optional;
use crate::types::*;

const DEVICE_COLUMNS: &str = "
    d.id, d.code, d.device_type_id, d.location_id, d.brand_id, d.model_id, d.os_id,
    d.ram_id, d.storage_id, d.processor_id, d.architecture, d.serial, d.details,
    t.value, br.value, m.value, os.value, ram.value, st.value, p.value,
    b.name, f.name, a.name, r.name, l.details";

fn device_view_from_row(row: &Row<'_>) -> rusqlite::Result<DeviceView> {
    let location = path_from_row(row, 20)?;
    Ok(DeviceView {
        device: Device {
            id: row.get(0)?,
            code: row.get(1)?,
            device_type_id: row.get(2)?,
            location_id: row.get(3)?,
            brand_id: row.get(4)?,
            model_id: row.get(5)?,
            os_id: row.get(6)?,
            ram_id: row.get(7)?,
            storage_id: row.get(8)?,
            processor_id: row.get(9)?,
            architecture: row.get(10)?,
            serial: row.get(11)?,
            details: row.get(12)?,
        },
        device_type: row.get(13)?,
        brand: row.get(14)?,
        model: row.get(15)?,
        os: row.get(16)?,
        ram: row.get(17)?,
        storage: row.get(18)?,
        processor: row.get(19)?,
        location_display: location.to_string(),
        location,
    })
}

fn resolve_location_ref(conn: &Connection, location: &LocationRef) -> Result<i64> {
    match location {
        LocationRef::Id(id) => {
            if exists(conn, "locations", *id)? {
                Ok(*id)
            } else {
                Err(Error::not_found(format!("Location {id} not found")))
            }
        }
        LocationRef::Placement(placement) => {
            Ok(hierarchy::resolve_placement(conn, placement)?.location_id)
        }
        LocationRef::Path(path) => Ok(hierarchy::resolve_path(conn, path)?.location_id),
    }
}

fn resolve_optional(conn: &Connection, kind: LookupKind, lookup: Option<&LookupRef>) -> Result<Option<i64>> {
    lookup.map(|l| resolve_ref(conn, kind, l)).transpose()
}

/// Inserts a new device (`id == None`) or replaces an existing one.
///
/// Location and attribute references are resolved in the caller's
/// transaction, so a rejected device leaves no new lookup or location rows.
pub(super) fn write(conn: &Connection, id: Option<i64>, input: &NewDevice) -> Result<Device> {
    if let Some(id) = id {
        if !exists(conn, "devices", id)? {
            return Err(Error::not_found(format!("Device {id} not found")));
        }
    }

    let device_type = input
        .device_type
        .as_ref()
        .ok_or_else(|| Error::validation("device type is required"))?;
    let location = input
        .location
        .as_ref()
        .ok_or_else(|| Error::validation("location is required"))?;

    let location_id = resolve_location_ref(conn, location)?;
    let device_type_id = resolve_ref(conn, LookupKind::DeviceType, device_type)?;
    let brand_id = resolve_optional(conn, LookupKind::Brand, input.brand.as_ref())?;
    let model_id = input
        .model
        .as_ref()
        .map(|m| resolve_model_ref(conn, brand_id, m))
        .transpose()?;

    let mut device = Device {
        id: 0,
        code: normalize_optional(input.code.as_deref()),
        device_type_id,
        location_id,
        brand_id,
        model_id,
        os_id: resolve_optional(conn, LookupKind::Os, input.os.as_ref())?,
        ram_id: resolve_optional(conn, LookupKind::Ram, input.ram.as_ref())?,
        storage_id: resolve_optional(conn, LookupKind::Storage, input.storage.as_ref())?,
        processor_id: resolve_optional(conn, LookupKind::Processor, input.processor.as_ref())?,
        architecture: normalize_optional(input.architecture.as_deref()),
        serial: normalize_optional(input.serial.as_deref()),
        details: normalize_optional(input.details.as_deref()),
    };

    let result = match id {
        None => conn
            .execute(
                "INSERT INTO devices (code, device_type_id, location_id, brand_id, model_id, os_id,
                                      ram_id, storage_id, processor_id, architecture, serial, details)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    device.code,
                    device.device_type_id,
                    device.location_id,
                    device.brand_id,
                    device.model_id,
                    device.os_id,
                    device.ram_id,
                    device.storage_id,
                    device.processor_id,
                    device.architecture,
                    device.serial,
                    device.details,
                ],
            )
            .map(|_| conn.last_insert_rowid()),
        Some(id) => conn
            .execute(
                "UPDATE devices SET code = ?1, device_type_id = ?2, location_id = ?3, brand_id = ?4,
                        model_id = ?5, os_id = ?6, ram_id = ?7, storage_id = ?8, processor_id = ?9,
                        architecture = ?10, serial = ?11, details = ?12
                 WHERE id = ?13",
                params![
                    device.code,
                    device.device_type_id,
                    device.location_id,
                    device.brand_id,
                    device.model_id,
                    device.os_id,
                    device.ram_id,
                    device.storage_id,
                    device.processor_id,
                    device.architecture,
                    device.serial,
                    device.details,
                    id,
                ],
            )
            .map(|_| id),
    };

    device.id = match result {
        Ok(id) => id,
        Err(e) if is_unique_violation(&e) => {
            return Err(Error::conflict(format!(
                "device code '{}' already exists",
                device.code.as_deref().unwrap_or_default()
            )));
        }
        Err(e) => return Err(Error::from(e)),
    };

    tracing::info!(device_id = device.id, location_id, "saved device");
    Ok(device)
}

pub(super) fn get_view(conn: &Connection, id: i64) -> Result<Option<DeviceView>> {
    conn.query_row(
        &format!("SELECT {DEVICE_COLUMNS} FROM devices d {DEVICE_JOINS} WHERE d.id = ?1"),
        params![id],
        device_view_from_row,
    )
    .optional()
    .map_err(Error::from)
}

pub(super) fn list(conn: &Connection, filter: &DeviceFilter, page: PageRequest) -> Result<Page<DeviceView>> {
    let mut clause = WhereClause::new();
    clause.search(filter.q.as_deref(), DEVICE_SEARCH_COLUMNS);
    clause.attributes(&filter.attributes);
    let where_sql = clause.sql();

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM devices d {DEVICE_JOINS}{where_sql}"),
        params_from_iter(clause.args()),
        |row| row.get(0),
    )?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {DEVICE_COLUMNS} FROM devices d {DEVICE_JOINS}{where_sql}
         ORDER BY d.id DESC LIMIT ? OFFSET ?"
    ))?;
    let rows = stmt.query_map(params_from_iter(clause.paged_args(page)), device_view_from_row)?;
    let items = rows.collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(Page {
        items,
        total,
        page: page.page,
        limit: page.limit,
    })
}

/// Deletes a device. A pending ticket always blocks deletion; closed
/// tickets block it only under `protect_history`, otherwise they go too.
pub(super) fn delete(conn: &Connection, policy: TicketPolicy, id: i64) -> Result<()> {
    if !exists(conn, "devices", id)? {
        return Err(Error::not_found(format!("Device {id} not found")));
    }

    let pending = count(
        conn,
        "SELECT COUNT(*) FROM tickets WHERE device_id = ?1 AND status = 'pending'",
        params![id],
    )?;
    if pending > 0 {
        return Err(Error::conflict(format!(
            "device {id} has history: {pending} pending ticket(s)"
        )));
    }

    let closed = count(conn, "SELECT COUNT(*) FROM tickets WHERE device_id = ?1", params![id])?;
    if closed > 0 && policy.protect_history {
        return Err(Error::conflict(format!(
            "device {id} has history: {closed} closed ticket(s)"
        )));
    }

    conn.execute("DELETE FROM tickets WHERE device_id = ?1", params![id])?;
    conn.execute("DELETE FROM devices WHERE id = ?1", params![id])?;
    tracing::info!(device_id = id, removed_tickets = closed, "deleted device");
    Ok(())
}
