mod devices;
mod filter;
mod hierarchy;
mod lookups;
mod periods;
mod tickets;

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{
    Connection, OptionalExtension, Row, ToSql, Transaction, TransactionBehavior, params,
};

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::*;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Ticket rules that differ between deployments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TicketPolicy {
    /// Refuse a new intake while the device still has a pending ticket.
    pub one_pending_per_device: bool,
    /// Refuse to delete a device with any ticket, closed ones included.
    /// When off, closed tickets are removed together with their device.
    pub protect_history: bool,
}

pub struct SqliteStore {
    conn: Mutex<Connection>,
    ticket_policy: TicketPolicy,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        Ok(Self {
            conn: Mutex::new(conn),
            ticket_policy: TicketPolicy::default(),
        })
    }

    #[must_use]
    pub fn with_ticket_policy(mut self, policy: TicketPolicy) -> Self {
        self.ticket_policy = policy;
        self
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Locks the connection for ad hoc reads outside the `Store` operations,
    /// such as row counts when checking that a failed write left no rows.
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn()
    }

    /// Runs `f` inside an IMMEDIATE transaction, committing only on success.
    fn write<T>(&self, f: impl FnOnce(&Transaction<'_>) -> Result<T>) -> Result<T> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }
}

pub(super) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

/// Returns the id selected by `select`, inserting with `insert` when absent.
///
/// Losing an insert race to another connection is treated as "already
/// exists": the winner's row is read back instead of failing.
pub(super) fn find_or_insert(
    conn: &Connection,
    select: &str,
    insert: &str,
    params: &[&dyn ToSql],
) -> Result<(i64, bool)> {
    let existing: Option<i64> = conn.query_row(select, params, |row| row.get(0)).optional()?;
    if let Some(id) = existing {
        return Ok((id, false));
    }

    match conn.execute(insert, params) {
        Ok(_) => Ok((conn.last_insert_rowid(), true)),
        Err(e) if is_unique_violation(&e) => {
            tracing::debug!("lost insert race, re-reading existing row");
            let id = conn.query_row(select, params, |row| row.get(0))?;
            Ok((id, false))
        }
        Err(e) => Err(Error::from(e)),
    }
}

pub(super) fn count(conn: &Connection, sql: &str, params: &[&dyn ToSql]) -> Result<i64> {
    conn.query_row(sql, params, |row| row.get(0))
        .map_err(Error::from)
}

pub(super) fn exists(conn: &Connection, table: &str, id: i64) -> Result<bool> {
    let sql = format!("SELECT COUNT(*) FROM {table} WHERE id = ?1");
    Ok(count(conn, &sql, params![id])? > 0)
}

pub(super) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(idx: usize, s: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(super) fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    parse_date(idx, &row.get::<_, String>(idx)?)
}

pub(super) fn optional_date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    row.get::<_, Option<String>>(idx)?
        .map(|s| parse_date(idx, &s))
        .transpose()
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // Location hierarchy

    fn resolve_location(&self, path: &LocationPath) -> Result<Resolved> {
        self.write(|tx| hierarchy::resolve_path(tx, path))
    }

    fn resolve_placement(&self, placement: &Placement) -> Result<Resolved> {
        self.write(|tx| hierarchy::resolve_placement(tx, placement))
    }

    fn list_buildings(&self) -> Result<Vec<Building>> {
        hierarchy::list_buildings(&self.conn())
    }

    fn list_floors(&self, building_id: i64) -> Result<Vec<Floor>> {
        hierarchy::list_floors(&self.conn(), building_id)
    }

    fn list_areas(&self, floor_id: i64) -> Result<Vec<Area>> {
        hierarchy::list_areas(&self.conn(), floor_id)
    }

    fn list_rooms(&self, area_id: i64) -> Result<Vec<Room>> {
        hierarchy::list_rooms(&self.conn(), area_id)
    }

    fn list_locations(&self) -> Result<Vec<LocationView>> {
        hierarchy::list_locations(&self.conn())
    }

    fn get_location(&self, id: i64) -> Result<Option<LocationView>> {
        hierarchy::get_location(&self.conn(), id)
    }

    fn update_location(&self, id: i64, placement: &Placement) -> Result<Location> {
        self.write(|tx| hierarchy::update_location(tx, id, placement))
    }

    fn rename_hierarchy(&self, kind: HierarchyKind, id: i64, name: &str) -> Result<()> {
        self.write(|tx| hierarchy::rename(tx, kind, id, name))
    }

    fn delete_hierarchy(&self, kind: HierarchyKind, id: i64) -> Result<()> {
        self.write(|tx| hierarchy::delete(tx, kind, id))
    }

    // Lookup operations

    fn list_lookups(&self, kind: LookupKind) -> Result<Vec<LookupValue>> {
        lookups::list(&self.conn(), kind)
    }

    fn create_lookup(&self, kind: LookupKind, value: &str) -> Result<LookupValue> {
        self.write(|tx| lookups::create(tx, kind, value))
    }

    fn rename_lookup(&self, kind: LookupKind, id: i64, value: &str) -> Result<LookupValue> {
        self.write(|tx| lookups::rename(tx, kind, id, value))
    }

    fn delete_lookup(&self, kind: LookupKind, id: i64) -> Result<()> {
        self.write(|tx| lookups::delete(tx, kind, id))
    }

    fn list_models(&self, brand_id: Option<i64>) -> Result<Vec<ModelValue>> {
        lookups::list_models(&self.conn(), brand_id)
    }

    fn create_model(&self, brand_id: i64, value: &str) -> Result<ModelValue> {
        self.write(|tx| lookups::create_model(tx, brand_id, value))
    }

    fn delete_model(&self, id: i64) -> Result<()> {
        self.write(|tx| lookups::delete_model(tx, id))
    }

    // Device operations

    fn create_device(&self, input: &NewDevice) -> Result<Device> {
        self.write(|tx| devices::write(tx, None, input))
    }

    fn update_device(&self, id: i64, input: &NewDevice) -> Result<Device> {
        self.write(|tx| devices::write(tx, Some(id), input))
    }

    fn get_device(&self, id: i64) -> Result<Option<DeviceView>> {
        devices::get_view(&self.conn(), id)
    }

    fn list_devices(&self, filter: &DeviceFilter, page: PageRequest) -> Result<Page<DeviceView>> {
        devices::list(&self.conn(), filter, page)
    }

    fn delete_device(&self, id: i64) -> Result<()> {
        let policy = self.ticket_policy;
        self.write(|tx| devices::delete(tx, policy, id))
    }

    // Ticket operations

    fn open_ticket(
        &self,
        device_id: i64,
        date_in: NaiveDate,
        details_in: Option<&str>,
        today: NaiveDate,
    ) -> Result<Ticket> {
        let policy = self.ticket_policy;
        self.write(|tx| tickets::open(tx, policy, device_id, date_in, details_in, today))
    }

    fn close_ticket(
        &self,
        id: i64,
        status: TicketStatus,
        date_out: NaiveDate,
        details_out: Option<&str>,
    ) -> Result<Ticket> {
        self.write(|tx| tickets::close(tx, id, status, date_out, details_out))
    }

    fn edit_ticket(&self, id: i64, edit: &TicketEdit, today: NaiveDate) -> Result<Ticket> {
        let policy = self.ticket_policy;
        self.write(|tx| tickets::edit(tx, policy, id, edit, today))
    }

    fn get_ticket(&self, id: i64) -> Result<Option<TicketView>> {
        tickets::get_view(&self.conn(), id)
    }

    fn list_tickets(&self, filter: &TicketFilter, page: PageRequest) -> Result<Page<TicketView>> {
        tickets::list(&self.conn(), filter, page)
    }

    fn delete_ticket(&self, id: i64) -> Result<()> {
        self.write(|tx| tickets::delete(tx, id))
    }

    // Period operations

    fn ensure_periods(&self, today: NaiveDate) -> Result<usize> {
        self.write(|tx| periods::ensure(tx, today))
    }

    fn list_periods(&self) -> Result<Vec<Period>> {
        periods::list(&self.conn())
    }

    fn active_period(&self, today: NaiveDate) -> Result<Option<Period>> {
        periods::active(&self.conn(), today)
    }

    fn update_period(
        &self,
        code: &str,
        starts_on: NaiveDate,
        ends_on: NaiveDate,
        today: NaiveDate,
    ) -> Result<Period> {
        self.write(|tx| periods::update(tx, code, starts_on, ends_on, today))
    }
}
