pub mod names;
mod schema;
mod sqlite;

pub use sqlite::{SqliteStore, TicketPolicy};

use chrono::NaiveDate;

use crate::error::Result;
use crate::types::*;

/// Store defines the inventory database interface.
///
/// Every mutating operation is atomic: on error nothing is written.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // Location hierarchy

    /// Finds the location described by `path`, creating any missing
    /// building, floor, area, room and location rows.
    fn resolve_location(&self, path: &LocationPath) -> Result<Resolved>;
    /// Finds or creates the location for an existing area/room pair.
    fn resolve_placement(&self, placement: &Placement) -> Result<Resolved>;
    fn list_buildings(&self) -> Result<Vec<Building>>;
    fn list_floors(&self, building_id: i64) -> Result<Vec<Floor>>;
    fn list_areas(&self, floor_id: i64) -> Result<Vec<Area>>;
    fn list_rooms(&self, area_id: i64) -> Result<Vec<Room>>;
    fn list_locations(&self) -> Result<Vec<LocationView>>;
    fn get_location(&self, id: i64) -> Result<Option<LocationView>>;
    fn update_location(&self, id: i64, placement: &Placement) -> Result<Location>;
    fn rename_hierarchy(&self, kind: HierarchyKind, id: i64, name: &str) -> Result<()>;
    /// Deletes a hierarchy row, refusing while anything still references it.
    fn delete_hierarchy(&self, kind: HierarchyKind, id: i64) -> Result<()>;

    // Lookup operations
    fn list_lookups(&self, kind: LookupKind) -> Result<Vec<LookupValue>>;
    fn create_lookup(&self, kind: LookupKind, value: &str) -> Result<LookupValue>;
    fn rename_lookup(&self, kind: LookupKind, id: i64, value: &str) -> Result<LookupValue>;
    fn delete_lookup(&self, kind: LookupKind, id: i64) -> Result<()>;
    fn list_models(&self, brand_id: Option<i64>) -> Result<Vec<ModelValue>>;
    fn create_model(&self, brand_id: i64, value: &str) -> Result<ModelValue>;
    fn delete_model(&self, id: i64) -> Result<()>;

    // Device operations
    fn create_device(&self, input: &NewDevice) -> Result<Device>;
    fn update_device(&self, id: i64, input: &NewDevice) -> Result<Device>;
    fn get_device(&self, id: i64) -> Result<Option<DeviceView>>;
    fn list_devices(&self, filter: &DeviceFilter, page: PageRequest) -> Result<Page<DeviceView>>;
    fn delete_device(&self, id: i64) -> Result<()>;

    // Ticket operations
    fn open_ticket(
        &self,
        device_id: i64,
        date_in: NaiveDate,
        details_in: Option<&str>,
        today: NaiveDate,
    ) -> Result<Ticket>;
    fn close_ticket(
        &self,
        id: i64,
        status: TicketStatus,
        date_out: NaiveDate,
        details_out: Option<&str>,
    ) -> Result<Ticket>;
    fn edit_ticket(&self, id: i64, edit: &TicketEdit, today: NaiveDate) -> Result<Ticket>;
    fn get_ticket(&self, id: i64) -> Result<Option<TicketView>>;
    fn list_tickets(&self, filter: &TicketFilter, page: PageRequest) -> Result<Page<TicketView>>;
    fn delete_ticket(&self, id: i64) -> Result<()>;

    // Period operations
    fn ensure_periods(&self, today: NaiveDate) -> Result<usize>;
    fn list_periods(&self) -> Result<Vec<Period>>;
    fn active_period(&self, today: NaiveDate) -> Result<Option<Period>>;
    fn update_period(
        &self,
        code: &str,
        starts_on: NaiveDate,
        ends_on: NaiveDate,
        today: NaiveDate,
    ) -> Result<Period>;
}
