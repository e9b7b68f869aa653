use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{LocationPath, LocationRef, LookupRef, TicketStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Floor {
    pub id: i64,
    pub building_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub id: i64,
    pub floor_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,
    pub area_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub area_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// A location joined with the names of its whole chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationView {
    #[serde(flatten)]
    pub location: Location,
    pub building_id: i64,
    pub floor_id: i64,
    pub path: LocationPath,
    pub display: String,
}

/// Outcome of resolving a location description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolved {
    pub location_id: i64,
    /// True when the location row itself was inserted by this call.
    pub created: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupValue {
    pub id: i64,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelValue {
    pub id: i64,
    pub brand_id: i64,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub device_type_id: i64,
    pub location_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ram_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processor_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Input for creating or replacing a device.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDevice {
    #[serde(default)]
    pub code: Option<String>,
    pub device_type: Option<LookupRef>,
    pub location: Option<LocationRef>,
    #[serde(default)]
    pub brand: Option<LookupRef>,
    #[serde(default)]
    pub model: Option<LookupRef>,
    #[serde(default)]
    pub os: Option<LookupRef>,
    #[serde(default)]
    pub ram: Option<LookupRef>,
    #[serde(default)]
    pub storage: Option<LookupRef>,
    #[serde(default)]
    pub processor: Option<LookupRef>,
    #[serde(default)]
    pub architecture: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

impl NewDevice {
    pub fn new(device_type: impl Into<LookupRef>, location: LocationRef) -> Self {
        Self {
            code: None,
            device_type: Some(device_type.into()),
            location: Some(location),
            brand: None,
            model: None,
            os: None,
            ram: None,
            storage: None,
            processor: None,
            architecture: None,
            serial: None,
            details: None,
        }
    }
}

/// A device with display values for every attribute and its location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceView {
    #[serde(flatten)]
    pub device: Device,
    pub device_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processor: Option<String>,
    pub location: LocationPath,
    pub location_display: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    pub device_id: i64,
    pub status: TicketStatus,
    pub date_in: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_out: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details_in: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details_out: Option<String>,
}

/// A ticket joined with display data of its device and location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketView {
    #[serde(flatten)]
    pub ticket: Ticket,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_code: Option<String>,
    pub device_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    pub location_display: String,
}

/// Changes allowed on a pending ticket. `None` keeps the current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketEdit {
    #[serde(default)]
    pub date_in: Option<NaiveDate>,
    #[serde(default)]
    pub details_in: Option<String>,
    #[serde(default)]
    pub device_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub code: String,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
}
