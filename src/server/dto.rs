use chrono::NaiveDate;
use serde::Deserialize;

use crate::types::{
    AttributeFilter, DeviceFilter, LocationPath, PageRequest, Placement, StatusFilter,
    TicketFilter, TicketStatus,
};

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub name: String,
}

/// Body of `POST /locations`: a location described by names or by ids.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveLocationRequest {
    Path(LocationPath),
    Placement(Placement),
}

#[derive(Debug, Deserialize)]
pub struct LookupValueRequest {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateModelRequest {
    pub brand_id: i64,
    pub value: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListModelsParams {
    #[serde(default)]
    pub brand_id: Option<i64>,
}

// Query decoding cannot coerce numbers inside `#[serde(flatten)]`, so the
// attribute ids are repeated in each params struct.
#[derive(Debug, Default, Deserialize)]
pub struct ListDevicesParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub device_type_id: Option<i64>,
    #[serde(default)]
    pub brand_id: Option<i64>,
    #[serde(default)]
    pub model_id: Option<i64>,
    #[serde(default)]
    pub os_id: Option<i64>,
    #[serde(default)]
    pub ram_id: Option<i64>,
    #[serde(default)]
    pub storage_id: Option<i64>,
    #[serde(default)]
    pub processor_id: Option<i64>,
    #[serde(default)]
    pub building_id: Option<i64>,
    #[serde(default)]
    pub floor_id: Option<i64>,
    #[serde(default)]
    pub area_id: Option<i64>,
    #[serde(default)]
    pub room_id: Option<i64>,
    #[serde(default)]
    pub location_id: Option<i64>,
}

impl ListDevicesParams {
    #[must_use]
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }

    #[must_use]
    pub fn attributes(&self) -> AttributeFilter {
        AttributeFilter {
            device_type_id: self.device_type_id,
            brand_id: self.brand_id,
            model_id: self.model_id,
            os_id: self.os_id,
            ram_id: self.ram_id,
            storage_id: self.storage_id,
            processor_id: self.processor_id,
            building_id: self.building_id,
            floor_id: self.floor_id,
            area_id: self.area_id,
            room_id: self.room_id,
            location_id: self.location_id,
        }
    }

    #[must_use]
    pub fn filter(&self) -> DeviceFilter {
        DeviceFilter {
            q: self.q.clone(),
            attributes: self.attributes(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListTicketsParams {
    #[serde(default)]
    pub q: Option<String>,
    /// `pending`, `repaired`, `unrepaired` or `history`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub date_out_from: Option<NaiveDate>,
    #[serde(default)]
    pub date_out_to: Option<NaiveDate>,
    #[serde(default)]
    pub device_id: Option<i64>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub device_type_id: Option<i64>,
    #[serde(default)]
    pub brand_id: Option<i64>,
    #[serde(default)]
    pub model_id: Option<i64>,
    #[serde(default)]
    pub os_id: Option<i64>,
    #[serde(default)]
    pub ram_id: Option<i64>,
    #[serde(default)]
    pub storage_id: Option<i64>,
    #[serde(default)]
    pub processor_id: Option<i64>,
    #[serde(default)]
    pub building_id: Option<i64>,
    #[serde(default)]
    pub floor_id: Option<i64>,
    #[serde(default)]
    pub area_id: Option<i64>,
    #[serde(default)]
    pub room_id: Option<i64>,
    #[serde(default)]
    pub location_id: Option<i64>,
}

impl ListTicketsParams {
    #[must_use]
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }

    #[must_use]
    pub fn filter(&self, status: Option<StatusFilter>) -> TicketFilter {
        TicketFilter {
            q: self.q.clone(),
            status,
            date_out_from: self.date_out_from,
            date_out_to: self.date_out_to,
            device_id: self.device_id,
            attributes: AttributeFilter {
                device_type_id: self.device_type_id,
                brand_id: self.brand_id,
                model_id: self.model_id,
                os_id: self.os_id,
                ram_id: self.ram_id,
                storage_id: self.storage_id,
                processor_id: self.processor_id,
                building_id: self.building_id,
                floor_id: self.floor_id,
                area_id: self.area_id,
                room_id: self.room_id,
                location_id: self.location_id,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OpenTicketRequest {
    pub device_id: i64,
    /// Required; checked by the handler so a missing value is a validation error.
    #[serde(default)]
    pub date_in: Option<NaiveDate>,
    #[serde(default)]
    pub details_in: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CloseTicketRequest {
    pub status: TicketStatus,
    #[serde(default)]
    pub date_out: Option<NaiveDate>,
    #[serde(default)]
    pub details_out: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePeriodRequest {
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
}
