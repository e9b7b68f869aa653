use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::StatusFilter;

pub const DEFAULT_PAGE_LIMIT: u32 = 10;
pub const MAX_PAGE_LIMIT: u32 = 200;

/// One-based page request. Out-of-range values are clamped, not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    #[must_use]
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = limit
            .filter(|l| *l >= 1)
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .min(MAX_PAGE_LIMIT);
        Self { page, limit }
    }

    #[must_use]
    pub fn offset(self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}

/// Attribute filters shared by device and ticket listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttributeFilter {
    pub device_type_id: Option<i64>,
    pub brand_id: Option<i64>,
    pub model_id: Option<i64>,
    pub os_id: Option<i64>,
    pub ram_id: Option<i64>,
    pub storage_id: Option<i64>,
    pub processor_id: Option<i64>,
    pub building_id: Option<i64>,
    pub floor_id: Option<i64>,
    pub area_id: Option<i64>,
    pub room_id: Option<i64>,
    pub location_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct DeviceFilter {
    pub q: Option<String>,
    pub attributes: AttributeFilter,
}

#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub q: Option<String>,
    pub status: Option<StatusFilter>,
    pub date_out_from: Option<NaiveDate>,
    pub date_out_to: Option<NaiveDate>,
    pub device_id: Option<i64>,
    pub attributes: AttributeFilter,
}
