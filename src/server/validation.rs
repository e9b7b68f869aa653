use std::str::FromStr;

use crate::server::response::ApiError;
use crate::types::{HierarchyKind, LookupKind, StatusFilter};

fn parse_param<T>(value: &str) -> Result<T, ApiError>
where
    T: FromStr<Err = String>,
{
    value.parse().map_err(ApiError::bad_request)
}

pub fn parse_lookup_kind(kind: &str) -> Result<LookupKind, ApiError> {
    parse_param(kind)
}

pub fn parse_hierarchy_kind(kind: &str) -> Result<HierarchyKind, ApiError> {
    parse_param(kind)
}

/// Parses an optional `status` query value; blank means no filter.
pub fn parse_status_filter(status: Option<&str>) -> Result<Option<StatusFilter>, ApiError> {
    match status.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_param(s).map(Some),
    }
}
