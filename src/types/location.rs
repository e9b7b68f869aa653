use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Separator used when rendering a hierarchy chain for display.
pub const PATH_SEPARATOR: &str = " > ";

/// Human-entered description of a placement, by names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationPath {
    pub building: String,
    pub floor: String,
    pub area: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl LocationPath {
    pub fn new(
        building: impl Into<String>,
        floor: impl Into<String>,
        area: impl Into<String>,
        room: Option<&str>,
    ) -> Self {
        Self {
            building: building.into(),
            floor: floor.into(),
            area: area.into(),
            room: room.map(str::to_string),
            details: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Renders a location as `Building > Floor > Area > Room (details)`.
///
/// This is the single place display text for a location is produced.
impl fmt::Display for LocationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}",
            self.building,
            self.floor,
            self.area,
            sep = PATH_SEPARATOR
        )?;
        if let Some(room) = &self.room {
            write!(f, "{PATH_SEPARATOR}{room}")?;
        }
        if let Some(details) = &self.details {
            write!(f, " ({details})")?;
        }
        Ok(())
    }
}

/// Selection of an existing area (and optionally a room) by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub area_id: i64,
    #[serde(default)]
    pub room_id: Option<i64>,
    #[serde(default)]
    pub details: Option<String>,
}

/// How a device names the location it is pinned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationRef {
    Id(i64),
    Placement(Placement),
    Path(LocationPath),
}

/// Levels of the naming hierarchy plus the location itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HierarchyKind {
    Building,
    Floor,
    Area,
    Room,
    Location,
}

impl HierarchyKind {
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Building => "buildings",
            Self::Floor => "floors",
            Self::Area => "areas",
            Self::Room => "rooms",
            Self::Location => "locations",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Building => "Building",
            Self::Floor => "Floor",
            Self::Area => "Area",
            Self::Room => "Room",
            Self::Location => "Location",
        }
    }

    pub fn parse(s: &str) -> Option<HierarchyKind> {
        match s {
            "building" | "buildings" => Some(Self::Building),
            "floor" | "floors" => Some(Self::Floor),
            "area" | "areas" => Some(Self::Area),
            "room" | "rooms" => Some(Self::Room),
            "location" | "locations" => Some(Self::Location),
            _ => None,
        }
    }
}

impl fmt::Display for HierarchyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for HierarchyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown hierarchy level '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_full_path() {
        let path = LocationPath::new("Building 01", "Floor 01", "Area TIC", Some("Room X"));
        assert_eq!(path.to_string(), "Building 01 > Floor 01 > Area TIC > Room X");
    }

    #[test]
    fn test_display_open_area_with_details() {
        let path = LocationPath::new("Building 02", "Floor 01", "Archive", None).with_details("desk 3");
        assert_eq!(path.to_string(), "Building 02 > Floor 01 > Archive (desk 3)");
    }

    #[test]
    fn test_location_ref_json_shapes() {
        let by_id: LocationRef = serde_json::from_str(r#"{"id": 4}"#).unwrap();
        assert_eq!(by_id, LocationRef::Id(4));

        let by_path: LocationRef = serde_json::from_str(
            r#"{"path": {"building": "B", "floor": "F", "area": "A"}}"#,
        )
        .unwrap();
        assert_eq!(by_path, LocationRef::Path(LocationPath::new("B", "F", "A", None)));
    }
}
