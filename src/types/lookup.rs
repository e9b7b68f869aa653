use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The flat lookup tables a device attribute can point into.
///
/// Models are not listed here: they belong to a brand and are handled
/// separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    DeviceType,
    Brand,
    Os,
    Ram,
    Storage,
    Processor,
}

impl LookupKind {
    pub const ALL: [LookupKind; 6] = [
        Self::DeviceType,
        Self::Brand,
        Self::Os,
        Self::Ram,
        Self::Storage,
        Self::Processor,
    ];

    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::DeviceType => "device_types",
            Self::Brand => "brands",
            Self::Os => "operating_systems",
            Self::Ram => "ram_sizes",
            Self::Storage => "storage_sizes",
            Self::Processor => "processors",
        }
    }

    /// Column of `devices` that references this table.
    #[must_use]
    pub const fn device_column(self) -> &'static str {
        match self {
            Self::DeviceType => "device_type_id",
            Self::Brand => "brand_id",
            Self::Os => "os_id",
            Self::Ram => "ram_id",
            Self::Storage => "storage_id",
            Self::Processor => "processor_id",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::DeviceType => "Device type",
            Self::Brand => "Brand",
            Self::Os => "Operating system",
            Self::Ram => "RAM size",
            Self::Storage => "Storage size",
            Self::Processor => "Processor",
        }
    }

    pub fn parse(s: &str) -> Option<LookupKind> {
        match s {
            "device_type" | "device-types" | "types" => Some(Self::DeviceType),
            "brand" | "brands" => Some(Self::Brand),
            "os" => Some(Self::Os),
            "ram" => Some(Self::Ram),
            "storage" => Some(Self::Storage),
            "processor" | "processors" => Some(Self::Processor),
            _ => None,
        }
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LookupKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown lookup kind '{s}'"))
    }
}

/// A lookup attribute given either by row id or by its display value.
///
/// Values are found or created when the owning device is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LookupRef {
    Id(i64),
    Value(String),
}

impl From<i64> for LookupRef {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for LookupRef {
    fn from(value: &str) -> Self {
        Self::Value(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind_accepts_plural_route_names() {
        assert_eq!(LookupKind::parse("brands"), Some(LookupKind::Brand));
        assert_eq!(LookupKind::parse("types"), Some(LookupKind::DeviceType));
        assert_eq!(LookupKind::parse("models"), None);
    }

    #[test]
    fn test_lookup_ref_deserializes_id_or_value() {
        let id: LookupRef = serde_json::from_str("7").unwrap();
        assert_eq!(id, LookupRef::Id(7));

        let value: LookupRef = serde_json::from_str("\"Dell\"").unwrap();
        assert_eq!(value, LookupRef::Value("Dell".into()));
    }
}
