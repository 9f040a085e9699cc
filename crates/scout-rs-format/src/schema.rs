//! Column schemas used when flattening records into rows.

use std::fmt;

/// How a column's value is rendered before cell encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Value is used as-is.
    Scalar,
    /// Value is first rendered to its JSON text.
    Object,
}

/// A single named column in a tabular export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

const fn scalar(name: &'static str) -> Column {
    Column {
        name,
        kind: ColumnKind::Scalar,
    }
}

const fn object(name: &'static str) -> Column {
    Column {
        name,
        kind: ColumnKind::Object,
    }
}

const DEVICE_STATUS_COLUMNS: &[Column] = &[
    scalar("_id"),
    scalar("device"),
    scalar("created_at"),
    scalar("mills"),
    scalar("uploaderBattery"),
    object("pump"),
    object("openaps"),
    object("loop"),
];

const FOOD_COLUMNS: &[Column] = &[
    scalar("_id"),
    scalar("name"),
    scalar("category"),
    scalar("subcategory"),
    object("portions"),
    scalar("created_at"),
    scalar("carbs"),
    scalar("protein"),
    scalar("fat"),
    scalar("energy"),
];

/// The record categories served by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    DeviceStatus,
    Food,
}

impl ResourceKind {
    /// Fixed export schema for this resource kind, in output order.
    pub fn columns(self) -> &'static [Column] {
        match self {
            Self::DeviceStatus => DEVICE_STATUS_COLUMNS,
            Self::Food => FOOD_COLUMNS,
        }
    }

    /// Collection and route name.
    pub fn name(self) -> &'static str {
        match self {
            Self::DeviceStatus => "devicestatus",
            Self::Food => "food",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
