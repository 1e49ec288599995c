//! Column and value type definitions
//!
//! Supported value types:
//! - integer: 64-bit signed integer
//! - real: finite 64-bit float
//! - text: UTF-8 string
//! - timestamp: UTC instant stored as `YYYY-MM-DD HH:MM:SS.ffffff` text

use std::fmt;

use serde::Serialize;

/// `chrono` format of stored timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Semantic type of a column's values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Integer,
    Real,
    Text,
    Timestamp,
}

impl ValueType {
    /// Returns the type name for error messages and `/schema`
    pub fn type_name(&self) -> &'static str {
        match self {
            ValueType::Integer => "integer",
            ValueType::Real => "real",
            ValueType::Text => "text",
            ValueType::Timestamp => "timestamp",
        }
    }

    /// Whether SQL wildcards in an equality argument turn it into a pattern
    pub fn supports_pattern(&self) -> bool {
        matches!(self, ValueType::Text | ValueType::Timestamp)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Every column of the `tles` table, in table order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    NoradCatalog,
    Classified,
    Inclination,
    Period,
    Apogee,
    Perigee,
    MeanMotion,
    Eccentricity,
    SemimajorAxis,
    Epoch,
    Intldes,
    Name,
    Line1,
    Line2,
}

impl Column {
    pub const ALL: [Column; 14] = [
        Column::NoradCatalog,
        Column::Classified,
        Column::Inclination,
        Column::Period,
        Column::Apogee,
        Column::Perigee,
        Column::MeanMotion,
        Column::Eccentricity,
        Column::SemimajorAxis,
        Column::Epoch,
        Column::Intldes,
        Column::Name,
        Column::Line1,
        Column::Line2,
    ];

    /// SQL identifier of the column. This is the only way column names
    /// reach query text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::NoradCatalog => "norad_catalog",
            Column::Classified => "classified",
            Column::Inclination => "inclination",
            Column::Period => "period",
            Column::Apogee => "apogee",
            Column::Perigee => "perigee",
            Column::MeanMotion => "mean_motion",
            Column::Eccentricity => "eccentricity",
            Column::SemimajorAxis => "semimajor_axis",
            Column::Epoch => "epoch",
            Column::Intldes => "intldes",
            Column::Name => "name",
            Column::Line1 => "line1",
            Column::Line2 => "line2",
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Column::NoradCatalog | Column::Classified => ValueType::Integer,
            Column::Inclination
            | Column::Period
            | Column::Apogee
            | Column::Perigee
            | Column::MeanMotion
            | Column::Eccentricity
            | Column::SemimajorAxis => ValueType::Real,
            Column::Epoch => ValueType::Timestamp,
            Column::Intldes | Column::Name | Column::Line1 | Column::Line2 => ValueType::Text,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Registry entry for one column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub column: Column,
    pub value_type: ValueType,
    /// May appear in `/search`
    pub searchable: bool,
    /// May appear in `/range`
    pub rangeable: bool,
}

impl ColumnDescriptor {
    /// Descriptor for a column that is searchable and rangeable
    pub fn queryable(column: Column) -> Self {
        Self {
            column,
            value_type: column.value_type(),
            searchable: true,
            rangeable: true,
        }
    }

    /// Descriptor for a stored-only column
    pub fn stored(column: Column) -> Self {
        Self {
            column,
            value_type: column.value_type(),
            searchable: false,
            rangeable: false,
        }
    }

    pub fn name(&self) -> &'static str {
        self.column.as_str()
    }
}
