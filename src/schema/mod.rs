//! Schema registry for the `tles` table
//!
//! The table layout is fixed for the lifetime of the process. Every column
//! that can appear in a query is described here, and SQL text elsewhere in
//! the crate is assembled only from the static identifiers this module
//! hands out.

mod registry;
mod types;

pub use registry::{SchemaRegistry, CREATE_TABLE_SQL, MINIMUM_ORBIT_KM, MINIMUM_PERIOD_MINUTES, TLE_LINE_LENGTH};
pub(crate) use registry::CREATE_INDEXES_SQL;
pub use types::{Column, ColumnDescriptor, ValueType, TIMESTAMP_FORMAT};
