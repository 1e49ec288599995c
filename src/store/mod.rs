//! Record store
//!
//! Owns the SQLite connections and enforces the table's uniqueness and
//! existence rules:
//!
//! - `norad_catalog` and `intldes` are each unique
//! - `add` fails if either is already present, checked and inserted in one
//!   `IMMEDIATE` transaction
//! - `delete` removes exactly one row or fails with `NotFound`
//!
//! Writable-ness is not enforced here; callers decide whether mutations
//! are allowed.

mod config;
mod errors;
mod record;
mod record_store;
mod sql;

pub use config::{StoreConfig, DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_READ_POOL_SIZE};
pub use errors::{StoreError, StoreResult};
pub use record::{AddPayload, CatalogKind, LoadMode, LoadSummary, Record, Rejection};
pub use record_store::{ColumnRange, RecordStore};
