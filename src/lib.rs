//! tledb - a lookup and mutation service for two-line element sets
//!
//! Requests of the form `<column>/<operator>/<value...>` are validated
//! against a fixed column and operator vocabulary, turned into bound
//! predicates and run against a single SQLite table.

pub mod cli;
pub mod http_server;
pub mod loader;
pub mod observability;
pub mod query;
pub mod schema;
pub mod store;
pub mod tle;
