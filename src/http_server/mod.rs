//! # TLE HTTP Server
//!
//! axum front end over the record store.
//!
//! # Endpoints
//!
//! - `/`, `/help`, `/list` - route index
//! - `/columns`, `/schema`, `/count`, `/range[/<column>]` - metadata
//! - `/search/<column>/<op>/<v1>[/<v2>...]` - predicate search
//! - `/add`, `/add/classified`, `/delete/<catalog>/<id>` - mutations, only
//!   when the server is writable
//! - `/health`, `/metrics` - observability

pub mod config;
pub mod errors;
pub mod routes;
pub mod server;

pub use config::{ConfigError, ServerConfig};
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use routes::{tle_routes, AppState};
pub use server::HttpServer;
