//! TLE element extraction
//!
//! Reads the fixed-column fields the store needs out of the two element
//! lines and derives the orbital quantities exposed as searchable
//! columns. Checksums are not verified.

mod elements;
mod orbit;

pub use elements::{TleElements, TleError};
pub use orbit::{orbital_properties, OrbitalProperties, EARTH_RADIUS_KM, MU_EARTH};
