//! Derived orbital properties
//!
//! Same derivation space-track.org uses to add semi-major axis, period,
//! apogee and perigee to its TLE classes:
//!
//! - `period = 1440 / n`
//! - `a = (mu / (n * 2 * pi / 86400)^2)^(1/3)`
//! - `apogee = a * (1 + e) - R`
//! - `perigee = a * (1 - e) - R`

use std::f64::consts::PI;

/// Equatorial earth radius, km
pub const EARTH_RADIUS_KM: f64 = 6378.135;

/// Standard gravitational parameter of the earth, km^3/s^2
pub const MU_EARTH: f64 = 398600.4418;

const SECONDS_PER_DAY: f64 = 86400.0;
const MINUTES_PER_DAY: f64 = SECONDS_PER_DAY / 60.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalProperties {
    /// km
    pub semimajor_axis: f64,
    /// km above the surface
    pub apogee: f64,
    /// km above the surface
    pub perigee: f64,
    /// minutes
    pub period: f64,
}

/// Computes orbital properties from mean motion (rev/day) and eccentricity
pub fn orbital_properties(mean_motion: f64, eccentricity: f64) -> OrbitalProperties {
    let radians_per_second = mean_motion * 2.0 * PI / SECONDS_PER_DAY;
    let semimajor_axis = (MU_EARTH / radians_per_second.powi(2)).cbrt();

    OrbitalProperties {
        semimajor_axis,
        apogee: semimajor_axis * (1.0 + eccentricity) - EARTH_RADIUS_KM,
        perigee: semimajor_axis * (1.0 - eccentricity) - EARTH_RADIUS_KM,
        period: MINUTES_PER_DAY / mean_motion,
    }
}
