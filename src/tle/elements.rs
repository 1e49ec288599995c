//! Fixed-column field extraction

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::ops::Range;
use thiserror::Error;

use super::orbit::{orbital_properties, OrbitalProperties};

/// Catalog number, line 1 columns 3-7
const SATNUM: Range<usize> = 2..7;
/// International designator, line 1 columns 10-17
const INTLDES: Range<usize> = 9..17;
/// Two-digit epoch year, line 1 columns 19-20
const EPOCH_YEAR: Range<usize> = 18..20;
/// Fractional day of year, line 1 columns 21-32
const EPOCH_DAY: Range<usize> = 20..32;
/// Inclination in degrees, line 2 columns 9-16
const INCLINATION: Range<usize> = 8..16;
/// Eccentricity with implied leading decimal point, line 2 columns 27-33
const ECCENTRICITY: Range<usize> = 26..33;
/// Mean motion in revolutions per day, line 2 columns 53-63
const MEAN_MOTION: Range<usize> = 52..63;

/// Two-digit years below this are in the 2000s
const EPOCH_PIVOT_YEAR: i32 = 57;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TleError {
    #[error("line {line} must start with '{line} '")]
    LineNumber { line: u8 },

    #[error("line {line} is too short to hold field '{field}'")]
    Truncated { line: u8, field: &'static str },

    #[error("field '{field}' has invalid value '{value}'")]
    InvalidField { field: &'static str, value: String },
}

/// Fields read from a TLE plus derived orbital properties
#[derive(Debug, Clone, PartialEq)]
pub struct TleElements {
    pub norad_catalog: i64,
    pub intldes: String,
    pub epoch: NaiveDateTime,
    /// degrees
    pub inclination: f64,
    pub eccentricity: f64,
    /// revolutions per day
    pub mean_motion: f64,
    pub orbit: OrbitalProperties,
}

impl TleElements {
    /// Extracts elements from the two data lines (already trimmed)
    pub fn parse(line1: &str, line2: &str) -> Result<Self, TleError> {
        if !line1.starts_with("1 ") {
            return Err(TleError::LineNumber { line: 1 });
        }
        if !line2.starts_with("2 ") {
            return Err(TleError::LineNumber { line: 2 });
        }

        let norad_catalog = parse_field::<i64>(line1, 1, SATNUM, "norad_catalog")?;
        let intldes = field(line1, 1, INTLDES, "intldes")?.trim().to_string();
        let epoch = parse_epoch(line1)?;

        let inclination = parse_real(line2, 2, INCLINATION, "inclination")?;
        let eccentricity = parse_eccentricity(line2)?;
        let mean_motion = parse_real(line2, 2, MEAN_MOTION, "mean_motion")?;
        if mean_motion <= 0.0 {
            return Err(TleError::InvalidField {
                field: "mean_motion",
                value: mean_motion.to_string(),
            });
        }

        Ok(Self {
            norad_catalog,
            intldes,
            epoch,
            inclination,
            eccentricity,
            mean_motion,
            orbit: orbital_properties(mean_motion, eccentricity),
        })
    }
}

fn field<'a>(
    line: &'a str,
    line_no: u8,
    range: Range<usize>,
    name: &'static str,
) -> Result<&'a str, TleError> {
    line.get(range).ok_or(TleError::Truncated {
        line: line_no,
        field: name,
    })
}

fn parse_field<T: std::str::FromStr>(
    line: &str,
    line_no: u8,
    range: Range<usize>,
    name: &'static str,
) -> Result<T, TleError> {
    let raw = field(line, line_no, range, name)?.trim();
    raw.parse::<T>().map_err(|_| TleError::InvalidField {
        field: name,
        value: raw.to_string(),
    })
}

/// As [`parse_field`], also refusing `NaN` and infinities
fn parse_real(
    line: &str,
    line_no: u8,
    range: Range<usize>,
    name: &'static str,
) -> Result<f64, TleError> {
    let value = parse_field::<f64>(line, line_no, range.clone(), name)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(TleError::InvalidField {
            field: name,
            value: field(line, line_no, range, name)?.trim().to_string(),
        })
    }
}

fn parse_eccentricity(line2: &str) -> Result<f64, TleError> {
    let raw = field(line2, 2, ECCENTRICITY, "eccentricity")?.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TleError::InvalidField {
            field: "eccentricity",
            value: raw.to_string(),
        });
    }
    format!("0.{}", raw)
        .parse::<f64>()
        .map_err(|_| TleError::InvalidField {
            field: "eccentricity",
            value: raw.to_string(),
        })
}

fn parse_epoch(line1: &str) -> Result<NaiveDateTime, TleError> {
    let yy = parse_field::<i32>(line1, 1, EPOCH_YEAR, "epoch")?;
    let day = parse_field::<f64>(line1, 1, EPOCH_DAY, "epoch")?;
    let invalid = || TleError::InvalidField {
        field: "epoch",
        value: line1.get(EPOCH_YEAR.start..EPOCH_DAY.end).unwrap_or_default().to_string(),
    };

    if !(1.0..367.0).contains(&day) {
        return Err(invalid());
    }

    let year = if yy < EPOCH_PIVOT_YEAR { 2000 + yy } else { 1900 + yy };
    let start = NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(invalid)?;

    let micros = ((day - 1.0) * 86_400_000_000.0).round() as i64;
    start
        .checked_add_signed(Duration::microseconds(micros))
        .ok_or_else(invalid)
}
