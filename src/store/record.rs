//! TLE records and the payloads that create them

use chrono::NaiveDateTime;
use rusqlite::Row;
use serde::{Serialize, Serializer};
use serde_json::Value;

use super::errors::{StoreError, StoreResult};
use crate::schema::{
    Column, MINIMUM_ORBIT_KM, MINIMUM_PERIOD_MINUTES, TIMESTAMP_FORMAT, TLE_LINE_LENGTH,
};
use crate::tle::TleElements;

const MAX_NAME_LENGTH: usize = 80;

/// One row of the `tles` table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub norad_catalog: i64,
    #[serde(serialize_with = "as_flag")]
    pub classified: bool,
    pub inclination: f64,
    pub period: f64,
    pub apogee: f64,
    pub perigee: f64,
    pub mean_motion: f64,
    pub eccentricity: f64,
    pub semimajor_axis: f64,
    pub epoch: String,
    pub intldes: String,
    pub name: String,
    pub line1: String,
    pub line2: String,
}

fn as_flag<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*value))
}

impl Record {
    /// Builds a record from an object name and its two element lines.
    ///
    /// Only extraction failures are reported here; table constraints are
    /// checked separately by [`Record::violated_constraints`].
    pub fn from_tle(name: &str, line1: &str, line2: &str, classified: bool) -> StoreResult<Self> {
        let line1 = line1.trim();
        let line2 = line2.trim();
        let elements = TleElements::parse(line1, line2)
            .map_err(|err| StoreError::MalformedPayload(err.to_string()))?;

        Ok(Self::from_elements(
            &elements,
            name.trim(),
            line1,
            line2,
            classified,
        ))
    }

    pub fn from_elements(
        elements: &TleElements,
        name: &str,
        line1: &str,
        line2: &str,
        classified: bool,
    ) -> Self {
        Self {
            norad_catalog: elements.norad_catalog,
            classified,
            inclination: elements.inclination,
            period: elements.orbit.period,
            apogee: elements.orbit.apogee,
            perigee: elements.orbit.perigee,
            mean_motion: elements.mean_motion,
            eccentricity: elements.eccentricity,
            semimajor_axis: elements.orbit.semimajor_axis,
            epoch: format_epoch(&elements.epoch),
            intldes: elements.intldes.clone(),
            name: name.to_string(),
            line1: line1.to_string(),
            line2: line2.to_string(),
        }
    }

    /// Names of the table constraints this record would violate
    pub fn violated_constraints(&self) -> Vec<&'static str> {
        let mut violated = Vec::new();
        if self.norad_catalog <= 0 {
            violated.push(Column::NoradCatalog.as_str());
        }
        if !(6..=8).contains(&self.intldes.chars().count()) {
            violated.push(Column::Intldes.as_str());
        }
        if !(-180.0..=180.0).contains(&self.inclination) {
            violated.push(Column::Inclination.as_str());
        }
        if below(self.apogee, MINIMUM_ORBIT_KM) && below(self.perigee, MINIMUM_ORBIT_KM) {
            violated.push(Column::Apogee.as_str());
            violated.push(Column::Perigee.as_str());
        }
        if below(self.period, MINIMUM_PERIOD_MINUTES) {
            violated.push(Column::Period.as_str());
        }
        if !self.mean_motion.is_finite() || self.mean_motion <= 0.0 {
            violated.push(Column::MeanMotion.as_str());
        }
        if below(self.eccentricity, 0.0) {
            violated.push(Column::Eccentricity.as_str());
        }
        if below(self.semimajor_axis, 0.0) {
            violated.push(Column::SemimajorAxis.as_str());
        }
        if self.name.chars().count() > MAX_NAME_LENGTH {
            violated.push(Column::Name.as_str());
        }
        if self.line1.len() != TLE_LINE_LENGTH {
            violated.push(Column::Line1.as_str());
        }
        if self.line2.len() != TLE_LINE_LENGTH {
            violated.push(Column::Line2.as_str());
        }
        violated
    }

    /// Fails with `MalformedPayload` naming every violated constraint
    pub fn validate(&self) -> StoreResult<()> {
        let violated = self.violated_constraints();
        if violated.is_empty() {
            Ok(())
        } else {
            Err(StoreError::constraints(&violated))
        }
    }

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            norad_catalog: row.get("norad_catalog")?,
            classified: row.get::<_, i64>("classified")? != 0,
            inclination: row.get("inclination")?,
            period: row.get("period")?,
            apogee: row.get("apogee")?,
            perigee: row.get("perigee")?,
            mean_motion: row.get("mean_motion")?,
            eccentricity: row.get("eccentricity")?,
            semimajor_axis: row.get("semimajor_axis")?,
            epoch: row.get("epoch")?,
            intldes: row.get("intldes")?,
            name: row.get("name")?,
            line1: row.get("line1")?,
            line2: row.get("line2")?,
        })
    }
}

/// Non-finite values never satisfy a lower bound
fn below(value: f64, min: f64) -> bool {
    !value.is_finite() || value < min
}

fn format_epoch(epoch: &NaiveDateTime) -> String {
    epoch.format(TIMESTAMP_FORMAT).to_string()
}

/// Body of an `add` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddPayload {
    /// `[name, line1, line2]`
    Standard {
        name: String,
        line1: String,
        line2: String,
    },
    /// `[name, line1, line2]` or `[line1, line2]`, name may be null
    Classified {
        name: Option<String>,
        line1: String,
        line2: String,
    },
}

impl AddPayload {
    /// Checks the payload shape. No element parsing happens here.
    pub fn parse(body: &Value, classified: bool) -> StoreResult<Self> {
        let items = body.as_array().ok_or_else(|| {
            StoreError::MalformedPayload("expected a JSON list".to_string())
        })?;

        if !classified {
            return match items.as_slice() {
                [name, line1, line2] => Ok(AddPayload::Standard {
                    name: string_item(name, "name")?,
                    line1: string_item(line1, "line1")?,
                    line2: string_item(line2, "line2")?,
                }),
                _ => Err(StoreError::MalformedPayload(format!(
                    "expected a 3-element list [name, line1, line2], got {} elements",
                    items.len()
                ))),
            };
        }

        match items.as_slice() {
            [name, line1, line2] => Ok(AddPayload::Classified {
                name: optional_string_item(name, "name")?,
                line1: string_item(line1, "line1")?,
                line2: string_item(line2, "line2")?,
            }),
            [line1, line2] => Ok(AddPayload::Classified {
                name: None,
                line1: string_item(line1, "line1")?,
                line2: string_item(line2, "line2")?,
            }),
            _ => Err(StoreError::MalformedPayload(format!(
                "expected [name, line1, line2] or [line1, line2], got {} elements",
                items.len()
            ))),
        }
    }

    pub fn is_classified(&self) -> bool {
        matches!(self, AddPayload::Classified { .. })
    }

    /// Extracts elements and checks table constraints
    pub fn to_record(&self) -> StoreResult<Record> {
        let record = match self {
            AddPayload::Standard { name, line1, line2 } => {
                Record::from_tle(name, line1, line2, false)?
            }
            AddPayload::Classified { name, line1, line2 } => {
                Record::from_tle(name.as_deref().unwrap_or(""), line1, line2, true)?
            }
        };
        record.validate()?;
        Ok(record)
    }
}

fn string_item(value: &Value, field: &str) -> StoreResult<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| StoreError::MalformedPayload(format!("'{}' must be a string", field)))
}

fn optional_string_item(value: &Value, field: &str) -> StoreResult<Option<String>> {
    if value.is_null() {
        Ok(None)
    } else {
        string_item(value, field).map(Some)
    }
}

/// Identifier family accepted by `delete`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    NoradCatalog,
    Intldes,
}

impl CatalogKind {
    pub fn parse(name: &str) -> StoreResult<Self> {
        match name {
            "norad_catalog" => Ok(CatalogKind::NoradCatalog),
            "intldes" => Ok(CatalogKind::Intldes),
            other => Err(StoreError::UnknownColumn(other.to_string())),
        }
    }

    pub fn column(&self) -> Column {
        match self {
            CatalogKind::NoradCatalog => Column::NoradCatalog,
            CatalogKind::Intldes => Column::Intldes,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.column().as_str()
    }
}

/// How bulk loads treat records that already exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Collisions are rejected
    #[default]
    InsertOnly,
    /// Collisions replace the stored row
    Replace,
}

/// A record refused by a bulk load
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    /// Catalog number, or the object name when the lines did not parse
    pub label: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub inserted: usize,
    pub rejected: Vec<Rejection>,
}

impl LoadSummary {
    pub fn merge(&mut self, other: LoadSummary) {
        self.inserted += other.inserted;
        self.rejected.extend(other.rejected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ISS_LINE1: &str = "1 25544U 98067A   19128.56248153  .00016717  00000-0  10270-3 0  9002";
    const ISS_LINE2: &str = "2 25544  51.6390 198.1271 0001239 315.7000  44.4052 15.52641749  9097";

    #[test]
    fn test_standard_payload_shape() {
        let payload = AddPayload::parse(&json!(["ISS (ZARYA)", ISS_LINE1, ISS_LINE2]), false).unwrap();
        assert!(!payload.is_classified());

        for bad in [
            json!([ISS_LINE1, ISS_LINE2]),
            json!({"name": "ISS"}),
            json!([null, ISS_LINE1, ISS_LINE2]),
            json!(["ISS", ISS_LINE1, ISS_LINE2, "extra"]),
        ] {
            assert!(matches!(
                AddPayload::parse(&bad, false),
                Err(StoreError::MalformedPayload(_))
            ));
        }
    }

    #[test]
    fn test_classified_payload_relaxed() {
        let two = AddPayload::parse(&json!([ISS_LINE1, ISS_LINE2]), true).unwrap();
        let null_name = AddPayload::parse(&json!([null, ISS_LINE1, ISS_LINE2]), true).unwrap();
        assert_eq!(two, null_name);

        let record = two.to_record().unwrap();
        assert!(record.classified);
        assert_eq!(record.name, "");
    }

    #[test]
    fn test_record_from_iss() {
        let record = Record::from_tle("ISS (ZARYA)", ISS_LINE1, ISS_LINE2, false).unwrap();
        assert_eq!(record.norad_catalog, 25544);
        assert_eq!(record.intldes, "98067A");
        assert!(record.epoch.starts_with("2019-05-08 13:29:"));
        assert!(record.violated_constraints().is_empty());
    }

    #[test]
    fn test_serializes_classified_as_flag() {
        let record = Record::from_tle("ISS", ISS_LINE1, ISS_LINE2, true).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["classified"], 1);
        assert_eq!(json["norad_catalog"], 25544);
    }

    #[test]
    fn test_violations_are_all_listed() {
        let mut record = Record::from_tle("ISS", ISS_LINE1, ISS_LINE2, false).unwrap();
        record.period = 10.0;
        record.intldes = "98".to_string();
        record.line2.push(' ');
        assert_eq!(
            record.violated_constraints(),
            vec!["intldes", "period", "line2"]
        );
        assert!(matches!(record.validate(), Err(StoreError::MalformedPayload(_))));
    }

    #[test]
    fn test_non_finite_values_are_violations() {
        let mut record = Record::from_tle("ISS", ISS_LINE1, ISS_LINE2, false).unwrap();
        record.mean_motion = f64::NAN;
        record.period = f64::NAN;
        record.apogee = f64::NAN;
        record.perigee = f64::NAN;
        record.semimajor_axis = f64::INFINITY;
        assert_eq!(
            record.violated_constraints(),
            vec!["apogee", "perigee", "period", "mean_motion", "semimajor_axis"]
        );
    }

    #[test]
    fn test_nan_mean_motion_is_malformed() {
        let line2 = ISS_LINE2.replacen("15.52641749", &format!("{:>11}", "NaN"), 1);
        let payload = AddPayload::parse(&json!(["ISS", ISS_LINE1, line2]), false).unwrap();
        let err = payload.to_record().unwrap_err();
        assert!(err.to_string().contains("mean_motion"), "{}", err);
    }

    #[test]
    fn test_unparseable_lines_are_malformed() {
        let payload = AddPayload::parse(&json!(["ISS", ISS_LINE2, ISS_LINE1]), false).unwrap();
        assert!(matches!(
            payload.to_record(),
            Err(StoreError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_catalog_kind() {
        assert_eq!(CatalogKind::parse("intldes").unwrap(), CatalogKind::Intldes);
        assert_eq!(CatalogKind::NoradCatalog.as_str(), "norad_catalog");
        assert!(matches!(
            CatalogKind::parse("name"),
            Err(StoreError::UnknownColumn(_))
        ));
    }
}
