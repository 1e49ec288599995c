//! Static registry of the `tles` table columns

use std::collections::HashMap;

use super::types::{Column, ColumnDescriptor, ValueType};

/// Shortest plausible orbital period for an object orbiting just above a
/// smooth, airless earth
pub const MINIMUM_PERIOD_MINUTES: f64 = 84.47;

/// Lowest apogee/perigee accepted, roughly the edge of space
pub const MINIMUM_ORBIT_KM: f64 = 100.0;

/// Length of each TLE data line
pub const TLE_LINE_LENGTH: usize = 69;

/// DDL for the single table, served verbatim by `/schema`
pub const CREATE_TABLE_SQL: &str = r#"CREATE TABLE IF NOT EXISTS "tles" (
    "norad_catalog"   INTEGER NOT NULL CHECK(norad_catalog>0) UNIQUE,
    "classified"      INTEGER NOT NULL DEFAULT 0 CHECK(classified==0 or classified==1),
    "inclination"     REAL NOT NULL CHECK(inclination>=-180 and inclination <=180),
    "period"          REAL NOT NULL CHECK(period>=84.47),
    "apogee"          REAL NOT NULL CHECK(apogee>=100 or perigee>=100),
    "perigee"         REAL NOT NULL CHECK(apogee>=100 or perigee>=100),
    "mean_motion"     REAL NOT NULL CHECK(mean_motion>0),
    "eccentricity"    REAL NOT NULL CHECK(eccentricity>=0),
    "semimajor_axis"  REAL NOT NULL CHECK(semimajor_axis>=0),
    "epoch"           TIMESTAMP NOT NULL,
    "intldes"         VARCHAR(8)  NOT NULL CHECK(length(intldes)>=6 and length(intldes)<=8) UNIQUE,
    "name"            VARCHAR(80) NOT NULL DEFAULT "",
    "line1"           TEXT NOT NULL CHECK(length(line1)==69),
    "line2"           TEXT NOT NULL CHECK(length(line2)==69),
    PRIMARY KEY("norad_catalog")
) WITHOUT ROWID"#;

/// Secondary indexes created alongside the table
pub(crate) const CREATE_INDEXES_SQL: &str = "
    CREATE INDEX IF NOT EXISTS ix_name ON tles (name);
    CREATE INDEX IF NOT EXISTS ix_intldes ON tles (intldes);
    CREATE INDEX IF NOT EXISTS ix_classified ON tles (classified);
    CREATE INDEX IF NOT EXISTS ix_eccentricity ON tles (eccentricity);
    CREATE INDEX IF NOT EXISTS ix_perigee ON tles (perigee);
    CREATE INDEX IF NOT EXISTS ix_apogee ON tles (apogee);
    CREATE INDEX IF NOT EXISTS ix_period ON tles (period);
    CREATE INDEX IF NOT EXISTS ix_mean_motion ON tles (mean_motion);
    CREATE INDEX IF NOT EXISTS ix_inclination ON tles (inclination);
    CREATE INDEX IF NOT EXISTS ix_semimajor_axis ON tles (semimajor_axis);
    CREATE INDEX IF NOT EXISTS ix_epoch ON tles (epoch);
";

/// Column registry, built once at startup and read-only afterwards
///
/// Lookups go through a name map so request text is only ever compared
/// against known names, never forwarded.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    descriptors: Vec<ColumnDescriptor>,
    by_name: HashMap<&'static str, usize>,
    searchable: Vec<&'static str>,
}

impl SchemaRegistry {
    /// Registry for the `tles` table.
    ///
    /// Everything except the raw element lines is searchable and rangeable.
    pub fn tles() -> Self {
        let descriptors: Vec<ColumnDescriptor> = Column::ALL
            .iter()
            .map(|&column| match column {
                Column::Line1 | Column::Line2 => ColumnDescriptor::stored(column),
                _ => ColumnDescriptor::queryable(column),
            })
            .collect();

        let by_name = descriptors
            .iter()
            .enumerate()
            .map(|(idx, d)| (d.name(), idx))
            .collect();

        let mut searchable: Vec<&'static str> = descriptors
            .iter()
            .filter(|d| d.searchable)
            .map(|d| d.name())
            .collect();
        searchable.sort_unstable();

        Self {
            descriptors,
            by_name,
            searchable,
        }
    }

    /// Searchable column names in alphabetical order
    pub fn columns(&self) -> &[&'static str] {
        &self.searchable
    }

    /// Column name to value type, in table order
    pub fn describe(&self) -> Vec<(&'static str, ValueType)> {
        self.descriptors
            .iter()
            .map(|d| (d.name(), d.value_type))
            .collect()
    }

    /// True if `name` is a searchable column
    pub fn is_column(&self, name: &str) -> bool {
        self.searchable_column(name).is_some()
    }

    /// Looks up any column of the table by name, ignoring ASCII case
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.by_name
            .get(name.to_ascii_lowercase().as_str())
            .map(|&idx| &self.descriptors[idx])
    }

    /// Looks up a searchable column by name
    pub fn searchable_column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.column(name).filter(|d| d.searchable)
    }

    /// Looks up a rangeable column by name
    pub fn rangeable_column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.column(name).filter(|d| d.rangeable)
    }

    /// All rangeable columns in alphabetical order
    pub fn rangeable(&self) -> Vec<&ColumnDescriptor> {
        let mut out: Vec<_> = self.descriptors.iter().filter(|d| d.rangeable).collect();
        out.sort_by_key(|d| d.name());
        out
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::tles()
    }
}
