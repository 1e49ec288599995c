//! SQL assembly
//!
//! Statement text is built only from static column identifiers and
//! static operator fragments. Every request value travels as a bound
//! parameter.

use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use serde_json::Value;

use crate::query::{BoundValue, Comparator, MatchMode, Predicate};
use crate::schema::ColumnDescriptor;

/// Column list in table order, shared by every SELECT and INSERT
pub(crate) const RECORD_COLUMNS: &str = "norad_catalog, classified, inclination, period, \
     apogee, perigee, mean_motion, eccentricity, semimajor_axis, epoch, intldes, name, \
     line1, line2";

const INSERT_VALUES: &str =
    "VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)";

impl ToSql for BoundValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            BoundValue::Integer(v) => ToSqlOutput::from(*v),
            BoundValue::Real(v) => ToSqlOutput::from(*v),
            BoundValue::Text(v) => ToSqlOutput::from(v.as_str()),
        })
    }
}

fn comparison_operator(comparator: Comparator) -> &'static str {
    match comparator {
        Comparator::Eq => "=",
        Comparator::Lt => "<",
        Comparator::Le => "<=",
        Comparator::Gt => ">",
        Comparator::Ge => ">=",
        Comparator::In => "IN",
    }
}

/// WHERE clause body for `predicate`, with `?1..?n` placeholders
pub(crate) fn where_clause(predicate: &Predicate) -> String {
    let column = predicate.column().as_str();
    let base = match (predicate.comparator(), predicate.match_mode()) {
        (Comparator::Eq, MatchMode::Pattern) => format!("{} LIKE ?1", column),
        (Comparator::In, _) => {
            let placeholders: Vec<String> = (1..=predicate.values().len())
                .map(|i| format!("?{}", i))
                .collect();
            format!("{} IN ({})", column, placeholders.join(", "))
        }
        (comparator, _) => format!("{} {} ?1", column, comparison_operator(comparator)),
    };

    if predicate.is_negated() {
        format!("NOT ({})", base)
    } else {
        base
    }
}

pub(crate) fn search_sql(predicate: &Predicate) -> String {
    format!(
        "SELECT {} FROM tles WHERE {} ORDER BY {}, norad_catalog",
        RECORD_COLUMNS,
        where_clause(predicate),
        predicate.column().as_str()
    )
}

/// One statement returning MIN and MAX for each column, in order
pub(crate) fn range_sql(columns: &[&ColumnDescriptor]) -> String {
    let selections: Vec<String> = columns
        .iter()
        .map(|d| format!("MIN({0}), MAX({0})", d.name()))
        .collect();
    format!("SELECT {} FROM tles", selections.join(", "))
}

pub(crate) fn insert_sql(replace: bool) -> String {
    let verb = if replace {
        "INSERT OR REPLACE"
    } else {
        "INSERT"
    };
    format!("{} INTO tles ({}) {}", verb, RECORD_COLUMNS, INSERT_VALUES)
}

/// Converts an aggregate result to JSON
pub(crate) fn json_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null | ValueRef::Blob(_) => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
    }
}
