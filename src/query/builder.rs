//! Predicate builder
//!
//! Turns `<column>/<operator>/<value...>` path segments into a
//! [`Predicate`]. Validation order is column, operator, arity, then value
//! coercion; the first failure wins.

use chrono::NaiveDateTime;

use super::errors::{QueryError, QueryResult};
use super::operator::{Comparator, Operator};
use super::predicate::{BoundValue, MatchMode, Predicate};
use crate::schema::{ColumnDescriptor, SchemaRegistry, ValueType, TIMESTAMP_FORMAT};

/// Formats accepted for timestamp arguments, tried in order
const TIMESTAMP_INPUT_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Builds predicates against a schema registry
#[derive(Debug, Clone, Copy)]
pub struct PredicateBuilder<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> PredicateBuilder<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Validates and binds one predicate
    pub fn build<S: AsRef<str>>(
        &self,
        column: &str,
        operator: &str,
        args: &[S],
    ) -> QueryResult<Predicate> {
        let descriptor = self
            .registry
            .searchable_column(column)
            .copied()
            .ok_or_else(|| QueryError::UnknownColumn(column.to_string()))?;

        let op = Operator::parse(operator)?;

        if !op.arity().accepts(args.len()) {
            return Err(QueryError::ArityMismatch {
                operator: op.token(),
                expected: op.arity().describe(),
                actual: args.len(),
            });
        }

        let comparator = op.base_comparator();

        if comparator == Comparator::Eq && descriptor.value_type.supports_pattern() {
            let raw = args[0].as_ref();
            if has_wildcard(raw) {
                return Ok(Predicate::new(
                    descriptor.column,
                    comparator,
                    op.is_negated(),
                    vec![BoundValue::Text(raw.to_string())],
                    MatchMode::Pattern,
                ));
            }
        }

        let values = args
            .iter()
            .map(|arg| coerce(&descriptor, arg.as_ref()))
            .collect::<QueryResult<Vec<_>>>()?;

        Ok(Predicate::new(
            descriptor.column,
            comparator,
            op.is_negated(),
            values,
            MatchMode::Exact,
        ))
    }
}

fn has_wildcard(raw: &str) -> bool {
    raw.contains('%') || raw.contains('_')
}

/// Coerces a raw argument to the column's declared type
pub fn coerce(descriptor: &ColumnDescriptor, raw: &str) -> QueryResult<BoundValue> {
    let mismatch = || QueryError::TypeCoercion {
        column: descriptor.name(),
        expected: descriptor.value_type,
        value: raw.to_string(),
    };

    match descriptor.value_type {
        ValueType::Integer => raw
            .trim()
            .parse::<i64>()
            .map(BoundValue::Integer)
            .map_err(|_| mismatch()),
        ValueType::Real => match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(BoundValue::Real(v)),
            _ => Err(mismatch()),
        },
        ValueType::Text => Ok(BoundValue::Text(raw.to_string())),
        ValueType::Timestamp => parse_timestamp(raw.trim())
            .map(|ts| BoundValue::Text(ts.format(TIMESTAMP_FORMAT).to_string()))
            .ok_or_else(mismatch),
    }
}

/// Parses a date or date-time argument
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
