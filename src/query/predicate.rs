//! Validated, bound predicates

use super::operator::Comparator;
use crate::schema::Column;

/// A value coerced to its column's type, carried as a bound parameter
#[derive(Debug, Clone, PartialEq)]
pub enum BoundValue {
    Integer(i64),
    Real(f64),
    Text(String),
}

/// How equality is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Plain comparison
    Exact,
    /// SQL `LIKE` with `%` and `_` wildcards
    Pattern,
}

/// A single-column constraint ready for execution
///
/// Built only by [`super::PredicateBuilder`]; immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    column: Column,
    comparator: Comparator,
    negated: bool,
    values: Vec<BoundValue>,
    match_mode: MatchMode,
}

impl Predicate {
    pub(super) fn new(
        column: Column,
        comparator: Comparator,
        negated: bool,
        values: Vec<BoundValue>,
        match_mode: MatchMode,
    ) -> Self {
        Self {
            column,
            comparator,
            negated,
            values,
            match_mode,
        }
    }

    pub fn column(&self) -> Column {
        self.column
    }

    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    /// Whether the base comparison is wrapped in `NOT`
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Bound values: one for unary comparators, one or more for `in`
    pub fn values(&self) -> &[BoundValue] {
        &self.values
    }

    pub fn match_mode(&self) -> MatchMode {
        self.match_mode
    }

    pub fn is_pattern(&self) -> bool {
        self.match_mode == MatchMode::Pattern
    }
}
