//! Operator table
//!
//! The vocabulary is closed: six base comparators, each with an
//! `n`-prefixed negated form. `neq` is the negation of `eq` and `nin` the
//! negation of `in`.

use std::fmt;

use super::errors::{QueryError, QueryResult};

/// Base comparison, before negation is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
    /// Set membership
    In,
}

impl Comparator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparator::Eq => "eq",
            Comparator::Lt => "lt",
            Comparator::Le => "le",
            Comparator::Gt => "gt",
            Comparator::Ge => "ge",
            Comparator::In => "in",
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            Comparator::In => Arity::Set,
            _ => Arity::Unary,
        }
    }
}

/// Number of values an operator consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly one value
    Unary,
    /// One or more values
    Set,
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Arity::Unary => count == 1,
            Arity::Set => count >= 1,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Arity::Unary => "exactly one value",
            Arity::Set => "at least one value",
        }
    }
}

/// A recognized operator token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operator {
    comparator: Comparator,
    negated: bool,
}

impl Operator {
    /// All twelve operators, base forms first
    pub const ALL: [Operator; 12] = [
        Operator::base(Comparator::Eq),
        Operator::base(Comparator::Lt),
        Operator::base(Comparator::Le),
        Operator::base(Comparator::Gt),
        Operator::base(Comparator::Ge),
        Operator::base(Comparator::In),
        Operator::negation(Comparator::Eq),
        Operator::negation(Comparator::Lt),
        Operator::negation(Comparator::Le),
        Operator::negation(Comparator::Gt),
        Operator::negation(Comparator::Ge),
        Operator::negation(Comparator::In),
    ];

    const fn base(comparator: Comparator) -> Self {
        Self {
            comparator,
            negated: false,
        }
    }

    const fn negation(comparator: Comparator) -> Self {
        Self {
            comparator,
            negated: true,
        }
    }

    /// Parses an operator token, case-insensitively
    pub fn parse(token: &str) -> QueryResult<Self> {
        let op = match token.to_ascii_lowercase().as_str() {
            "eq" => Self::base(Comparator::Eq),
            "lt" => Self::base(Comparator::Lt),
            "le" => Self::base(Comparator::Le),
            "gt" => Self::base(Comparator::Gt),
            "ge" => Self::base(Comparator::Ge),
            "in" => Self::base(Comparator::In),
            "neq" => Self::negation(Comparator::Eq),
            "nlt" => Self::negation(Comparator::Lt),
            "nle" => Self::negation(Comparator::Le),
            "ngt" => Self::negation(Comparator::Gt),
            "nge" => Self::negation(Comparator::Ge),
            "nin" => Self::negation(Comparator::In),
            _ => return Err(QueryError::UnknownOperator(token.to_string())),
        };
        Ok(op)
    }

    /// Canonical token
    pub fn token(&self) -> &'static str {
        match (self.negated, self.comparator) {
            (false, c) => c.as_str(),
            (true, Comparator::Eq) => "neq",
            (true, Comparator::Lt) => "nlt",
            (true, Comparator::Le) => "nle",
            (true, Comparator::Gt) => "ngt",
            (true, Comparator::Ge) => "nge",
            (true, Comparator::In) => "nin",
        }
    }

    pub fn arity(&self) -> Arity {
        self.comparator.arity()
    }

    /// True for the `n`-prefixed forms
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// The comparison with any negation stripped
    pub fn base_comparator(&self) -> Comparator {
        self.comparator
    }

    /// All canonical tokens, for help output
    pub fn tokens() -> Vec<&'static str> {
        Self::ALL.iter().map(|op| op.token()).collect()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip_for_vocabulary() {
        for op in Operator::ALL {
            assert_eq!(Operator::parse(op.token()).unwrap(), op);
        }
    }

    #[test]
    fn test_negation_strips_prefix() {
        let nge = Operator::parse("nge").unwrap();
        assert!(nge.is_negated());
        assert_eq!(nge.base_comparator(), Comparator::Ge);

        let neq = Operator::parse("neq").unwrap();
        assert!(neq.is_negated());
        assert_eq!(neq.base_comparator(), Comparator::Eq);

        let ge = Operator::parse("ge").unwrap();
        assert!(!ge.is_negated());
    }

    #[test]
    fn test_arity() {
        assert_eq!(Operator::parse("lt").unwrap().arity(), Arity::Unary);
        assert_eq!(Operator::parse("in").unwrap().arity(), Arity::Set);
        assert_eq!(Operator::parse("nin").unwrap().arity(), Arity::Set);
        assert!(Arity::Unary.accepts(1));
        assert!(!Arity::Unary.accepts(2));
        assert!(!Arity::Set.accepts(0));
        assert!(Arity::Set.accepts(5));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Operator::parse("NGT").unwrap().token(), "ngt");
    }

    #[test]
    fn test_unknown_operator() {
        for token in ["like", "ne", "between", "", "nn", "neqq"] {
            assert_eq!(
                Operator::parse(token),
                Err(QueryError::UnknownOperator(token.to_string()))
            );
        }
    }

    #[test]
    fn test_twelve_distinct_tokens() {
        let mut tokens = Operator::tokens();
        tokens.sort_unstable();
        tokens.dedup();
        assert_eq!(tokens.len(), 12);
    }
}
