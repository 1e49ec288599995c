//! Query translation layer
//!
//! Operators form a closed vocabulary ([`Operator`]); predicates are built
//! and validated by [`PredicateBuilder`] before anything reaches the store.

mod builder;
mod errors;
mod operator;
mod predicate;

pub use builder::{coerce, PredicateBuilder};
pub use errors::{QueryError, QueryResult};
pub use operator::{Arity, Comparator, Operator};
pub use predicate::{BoundValue, MatchMode, Predicate};
