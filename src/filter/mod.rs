//! Filter trees and their two compilers.
//!
//! A tree built with [`comparison`], [`group`], [`and`], [`or`] and [`not`]
//! compiles to a record predicate ([`compile_predicate`]) or to a Gridify
//! query envelope ([`compile_query`]). [`Filter`] ties both to an
//! [`Evaluator`].

pub mod builder;
pub mod facade;
pub mod gridify;
pub mod node;
pub mod operators;
pub mod predicate;

pub use builder::{and, comparison, comparison_with_id, group, not, or, GroupItem};
pub use facade::{Evaluator, Filter};
pub use gridify::{compile_query, QueryEnvelope, QueryOptions};
pub use node::{FilterNode, LogicalOp, NodeId, NodeKind, Scalar};
pub use operators::ComparisonOp;
pub use predicate::compile_predicate;
