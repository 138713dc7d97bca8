pub mod dataset;
pub mod filter;
pub mod query;

pub use filter::{
    and, comparison, compile_predicate, compile_query, group, not, or, ComparisonOp, Evaluator,
    Filter, FilterNode, QueryEnvelope, QueryOptions, Scalar,
};
pub use query::{EvalError, RecordEvaluator};
