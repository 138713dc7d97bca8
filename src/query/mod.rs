pub mod ast;
pub mod error;
pub mod eval;
pub mod parser;

pub use error::EvalError;
pub use eval::{evaluate, RecordEvaluator};
pub use parser::parse;
