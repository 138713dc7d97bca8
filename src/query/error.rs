use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum EvalError {
    #[error("Parse error at position {pos}: {message}")]
    Parse { message: String, pos: usize },

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("{function} expects {expected} argument(s), got {actual}")]
    Arity {
        function: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Type mismatch in {context}: expected {expected}, got {actual}")]
    TypeMismatch {
        context: &'static str,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Record conversion failed: {0}")]
    Record(String),
}

pub type Result<T> = std::result::Result<T, EvalError>;
