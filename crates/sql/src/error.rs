//! Error types for the SQL engine core

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Comparison and coercion errors
    #[error("Invalid regular expression: {0}")]
    InvalidRegexp(String),

    #[error("nil operand found in comparison")]
    NilOperand,

    #[error("right operand in IN operation must be tuple, but is {0}")]
    UnsupportedInOperand(String),

    #[error("operand should have {expected} columns, but has {actual}")]
    InvalidOperandColumns { expected: usize, actual: usize },

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    // Analysis errors
    #[error("exceeded max analysis iterations ({0})")]
    MaxAnalysisIters(usize),

    #[error("error in analysis: {0}")]
    InAnalysis(String),

    #[error("{context}: invalid node of type: {actual}")]
    InvalidNodeType { context: String, actual: String },

    #[error("invalid children number for {node}: got {got}, want {want}")]
    InvalidChildrenNumber {
        node: String,
        got: usize,
        want: usize,
    },

    // Catalog errors
    #[error("Database not found: {0}")]
    DatabaseNotFound(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Function not found: {0}")]
    FunctionNotFound(String),

    // Execution errors
    #[error("query cancelled")]
    Cancelled,

    #[error("Execution error: {0}")]
    ExecutionError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Shorthand for the structural child-count error raised by
    /// `with_children` implementations.
    pub fn invalid_children(node: impl Into<String>, got: usize, want: usize) -> Self {
        Error::InvalidChildrenNumber {
            node: node.into(),
            got,
            want,
        }
    }
}
