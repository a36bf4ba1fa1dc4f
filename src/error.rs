//! Error types for the rowlang pipeline.

use thiserror::Error;

/// Result type for rowlang operations.
pub type Result<T> = std::result::Result<T, LangError>;

/// Main error type, covering every pipeline stage.
#[derive(Debug, Error, PartialEq)]
pub enum LangError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Type error: {0}")]
    Type(#[from] TypeError),

    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),
}

/// Parse errors. A top-level parse succeeds only when exactly one derivation
/// consumes the whole input.
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("No valid parse")]
    NoParse,

    #[error("Ambiguous parse: {count} complete derivations")]
    Ambiguous { count: usize },

    #[error("Unconsumed input: {remainder:?}")]
    Trailing { remainder: String },
}

/// Type-checking errors.
#[derive(Debug, Error, PartialEq)]
pub enum TypeError {
    #[error("Undefined variable '{name}'")]
    UnboundVariable { name: String },

    #[error("Unknown operator '{name}'")]
    UnknownOperator { name: String },

    #[error("Cannot unify types: {left} == {right}")]
    Mismatch { left: String, right: String },

    #[error("Divergence: unfold limit reached comparing {left} == {right}")]
    UnfoldDivergence { left: String, right: String },

    #[error("Divergence: equation solving did not reach a fixpoint")]
    SolveDivergence,
}

/// Evaluation errors.
#[derive(Debug, Error, PartialEq)]
pub enum EvalError {
    #[error("Undefined variable '{name}'")]
    UnboundVariable { name: String },

    #[error("Unknown operator '{name}'")]
    UnknownOperator { name: String },

    #[error("Value is not a function")]
    NotAFunction,

    #[error("Record has no field '{label}'")]
    MissingField { label: String },

    #[error("No handler for tag '{label}'")]
    UnhandledTag { label: String },

    #[error("Value does not match pattern")]
    PatternMismatch,

    #[error("Import of '{name}' failed")]
    ImportFailed { name: String },
}
