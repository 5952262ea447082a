use thiserror::Error;

/// Rejected formula text. Raised by `compile`, before any sampling starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionSyntaxError {
    #[error("expression is empty")]
    Empty,
    #[error("syntax error at {line}:{column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },
    #[error("invalid number literal `{0}`")]
    InvalidNumber(String),
    #[error("unknown variable `{0}` (only `x` and `z` are defined)")]
    UnknownVariable(String),
    #[error("unknown function `{0}`")]
    UnknownFunction(String),
    #[error("`{name}` expects {expected} argument(s), got {found}")]
    Arity {
        name: String,
        expected: String,
        found: usize,
    },
}

/// A sampled point has no real, finite height.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    #[error("`{operation}` has no real value at x = {x}, z = {z}")]
    NonReal {
        operation: &'static str,
        x: f64,
        z: f64,
    },
    #[error("expression evaluates to {value} at x = {x}, z = {z}")]
    NonFinite { value: f64, x: f64, z: f64 },
    #[error("{value} at x = {x}, z = {z} is too large for a vertex buffer")]
    OutOfRange { value: f64, x: f64, z: f64 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridConfigError {
    #[error("ring count must be at least 1")]
    NoRings,
    #[error("angular segment count must be at least 3, got {0}")]
    TooFewSegments(usize),
    #[error("{name} must be positive and finite, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("grid of {rings} rings x {segments} segments exceeds {max} triangles")]
    TooLarge {
        rings: usize,
        segments: usize,
        max: usize,
    },
}

/// Why a refresh was abandoned. The scene is left untouched in every case.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RefreshError {
    #[error("no expression has been set")]
    NoExpression,
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}
