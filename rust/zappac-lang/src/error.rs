use thiserror::Error;

/// Input could not be turned into an executable node sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("nothing to evaluate")]
    Empty,
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("invalid number '{text}' at position {pos}")]
    InvalidNumber { text: String, pos: usize },
    #[error("unexpected {found} at position {pos}; expected {expected}")]
    Unexpected {
        found: String,
        expected: &'static str,
        pos: usize,
    },
    #[error("unknown output format '{name}' at position {pos}; expected dec, hex, oct or bin")]
    UnknownFormat { name: String, pos: usize },
}

/// A syntactically valid program failed while running.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecError {
    #[error("undefined variable '{0}'")]
    UndefinedVariable(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow in '{0}'")]
    Overflow(String),
    #[error("'{0}' requires integer operands")]
    IntegerRequired(String),
    #[error("shift amount {0} is out of range")]
    ShiftOutOfRange(i64),
    #[error("result is not a finite number")]
    NotFinite,
    #[error("no saved state named '{0}'")]
    UnknownSlot(String),
    #[error("malformed program: {0}")]
    Malformed(#[from] SyntaxError),
}

/// A serialized environment could not be restored.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("invalid state seed: {0}")]
    Json(#[from] serde_json::Error),
}
