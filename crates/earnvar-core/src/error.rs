use thiserror::Error;

/// Validation errors raised while normalizing upstream or user input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid date '{value}', expected {expected}")]
    InvalidDate {
        value: String,
        expected: &'static str,
    },
    #[error("invalid price '{value}'")]
    InvalidPrice { value: String },

    #[error("history limit must be greater than zero")]
    ZeroHistoryLimit,
}
