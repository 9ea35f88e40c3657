use thiserror::Error;

/// Errors from the relaxed JSON decoder. Offsets are byte offsets into the
/// input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid input at offset {0}")]
    Invalid(usize),
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("unexpected trailing input at offset {0}")]
    Trailing(usize),
    #[error("invalid number at offset {0}")]
    InvalidNumber(usize),
    #[error("invalid object key at offset {0}")]
    InvalidKey(usize),
    #[error("nesting too deep at offset {0}")]
    TooDeep(usize),
}
