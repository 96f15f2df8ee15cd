use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PositError {
    #[error("invalid posit environment (size {size}, max exponent size {max_exponent_size}): {reason}")]
    InvalidEnvironment {
        size: usize,
        max_exponent_size: u32,
        reason: &'static str,
    },

    /// Both pairs are `(size, max_exponent_size)`.
    #[error("posit environment mismatch: expected {expected:?}, found {found:?}")]
    EnvironmentMismatch {
        expected: (usize, u32),
        found: (usize, u32),
    },

    #[error("operand length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },
}

pub type Result<T> = std::result::Result<T, PositError>;
