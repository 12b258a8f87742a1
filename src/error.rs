use thiserror::Error;

/// Errors surfaced by the allocation core.
///
/// Only argument validation can fail; analysis, estimation and history
/// bookkeeping are total over well-formed inputs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, AllocError>;

impl AllocError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        AllocError::InvalidArgument(msg.into())
    }
}
