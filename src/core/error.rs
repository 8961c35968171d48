use thiserror::Error;

/// Caller misuse the model refuses to turn into NaN or infinities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ModelError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        ModelError::InvalidArgument(msg.into())
    }
}
