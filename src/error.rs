//! Error type shared by the optimizers and the network.
use thiserror::Error;

/// Errors raised by the gradient descent routines and the feed-forward network.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MlError {
    #[error("Dimension mismatch in {context}: expected {expected}, got {got}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),
}

impl MlError {
    pub(crate) fn mismatch(context: &'static str, expected: usize, got: usize) -> Self {
        MlError::DimensionMismatch {
            context,
            expected,
            got,
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        MlError::InvalidConfiguration(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, MlError>;
