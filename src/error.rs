// src/error.rs

//! Error types for the picardo crate.

use std::fmt;

/// Errors that can occur while setting up or running the solver.
#[derive(Debug, Clone)]
pub enum PicardoError {
    /// Input dimensions are invalid.
    InvalidDimensions {
        /// Description of the dimension error.
        message: String,
    },

    /// A singular matrix was encountered during computation.
    SingularMatrix,

    /// General computation error.
    ComputationError {
        /// Description of what went wrong.
        message: String,
    },

    /// Invalid configuration parameter.
    InvalidConfig {
        /// Name of the invalid parameter.
        parameter: String,
        /// Description of why it's invalid.
        message: String,
    },
}

impl fmt::Display for PicardoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PicardoError::InvalidDimensions { message } => {
                write!(f, "Invalid dimensions: {}", message)
            }
            PicardoError::SingularMatrix => {
                write!(f, "Singular matrix encountered during computation")
            }
            PicardoError::ComputationError { message } => {
                write!(f, "Computation error: {}", message)
            }
            PicardoError::InvalidConfig { parameter, message } => {
                write!(f, "Invalid configuration for '{}': {}", parameter, message)
            }
        }
    }
}

impl std::error::Error for PicardoError {}

/// Convenience type alias for Results with PicardoError.
pub type Result<T> = std::result::Result<T, PicardoError>;
