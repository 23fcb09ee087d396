//! Error type for fitting.

use mwc_core::{ConvergenceStatus, ValidationError};

/// Error returned when a model cannot be fit.
#[derive(Debug)]
pub enum FitError {
    /// The input data failed validation.
    Validation(ValidationError),

    /// The model's starting point lies outside its support.
    ///
    /// Raised when `initial_point` returns values that violate the model's
    /// own constraints, so the density there is not finite.
    InvalidInitialPoint {
        /// Log-density at the starting point.
        log_density: f64,
    },

    /// The optimizer never found a finite objective.
    Optimization {
        /// How the search ended.
        status: ConvergenceStatus,
    },

    /// Input JSON could not be parsed.
    Serialization(serde_json::Error),
}

impl std::fmt::Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "invalid input: {}", err),
            Self::InvalidInitialPoint { log_density } => write!(
                f,
                "log-density at the initial point is {} (must be finite)",
                log_density
            ),
            Self::Optimization { status } => {
                write!(f, "optimization failed with status {:?}", status)
            }
            Self::Serialization(err) => write!(f, "malformed JSON input: {}", err),
        }
    }
}

impl std::error::Error for FitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for FitError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<serde_json::Error> for FitError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err)
    }
}
