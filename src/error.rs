// src/error.rs
use thiserror::Error;

/// Error type for the garch-fx library
#[derive(Debug, Error)]
pub enum SdeError {
    /// A scalar parameter is outside its admissible domain
    #[error("Invalid parameter '{parameter}' = {value}: {constraint}")]
    InvalidParameters {
        parameter: String,
        value: f64,
        constraint: String,
    },

    /// Structurally invalid configuration (dimensions, probabilities, counts)
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfiguration { field: String, reason: String },

    /// A simulator produced a variance outside its domain
    #[error("Numerical instability in {method}: {reason}")]
    NumericalInstability { method: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl SdeError {
    /// True for the fatal configuration family (bad parameters or structure).
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            SdeError::InvalidParameters { .. }
                | SdeError::InvalidConfiguration { .. }
                | SdeError::Json(_)
        )
    }

    pub(crate) fn instability(method: &str, reason: impl Into<String>) -> Self {
        SdeError::NumericalInstability {
            method: method.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn configuration(field: &str, reason: impl Into<String>) -> Self {
        SdeError::InvalidConfiguration {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for garch-fx operations
pub type SdeResult<T> = Result<T, SdeError>;

/// Validation utilities
pub mod validation {
    use super::{SdeError, SdeResult};

    fn invalid(name: &str, value: f64, constraint: impl Into<String>) -> SdeError {
        SdeError::InvalidParameters {
            parameter: name.to_string(),
            value,
            constraint: constraint.into(),
        }
    }

    /// Validate that a parameter is finite and strictly positive
    pub fn validate_positive(name: &str, value: f64) -> SdeResult<()> {
        validate_finite(name, value)?;
        if value <= 0.0 {
            Err(invalid(name, value, "must be positive (> 0)"))
        } else {
            Ok(())
        }
    }

    /// Validate that a parameter is finite and non-negative
    pub fn validate_non_negative(name: &str, value: f64) -> SdeResult<()> {
        validate_finite(name, value)?;
        if value < 0.0 {
            Err(invalid(name, value, "must be non-negative (≥ 0)"))
        } else {
            Ok(())
        }
    }

    /// Validate that a parameter is within a closed range
    pub fn validate_range(name: &str, value: f64, min: f64, max: f64) -> SdeResult<()> {
        if !(min..=max).contains(&value) {
            Err(invalid(
                name,
                value,
                format!("must be in range [{}, {}]", min, max),
            ))
        } else {
            Ok(())
        }
    }

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &str, value: f64) -> SdeResult<()> {
        if !value.is_finite() {
            Err(invalid(name, value, "must be finite (not NaN or infinite)"))
        } else {
            Ok(())
        }
    }

    /// Validate the number of independent Monte Carlo runs
    pub fn validate_paths(paths: usize) -> SdeResult<()> {
        if paths == 0 {
            Err(SdeError::configuration("runs", "must be greater than 0"))
        } else if paths > 10_000_000 {
            Err(SdeError::configuration(
                "runs",
                "exceeds maximum allowed (10 million)",
            ))
        } else {
            Ok(())
        }
    }

    /// Validate a time-grid or horizon step count
    pub fn validate_steps(name: &str, steps: usize) -> SdeResult<()> {
        if steps == 0 {
            Err(SdeError::configuration(name, "must be greater than 0"))
        } else if steps > 1_000_000 {
            Err(SdeError::configuration(
                name,
                "exceeds maximum allowed (1,000,000)",
            ))
        } else {
            Ok(())
        }
    }
}
