//! Error types for the relayout library.

use thiserror::Error;

/// Result type alias for relayout operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during structure reconstruction.
///
/// The pipeline itself never fails on malformed geometry; these errors
/// surface only at configuration load and serialization time.
#[derive(Error, Debug)]
pub enum Error {
    /// A configuration value is outside its valid range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error serializing the document to JSON.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidConfig("indent_calibration_units_per_space must be positive".into());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: indent_calibration_units_per_space must be positive"
        );
    }
}
