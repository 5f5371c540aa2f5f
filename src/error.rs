//! Error types for diagram construction and queries

use std::fmt;

/// Errors that can occur while building a diagram or querying it
///
/// Numerical degeneracies inside the sweep (parallel bisectors, empty cells)
/// are never reported here; they resolve to documented fallbacks instead.
#[derive(Debug, Clone, PartialEq)]
pub enum VoronoiError {
    /// Configuration validation failed
    InvalidConfig(String),
    /// Input points or weights violate the registration contract
    InvalidInput(String),
    /// Requested coordinate is not a registered site
    SiteNotFound {
        /// Queried x coordinate
        x: f64,
        /// Queried y coordinate
        y: f64,
    },
}

impl fmt::Display for VoronoiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoronoiError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            VoronoiError::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
            VoronoiError::SiteNotFound { x, y } => write!(f, "site not found: ({}, {})", x, y),
        }
    }
}

impl std::error::Error for VoronoiError {}

/// Result type alias for diagram operations
pub type Result<T> = std::result::Result<T, VoronoiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VoronoiError::SiteNotFound { x: 1.5, y: -2.0 };
        assert_eq!(err.to_string(), "site not found: (1.5, -2)");

        let err = VoronoiError::InvalidConfig("blend must be in (0, 1]".into());
        assert!(err.to_string().starts_with("invalid configuration"));
    }
}
