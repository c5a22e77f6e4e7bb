//! Error types for the router
//!
//! Unmatched URLs are not errors (they resolve to the not-found view) and
//! superseded resolutions are silently discarded, so the error surface is
//! small: misuse of the navigation API, malformed locations, and broken
//! hydration payloads.

use std::fmt;

/// Errors returned by router operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// A navigation operation was invoked before a router instance existed
    /// (or after it was dropped)
    Uninitialized,

    /// A location referenced a route name that is not registered
    UnknownRoute { name: String },

    /// A named location is missing an argument required by the route pattern
    MissingArgument { route: String, argument: String },

    /// A location carried neither a route name nor a path
    EmptyLocation,

    /// A route pattern failed validation
    InvalidPattern { pattern: String, message: String },

    /// A serialized initial view could not be encoded or decoded
    Hydration { message: String },
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::Uninitialized => write!(
                f,
                "Router is not created, make sure the router is built before navigating"
            ),
            RouterError::UnknownRoute { name } => {
                write!(f, "Unknown route name: {}", name)
            }
            RouterError::MissingArgument { route, argument } => {
                write!(f, "Route '{}' requires argument '{}'", route, argument)
            }
            RouterError::EmptyLocation => {
                write!(f, "Location has neither a route name nor a path")
            }
            RouterError::InvalidPattern { pattern, message } => {
                write!(f, "Invalid route pattern '{}': {}", pattern, message)
            }
            RouterError::Hydration { message } => {
                write!(f, "Hydration failed: {}", message)
            }
        }
    }
}

impl std::error::Error for RouterError {}

impl RouterError {
    /// Check if this error means no router exists
    pub fn is_uninitialized(&self) -> bool {
        matches!(self, RouterError::Uninitialized)
    }

    /// Check if this error comes from a malformed location
    pub fn is_bad_location(&self) -> bool {
        matches!(
            self,
            RouterError::UnknownRoute { .. }
                | RouterError::MissingArgument { .. }
                | RouterError::EmptyLocation
        )
    }
}

impl From<serde_json::Error> for RouterError {
    fn from(err: serde_json::Error) -> Self {
        RouterError::Hydration {
            message: err.to_string(),
        }
    }
}

/// Error type returned by scroll-edge continuations.
///
/// Continuation failures are logged and swallowed by the scroll controller.
pub type EdgeError = Box<dyn std::error::Error>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uninitialized_display() {
        let error = RouterError::Uninitialized;
        assert!(error.is_uninitialized());
        assert!(error.to_string().starts_with("Router is not created"));
    }

    #[test]
    fn test_bad_location_kinds() {
        assert!(RouterError::EmptyLocation.is_bad_location());
        assert!(RouterError::UnknownRoute {
            name: "user".to_string()
        }
        .is_bad_location());
        assert!(!RouterError::Uninitialized.is_bad_location());
    }

    #[test]
    fn test_missing_argument_display() {
        let error = RouterError::MissingArgument {
            route: "user".to_string(),
            argument: "id".to_string(),
        };
        assert_eq!(error.to_string(), "Route 'user' requires argument 'id'");
    }

    #[test]
    fn test_from_serde_error() {
        let err = serde_json::from_str::<u32>("nope").unwrap_err();
        let error: RouterError = err.into();
        assert!(matches!(error, RouterError::Hydration { .. }));
    }
}
