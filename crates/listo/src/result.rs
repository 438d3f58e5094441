//! Result and error types for Listo.

use thiserror::Error;

use crate::locator::By;

/// Result type for Listo operations
pub type ListoResult<T> = Result<T, ListoError>;

/// Errors that can occur in Listo
#[derive(Debug, Error)]
pub enum ListoError {
    /// No element matched a locator
    #[error("no element found for locator '{locator}'")]
    ElementNotFound {
        /// The locator that failed to resolve
        locator: String,
    },

    /// Elements resolved, but none satisfied the predicate
    #[error("elements found for locator '{locator}', but none satisfied the predicate")]
    PredicateNoMatch {
        /// The locator that was searched
        locator: String,
    },

    /// A predicate search had nothing to test against
    #[error("no elements found for locator '{locator}' to test against the predicate")]
    PredicateSourceEmpty {
        /// The locator that was searched
        locator: String,
    },

    /// A polling wait exhausted its deadline
    #[error("timed out after {ms}ms waiting for the first found element to match the condition")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// The last resolution failure seen while polling, if any. Absent when
        /// every poll found an element but the condition never passed.
        #[source]
        cause: Option<Box<ListoError>>,
    },

    /// Locator composition across incompatible kinds
    #[error("containers only support CSS locators, the container supplied uses: '{kind}'")]
    UnsupportedComposition {
        /// The container's locator kind
        kind: By,
    },

    /// A readiness rule points at something it cannot validate
    #[error("invalid readiness rule target: {message}")]
    InvalidRuleTarget {
        /// What was wrong with the target
        message: String,
    },

    /// Store lookup with an empty key
    #[error("store key cannot be empty")]
    EmptyKey,

    /// Store lookup miss
    #[error("no value in the store for key '{key}'")]
    KeyNotFound {
        /// The key that was looked up
        key: String,
    },

    /// A template placeholder could not be resolved against the store
    #[error("attempted to interpolate '${{{placeholder}}}' but a match was not found in the store")]
    InterpolationKeyNotFound {
        /// The placeholder identifier that missed
        placeholder: String,
        /// The underlying lookup failure
        #[source]
        source: Box<ListoError>,
    },

    /// Interpolation ran past the expansion limit (cyclic substitution)
    #[error("template interpolation did not settle after {limit} expansions")]
    InterpolationDepthExceeded {
        /// The expansion limit that was hit
        limit: usize,
    },

    /// Access through a Session or DriverEnvironment that has been closed
    #[error("the session has already been closed")]
    SessionClosed,

    /// The browser window is already open
    #[error("the driver instance is not closed, is the browser already open?")]
    BrowserAlreadyOpen,

    /// The browser window is not open
    #[error("the browser is not open for this session")]
    BrowserNotOpen,

    /// Navigation failed
    #[error("navigation to '{url}' failed: {message}")]
    Navigation {
        /// The URL that was attempted
        url: String,
        /// Error detail from the driver
        message: String,
    },

    /// A session host was empty or otherwise unusable
    #[error("invalid session host: {message}")]
    InvalidHost {
        /// What was wrong with the host
        message: String,
    },

    /// A browser name that no known profile matches
    #[error("could not identify a browser by the name of '{name}'")]
    UnknownBrowser {
        /// The name that failed to match
        name: String,
    },

    /// A document ready-state string the model does not know
    #[error("could not identify a document state from the browser string: '{value}'")]
    UnknownDocumentState {
        /// The string that failed to match
        value: String,
    },

    /// A required configuration property was not set
    #[error("the property '{name}' is not defined")]
    PropertyUndefined {
        /// The property name
        name: String,
    },

    /// Opaque failure surfaced by the embedder's driver implementation
    #[error("driver error: {message}")]
    Driver {
        /// Error detail
        message: String,
    },

    /// JSON (de)serialization error from store values or script results
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_without_cause_has_no_source() {
        use std::error::Error;
        let err = ListoError::Timeout { ms: 500, cause: None };
        assert!(err.source().is_none());
        assert!(err.to_string().contains("500ms"));
    }

    #[test]
    fn test_timeout_carries_not_found_cause() {
        use std::error::Error;
        let cause = ListoError::ElementNotFound {
            locator: "css 'div.gone'".to_string(),
        };
        let err = ListoError::Timeout {
            ms: 10_000,
            cause: Some(Box::new(cause)),
        };
        let source = err.source().map(ToString::to_string);
        assert_eq!(
            source.as_deref(),
            Some("no element found for locator 'css 'div.gone''")
        );
    }

    #[test]
    fn test_interpolation_miss_names_placeholder() {
        let err = ListoError::InterpolationKeyNotFound {
            placeholder: "missing".to_string(),
            source: Box::new(ListoError::KeyNotFound {
                key: "missing".to_string(),
            }),
        };
        assert!(err.to_string().contains("${missing}"));
    }

    #[test]
    fn test_unsupported_composition_names_kind() {
        let err = ListoError::UnsupportedComposition { kind: By::XPath };
        assert!(err.to_string().contains("XPATH"));
    }
}
