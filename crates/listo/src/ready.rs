//! The declarative readiness rule model.
//!
//! A [`Ready`] rule states the conditions under which one element (or one
//! nested component) counts as ready for interaction: presence, visibility,
//! text content, CSS class membership, and match cardinality. A [`Loader`]
//! rule is its inverse, for transient loading indicators that must be gone or
//! invisible before a page is usable. Rules are plain data; evaluation lives
//! in [`Validator`](crate::Validator).

use std::fmt;

use crate::result::{ListoError, ListoResult};

/// Document ready states as reported by the browser.
///
/// Modeled as a rule gate but not yet evaluated by the validator; see
/// [`Ready::document_is`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentState {
    /// Document state has not been requested
    #[default]
    Uninitialized,
    /// The document is still loading
    Loading,
    /// The document has loaded
    Loaded,
    /// The document is interactive
    Interactive,
    /// The document and all sub-resources are complete
    Complete,
}

impl DocumentState {
    /// The string the browser reports for this state
    #[must_use]
    pub const fn browser_string(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Loading => "loading",
            Self::Loaded => "loaded",
            Self::Interactive => "interactive",
            Self::Complete => "complete",
        }
    }

    /// Identify a state from a browser-reported string, case-insensitively.
    ///
    /// # Errors
    ///
    /// Fails with [`ListoError::UnknownDocumentState`] if nothing matches.
    pub fn identify(browser_string: &str) -> ListoResult<Self> {
        [
            Self::Uninitialized,
            Self::Loading,
            Self::Loaded,
            Self::Interactive,
            Self::Complete,
        ]
        .into_iter()
        .find(|state| state.browser_string().eq_ignore_ascii_case(browser_string))
        .ok_or_else(|| ListoError::UnknownDocumentState {
            value: browser_string.to_string(),
        })
    }
}

impl fmt::Display for DocumentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.browser_string())
    }
}

/// How many elements a locator must resolve to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountConstraint {
    /// Any number of matches, including zero
    #[default]
    Unconstrained,
    /// Exactly this many matches (applies when greater than zero)
    Exactly(u32),
    /// Inclusive bounds; either side may be open (applies when greater than zero)
    Between {
        /// Minimum match count, inclusive
        at_least: Option<u32>,
        /// Maximum match count, inclusive
        at_most: Option<u32>,
    },
}

/// Declarative expectation for one element or nested component.
///
/// The default rule requires only presence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ready {
    /// Document state the page must be in before this field is checked.
    ///
    /// Reserved: the validator does not evaluate this gate yet.
    pub document_is: DocumentState,
    /// Whether the element must also be displayed
    pub when_visible: bool,
    /// Text the element's visible text must contain, if any
    pub when_text_contains: Option<String>,
    /// CSS classes the element must all carry, if any
    pub if_has_css_classes: Vec<String>,
    /// Constraint on the number of matching elements
    pub count: CountConstraint,
}

impl Ready {
    /// A rule requiring only presence
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the document to be in `state` before checking this field
    #[must_use]
    pub const fn document_is(mut self, state: DocumentState) -> Self {
        self.document_is = state;
        self
    }

    /// Require the element to be displayed
    #[must_use]
    pub const fn visible(mut self) -> Self {
        self.when_visible = true;
        self
    }

    /// Require the element's visible text to contain `text`
    #[must_use]
    pub fn text_contains(mut self, text: impl Into<String>) -> Self {
        self.when_text_contains = Some(text.into());
        self
    }

    /// Require the element to carry every class in `classes`
    #[must_use]
    pub fn css_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.if_has_css_classes = classes.into_iter().map(Into::into).collect();
        self
    }

    /// Require exactly `count` matches.
    ///
    /// An exact count supersedes any bounds set before or after it.
    #[must_use]
    pub const fn count_exactly(mut self, count: u32) -> Self {
        self.count = CountConstraint::Exactly(count);
        self
    }

    /// Require at least `count` matches (inclusive).
    ///
    /// Ignored if an exact count is already set.
    #[must_use]
    pub fn count_at_least(mut self, count: u32) -> Self {
        self.count = match self.count {
            CountConstraint::Exactly(exact) => CountConstraint::Exactly(exact),
            CountConstraint::Between { at_most, .. } => CountConstraint::Between {
                at_least: Some(count),
                at_most,
            },
            CountConstraint::Unconstrained => CountConstraint::Between {
                at_least: Some(count),
                at_most: None,
            },
        };
        self
    }

    /// Require at most `count` matches (inclusive).
    ///
    /// Ignored if an exact count is already set.
    #[must_use]
    pub fn count_at_most(mut self, count: u32) -> Self {
        self.count = match self.count {
            CountConstraint::Exactly(exact) => CountConstraint::Exactly(exact),
            CountConstraint::Between { at_least, .. } => CountConstraint::Between {
                at_least,
                at_most: Some(count),
            },
            CountConstraint::Unconstrained => CountConstraint::Between {
                at_least: None,
                at_most: Some(count),
            },
        };
        self
    }
}

/// Inverted expectation for transient loading indicators.
///
/// Attached alongside a [`Ready`] rule on the same field, a loader rule flips
/// the presence/visibility expectations: the indicator must be gone from the
/// DOM, or at least not displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Loader {
    /// The indicator must no longer be present in the DOM
    pub must_be_gone: bool,
    /// The indicator must not be displayed
    pub must_be_invisible: bool,
}

impl Default for Loader {
    fn default() -> Self {
        Self {
            must_be_gone: false,
            must_be_invisible: true,
        }
    }
}

impl Loader {
    /// A loader that must be invisible (the default)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A loader that must be gone from the DOM entirely
    #[must_use]
    pub const fn gone() -> Self {
        Self {
            must_be_gone: true,
            must_be_invisible: true,
        }
    }

    /// Set whether the indicator must be gone from the DOM
    #[must_use]
    pub const fn with_must_be_gone(mut self, gone: bool) -> Self {
        self.must_be_gone = gone;
        self
    }

    /// Set whether the indicator must be invisible
    #[must_use]
    pub const fn with_must_be_invisible(mut self, invisible: bool) -> Self {
        self.must_be_invisible = invisible;
        self
    }
}
