//! Locator abstraction for element selection.
//!
//! A [`Locator`] is a pattern plus an interpretation kind ([`By`]). It never
//! caches a resolved element: every access through the resolution layer
//! re-queries the driver, which greatly reduces stale-reference failures when
//! the DOM mutates between accesses.

use std::fmt;

use crate::result::{ListoError, ListoResult};

/// How a locator pattern is interpreted by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum By {
    /// CSS selector (e.g. `button.primary`)
    Css,
    /// XPath expression
    XPath,
    /// Element id attribute
    Id,
    /// Exact anchor text
    LinkText,
    /// Substring of anchor text
    PartialLinkText,
    /// Tag name
    TagName,
    /// Single CSS class name
    ClassName,
}

impl By {
    /// Stable name used in logs and error messages
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Css => "CSS",
            Self::XPath => "XPATH",
            Self::Id => "ID",
            Self::LinkText => "LINK_TEXT",
            Self::PartialLinkText => "PARTIAL_LINK_TEXT",
            Self::TagName => "TAG_NAME",
            Self::ClassName => "CLASS_NAME",
        }
    }
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A pattern + kind pair identifying zero or more UI elements.
///
/// Immutable after construction; cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    pattern: String,
    kind: By,
}

impl Locator {
    /// Create a locator with an explicit kind
    #[must_use]
    pub fn new(pattern: impl Into<String>, kind: By) -> Self {
        Self {
            pattern: pattern.into(),
            kind,
        }
    }

    /// Create a CSS locator
    #[must_use]
    pub fn css(pattern: impl Into<String>) -> Self {
        Self::new(pattern, By::Css)
    }

    /// Create an XPath locator
    #[must_use]
    pub fn xpath(pattern: impl Into<String>) -> Self {
        Self::new(pattern, By::XPath)
    }

    /// Create an id locator
    #[must_use]
    pub fn id(pattern: impl Into<String>) -> Self {
        Self::new(pattern, By::Id)
    }

    /// Create a link-text locator
    #[must_use]
    pub fn link_text(pattern: impl Into<String>) -> Self {
        Self::new(pattern, By::LinkText)
    }

    /// Create a partial link-text locator
    #[must_use]
    pub fn partial_link_text(pattern: impl Into<String>) -> Self {
        Self::new(pattern, By::PartialLinkText)
    }

    /// Create a tag-name locator
    #[must_use]
    pub fn tag_name(pattern: impl Into<String>) -> Self {
        Self::new(pattern, By::TagName)
    }

    /// Create a class-name locator
    #[must_use]
    pub fn class_name(pattern: impl Into<String>) -> Self {
        Self::new(pattern, By::ClassName)
    }

    /// Get the pattern string
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Get the interpretation kind
    #[must_use]
    pub const fn kind(&self) -> By {
        self.kind
    }

    /// Derive a locator scoped inside a container locator.
    ///
    /// Only CSS containers are supported: the derived pattern is the trimmed
    /// container pattern, a space, and `child_css` (descendant combinator).
    ///
    /// # Errors
    ///
    /// Fails with [`ListoError::UnsupportedComposition`] if the container's
    /// kind is not [`By::Css`].
    pub fn within(container: &Self, child_css: impl Into<String>) -> ListoResult<Self> {
        // TODO: support composing the remaining kinds, as well as mix-and-match
        if container.kind != By::Css {
            return Err(ListoError::UnsupportedComposition {
                kind: container.kind,
            });
        }
        Ok(Self::css(format!(
            "{} {}",
            container.pattern.trim(),
            child_css.into()
        )))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind, self.pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod by_tests {
        use super::*;

        #[test]
        fn test_by_names() {
            assert_eq!(By::Css.as_str(), "CSS");
            assert_eq!(By::XPath.as_str(), "XPATH");
            assert_eq!(By::PartialLinkText.as_str(), "PARTIAL_LINK_TEXT");
        }

        #[test]
        fn test_by_display() {
            assert_eq!(format!("{}", By::ClassName), "CLASS_NAME");
        }
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_constructors_set_kind() {
            assert_eq!(Locator::css("div").kind(), By::Css);
            assert_eq!(Locator::xpath("//div").kind(), By::XPath);
            assert_eq!(Locator::id("main").kind(), By::Id);
            assert_eq!(Locator::link_text("Home").kind(), By::LinkText);
            assert_eq!(Locator::partial_link_text("Ho").kind(), By::PartialLinkText);
            assert_eq!(Locator::tag_name("nav").kind(), By::TagName);
            assert_eq!(Locator::class_name("active").kind(), By::ClassName);
        }

        #[test]
        fn test_pattern_preserved() {
            let locator = Locator::css("ul.results > li");
            assert_eq!(locator.pattern(), "ul.results > li");
        }

        #[test]
        fn test_display_includes_kind_and_pattern() {
            let locator = Locator::id("login-form");
            assert_eq!(locator.to_string(), "ID 'login-form'");
        }
    }

    mod composition_tests {
        use super::*;

        #[test]
        fn test_within_concatenates_with_descendant_combinator() {
            let container = Locator::css("div.modal");
            let child = Locator::within(&container, "button.close").unwrap();
            assert_eq!(child.pattern(), "div.modal button.close");
            assert_eq!(child.kind(), By::Css);
        }

        #[test]
        fn test_within_trims_container_pattern() {
            let container = Locator::css("  div.modal  ");
            let child = Locator::within(&container, "input").unwrap();
            assert_eq!(child.pattern(), "div.modal input");
        }

        #[test]
        fn test_within_rejects_every_non_css_kind() {
            for kind in [
                By::XPath,
                By::Id,
                By::LinkText,
                By::PartialLinkText,
                By::TagName,
                By::ClassName,
            ] {
                let container = Locator::new("anything", kind);
                let result = Locator::within(&container, "div");
                assert!(matches!(
                    result,
                    Err(ListoError::UnsupportedComposition { kind: k }) if k == kind
                ));
            }
        }
    }

    mod composition_properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn within_always_equals_trimmed_container_space_child(
                container in "[a-z][a-z0-9 .#>-]{0,30}",
                child in "[a-z][a-z0-9.#-]{0,15}",
            ) {
                let parent = Locator::css(container.clone());
                let derived = Locator::within(&parent, child.clone()).unwrap();
                prop_assert_eq!(
                    derived.pattern(),
                    format!("{} {}", container.trim(), child)
                );
                prop_assert_eq!(derived.kind(), By::Css);
            }
        }
    }
}
