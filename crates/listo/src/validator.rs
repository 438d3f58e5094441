//! Readiness validation: walks a loadable's rule registry and decides whether
//! everything it structurally owns is ready for interaction.
//!
//! Validation is deliberately boolean: "not ready yet" is an expected,
//! poll-worthy outcome, so violations are logged and absorbed into `false`
//! rather than raised. Only programming faults, such as a rule on an empty locator,
//! surface as errors.

use crate::loadable::{Loadable, RuleEntry, RuleSet, RuleTarget};
use crate::ready::{CountConstraint, DocumentState, Loader, Ready};
use crate::result::{ListoError, ListoResult};
use crate::selector::Selector;

/// Evaluates [`Ready`]/[`Loader`] rules against live element state
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator;

impl Validator {
    /// Create a validator
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Validate a loadable's whole rule tree.
    ///
    /// Layers are walked most-base first, entries in declaration order, and
    /// the walk short-circuits: the first violation anywhere fails the whole
    /// validation immediately, without resolving later fields.
    pub fn validate(&self, loadable: &dyn Loadable) -> ListoResult<bool> {
        self.validate_rules(&loadable.rules())
    }

    fn validate_rules(&self, rules: &RuleSet<'_>) -> ListoResult<bool> {
        for layer in rules.layers() {
            for entry in &layer.entries {
                if !self.validate_entry(entry)? {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    fn validate_entry(&self, entry: &RuleEntry<'_>) -> ListoResult<bool> {
        match entry.target {
            RuleTarget::Element(selector) => {
                self.validate_selector(entry.field, selector, &entry.ready, entry.loader.as_ref())
            }
            RuleTarget::Nested(component) => {
                // The container is gated by this entry's rules first; only
                // then does validation descend into the component's own tree.
                if !self.validate_selector(
                    entry.field,
                    component.container(),
                    &entry.ready,
                    entry.loader.as_ref(),
                )? {
                    return Ok(false);
                }
                self.validate_rules(&component.rules())
            }
        }
    }

    /// Validate one selector against a rule pair.
    ///
    /// Steps run in a fixed order (presence, visibility, text, classes,
    /// cardinality) and each step re-resolves the locator, so every check
    /// sees current state rather than a snapshot.
    pub fn validate_selector(
        &self,
        field: &str,
        selector: &Selector,
        ready: &Ready,
        loader: Option<&Loader>,
    ) -> ListoResult<bool> {
        let locator = selector.locator().clone();
        if locator.pattern().is_empty() {
            return Err(ListoError::InvalidRuleTarget {
                message: format!("the selector for field '{field}' has an empty locator pattern"),
            });
        }

        if ready.document_is != DocumentState::Uninitialized {
            // Reserved gate; modeled but not evaluated yet.
            tracing::debug!(
                field,
                state = %ready.document_is,
                "document state gate declared but not evaluated"
            );
        }

        // Presence. A loader that must be gone inverts the expectation; a
        // loader that merely must be invisible imposes none.
        match loader {
            Some(rule) if rule.must_be_gone => {
                if selector.is_present()? {
                    tracing::warn!(
                        field,
                        %locator,
                        "loader element is required to be gone, but is present"
                    );
                    return Ok(false);
                }
            }
            Some(_) => {}
            None => {
                if !selector.is_present()? {
                    tracing::warn!(field, %locator, "element must be present, but is not");
                    return Ok(false);
                }
            }
        }

        // Visibility. Again inverted for loaders; an absent loader counts as
        // not displayed.
        match loader {
            Some(rule) if rule.must_be_invisible => {
                let displayed = match selector.is_displayed() {
                    Ok(displayed) => displayed,
                    Err(ListoError::ElementNotFound { .. }) => false,
                    Err(other) => return Err(other),
                };
                if displayed {
                    tracing::warn!(
                        field,
                        %locator,
                        "loader element is required to be invisible, but is visible"
                    );
                    return Ok(false);
                }
            }
            Some(_) => {}
            None => {
                if ready.when_visible && !selector.is_displayed()? {
                    tracing::warn!(field, %locator, "element must be visible, but is not");
                    return Ok(false);
                }
            }
        }

        // From here on the loader distinction no longer matters.

        // Text containment.
        if let Some(expected) = ready
            .when_text_contains
            .as_deref()
            .filter(|text| !text.is_empty())
        {
            let text = selector.text()?;
            if !text.contains(expected) {
                tracing::warn!(
                    field,
                    %locator,
                    expected,
                    actual = %text,
                    "element text does not contain the expected text"
                );
                return Ok(false);
            }
        }

        // CSS class membership.
        if !ready.if_has_css_classes.is_empty()
            && !selector.has_css_classes(&ready.if_has_css_classes)?
        {
            tracing::warn!(
                field,
                %locator,
                expected = ?ready.if_has_css_classes,
                actual = ?selector.css_classes()?,
                "element does not have all the expected CSS classes"
            );
            return Ok(false);
        }

        // Cardinality.
        let count = selector.get_multiple()?.len() as u32;
        match ready.count {
            CountConstraint::Exactly(expected) if expected > 0 => {
                if count != expected {
                    tracing::warn!(
                        field,
                        %locator,
                        expected,
                        actual = count,
                        "expected an exact number of elements"
                    );
                    return Ok(false);
                }
            }
            CountConstraint::Exactly(_) | CountConstraint::Unconstrained => {}
            CountConstraint::Between { at_least, at_most } => {
                if let Some(minimum) = at_least.filter(|minimum| *minimum > 0) {
                    if count < minimum {
                        tracing::warn!(
                            field,
                            %locator,
                            minimum,
                            actual = count,
                            "expected at least a number of elements"
                        );
                        return Ok(false);
                    }
                }
                if let Some(maximum) = at_most.filter(|maximum| *maximum > 0) {
                    if count > maximum {
                        tracing::warn!(
                            field,
                            %locator,
                            maximum,
                            actual = count,
                            "expected at most a number of elements"
                        );
                        return Ok(false);
                    }
                }
            }
        }

        Ok(true)
    }
}
