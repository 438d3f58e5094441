//! Session-bound element resolution.
//!
//! A [`Selector`] pairs a [`Locator`] with the [`Session`] whose driver
//! resolves it. Resolution happens on every access: a selector never holds
//! onto an element handle, so DOM mutations between accesses cannot leave it
//! pointing at a detached element. Handles are fetched, used once, and
//! discarded.

use std::fmt;
use std::rc::Rc;

use crate::driver::{Element, Point, Rect, Size};
use crate::locator::Locator;
use crate::result::{ListoError, ListoResult};
use crate::session::Session;
use crate::wait::{Clock, Sleeper, SystemClock, SystemSleeper, WaitCondition, WaitOptions};

/// A locator bound to a session, resolved lazily on every access
pub struct Selector {
    session: Session,
    locator: Locator,
    clock: Rc<dyn Clock>,
    sleeper: Rc<dyn Sleeper>,
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector")
            .field("locator", &self.locator)
            .field("session", &self.session.id())
            .finish_non_exhaustive()
    }
}

impl Clone for Selector {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            locator: self.locator.clone(),
            clock: Rc::clone(&self.clock),
            sleeper: Rc::clone(&self.sleeper),
        }
    }
}

impl Selector {
    /// Bind a locator to a session
    #[must_use]
    pub fn new(session: Session, locator: Locator) -> Self {
        Self {
            session,
            locator,
            clock: Rc::new(SystemClock),
            sleeper: Rc::new(SystemSleeper),
        }
    }

    /// Bind a CSS locator to a session
    #[must_use]
    pub fn css(session: &Session, pattern: impl Into<String>) -> Self {
        Self::new(session.clone(), Locator::css(pattern))
    }

    /// Derive a selector scoped inside a container selector.
    ///
    /// # Errors
    ///
    /// Fails with [`ListoError::UnsupportedComposition`] unless the container
    /// is a CSS locator.
    pub fn within(container: &Self, child_css: impl Into<String>) -> ListoResult<Self> {
        Ok(Self::new(
            container.session.clone(),
            Locator::within(&container.locator, child_css)?,
        ))
    }

    /// Replace the wait clock (for deterministic wait tests)
    #[must_use]
    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the wait sleep strategy (for deterministic wait tests)
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Rc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// The locator this selector resolves
    #[must_use]
    pub const fn locator(&self) -> &Locator {
        &self.locator
    }

    /// The session this selector is bound to
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Resolve a fresh handle to the first matching element.
    ///
    /// # Errors
    ///
    /// Fails with [`ListoError::ElementNotFound`] if nothing matches.
    pub fn get(&self) -> ListoResult<Box<dyn Element>> {
        self.session.env_mut()?.find_one(&self.locator)
    }

    /// Resolve fresh handles to every matching element; an empty vector is a
    /// valid, non-error result
    pub fn get_multiple(&self) -> ListoResult<Vec<Box<dyn Element>>> {
        self.session.env_mut()?.find_all(&self.locator)
    }

    /// Resolve the first element satisfying `condition`.
    ///
    /// # Errors
    ///
    /// Fails with [`ListoError::PredicateSourceEmpty`] when nothing resolved
    /// at all (there was nothing to test), and
    /// [`ListoError::PredicateNoMatch`] when elements resolved but none
    /// satisfied the condition. Callers use the distinction to tell "nothing
    /// there" from "things there, none matching".
    pub fn get_where(
        &self,
        condition: impl Fn(&dyn Element) -> bool,
    ) -> ListoResult<Box<dyn Element>> {
        let elements = self.get_multiple()?;
        if elements.is_empty() {
            return Err(ListoError::PredicateSourceEmpty {
                locator: self.locator.to_string(),
            });
        }
        elements
            .into_iter()
            .find(|element| condition(element.as_ref()))
            .ok_or_else(|| ListoError::PredicateNoMatch {
                locator: self.locator.to_string(),
            })
    }

    /// Resolve every element satisfying `condition`, with the same error
    /// distinction as [`get_where`](Self::get_where)
    pub fn get_multiple_where(
        &self,
        condition: impl Fn(&dyn Element) -> bool,
    ) -> ListoResult<Vec<Box<dyn Element>>> {
        let elements = self.get_multiple()?;
        if elements.is_empty() {
            return Err(ListoError::PredicateSourceEmpty {
                locator: self.locator.to_string(),
            });
        }
        let matching: Vec<_> = elements
            .into_iter()
            .filter(|element| condition(element.as_ref()))
            .collect();
        if matching.is_empty() {
            return Err(ListoError::PredicateNoMatch {
                locator: self.locator.to_string(),
            });
        }
        Ok(matching)
    }

    /// Whether any element currently matches.
    ///
    /// Never propagates [`ListoError::ElementNotFound`]; that outcome is this
    /// method's `false`. Other failures (a closed session, a broken driver)
    /// still propagate.
    pub fn is_present(&self) -> ListoResult<bool> {
        match self.get() {
            Ok(_) => Ok(true),
            Err(ListoError::ElementNotFound { .. }) => Ok(false),
            Err(other) => Err(other),
        }
    }

    /// Whether the first matching element is displayed
    pub fn is_displayed(&self) -> ListoResult<bool> {
        self.get()?.is_displayed()
    }

    /// Whether the first matching element is enabled
    pub fn is_enabled(&self) -> ListoResult<bool> {
        self.get()?.is_enabled()
    }

    /// Whether the first matching element is selected or checked
    pub fn is_selected(&self) -> ListoResult<bool> {
        self.get()?.is_selected()
    }

    /// Value of an HTML attribute of the first matching element
    pub fn attribute(&self, name: &str) -> ListoResult<Option<String>> {
        self.get()?.attribute(name)
    }

    /// Computed CSS value of the first matching element
    pub fn css_value(&self, property: &str) -> ListoResult<String> {
        self.get()?.css_value(property)
    }

    /// Tag name of the first matching element
    pub fn tag_name(&self) -> ListoResult<String> {
        self.get()?.tag_name()
    }

    /// Visible text of the first matching element and its descendants
    pub fn text(&self) -> ListoResult<String> {
        self.get()?.text()
    }

    /// Location of the first matching element's top-left corner
    pub fn location(&self) -> ListoResult<Point> {
        self.get()?.location()
    }

    /// Rendered size of the first matching element
    pub fn size(&self) -> ListoResult<Size> {
        self.get()?.size()
    }

    /// Location and size of the first matching element
    pub fn rect(&self) -> ListoResult<Rect> {
        self.get()?.rect()
    }

    /// CSS classes of the first matching element
    pub fn css_classes(&self) -> ListoResult<Vec<String>> {
        let class_attr = self.attribute("class")?.unwrap_or_default();
        Ok(class_attr.split_whitespace().map(str::to_string).collect())
    }

    /// Whether the first matching element carries every class in `required`
    pub fn has_css_classes(&self, required: &[String]) -> ListoResult<bool> {
        let classes = self.css_classes()?;
        Ok(required
            .iter()
            .all(|class| classes.iter().any(|have| have == class)))
    }

    /// Clear the first matching element
    pub fn clear(&self) -> ListoResult<&Self> {
        self.get()?.clear()?;
        Ok(self)
    }

    /// Click the first matching element
    pub fn click(&self) -> ListoResult<&Self> {
        self.get()?.click()?;
        Ok(self)
    }

    /// Type into the first matching element
    pub fn send_keys(&self, keys: &str) -> ListoResult<&Self> {
        self.get()?.send_keys(keys)?;
        Ok(self)
    }

    /// Submit the form the first matching element belongs to
    pub fn submit(&self) -> ListoResult<&Self> {
        self.get()?.submit()?;
        Ok(self)
    }

    /// Wait until the first matching element satisfies `condition`, with
    /// default timing (10s timeout, 200ms polls)
    pub fn wait_until(&self, condition: impl Fn(&dyn Element) -> bool) -> ListoResult<&Self> {
        self.wait_until_with(condition, &WaitOptions::default())
    }

    /// Wait until the first matching element satisfies `condition`.
    ///
    /// Each poll re-resolves the element. A resolution miss is remembered and
    /// polling continues; a satisfied condition returns immediately without a
    /// trailing sleep. An interrupted sleep is swallowed and polling
    /// continues; callers that need a hard abort must supervise from
    /// outside.
    ///
    /// # Errors
    ///
    /// Fails with [`ListoError::Timeout`] on deadline exhaustion. The timeout
    /// carries the last resolution miss as its cause when one occurred, so
    /// diagnostics can tell "it never appeared" from "it appeared but never
    /// satisfied the condition".
    pub fn wait_until_with(
        &self,
        condition: impl Fn(&dyn Element) -> bool,
        options: &WaitOptions,
    ) -> ListoResult<&Self> {
        let deadline = self.clock.later_by(options.timeout());
        let mut last_miss: Option<ListoError> = None;

        while self.clock.is_now_before(deadline) {
            match self.get() {
                Ok(element) => {
                    if condition(element.as_ref()) {
                        return Ok(self);
                    }
                }
                Err(miss @ ListoError::ElementNotFound { .. }) => {
                    last_miss = Some(miss);
                }
                Err(other) => return Err(other),
            }

            if self.sleeper.sleep(options.poll_interval()).is_err() {
                tracing::trace!(locator = %self.locator, "sleep interrupted, continuing to poll");
            }
        }

        Err(ListoError::Timeout {
            ms: options.timeout_ms,
            cause: last_miss.map(Box::new),
        })
    }

    /// Wait on an externally supplied condition object, with default timing.
    ///
    /// The per-poll decision is delegated entirely to the condition; this is
    /// the interop seam for driver-native condition types.
    pub fn wait_for(&self, condition: &dyn WaitCondition) -> ListoResult<&Self> {
        self.wait_for_with(condition, &WaitOptions::default())
    }

    /// Wait on an externally supplied condition object
    pub fn wait_for_with(
        &self,
        condition: &dyn WaitCondition,
        options: &WaitOptions,
    ) -> ListoResult<&Self> {
        let deadline = self.clock.later_by(options.timeout());

        while self.clock.is_now_before(deadline) {
            let satisfied = {
                let mut env = self.session.env_mut()?;
                condition.check(env.driver_mut()?)
            };
            if satisfied {
                return Ok(self);
            }
            if self.sleeper.sleep(options.poll_interval()).is_err() {
                tracing::trace!(locator = %self.locator, "sleep interrupted, continuing to poll");
            }
        }

        tracing::warn!(
            condition = %condition.description(),
            timeout_ms = options.timeout_ms,
            "condition wait timed out"
        );
        Err(ListoError::Timeout {
            ms: options.timeout_ms,
            cause: None,
        })
    }
}
