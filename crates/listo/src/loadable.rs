//! Pages, components, and their readiness rule registries.
//!
//! A *loadable* is a structural node in a page model: a [`Page`] roots a
//! URL-addressable unit, a [`Component`] is a reusable sub-tree anchored at a
//! container selector. Each loadable declares, per field, the conditions
//! under which that field counts as ready, explicitly, in a [`RuleSet`]
//! built by its constructor, rather than through any runtime introspection.
//!
//! Inheritance in the classic page-object pattern maps onto composition
//! here: a derived page embeds its base, chains its own [`Path`] segment onto
//! the base's at construction time, and extends the base's `RuleSet` with a
//! layer of its own.

use std::fmt;

use serde_json::Value;

use crate::ready::{Loader, Ready};
use crate::result::{ListoError, ListoResult};
use crate::selector::Selector;
use crate::session::Session;
use crate::validator::Validator;

/// Relative path of a page, as an ordered list of segments.
///
/// Segments are contributed most-base first: a derived page chains its own
/// segment onto its parent's with [`child`](Self::child).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// A path with a single root segment
    #[must_use]
    pub fn root(segment: impl Into<String>) -> Self {
        Self {
            segments: vec![segment.into()],
        }
    }

    /// This path extended with a child segment
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// The segments, most-base first
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The relative path: every segment concatenated in order
    #[must_use]
    pub fn relative(&self) -> String {
        self.segments.concat()
    }
}

/// What a readiness rule is attached to
pub enum RuleTarget<'a> {
    /// A selector field
    Element(&'a Selector),
    /// A nested component; its container is checked against the rule, then
    /// its own rules are validated
    Nested(&'a dyn Component),
}

impl fmt::Debug for RuleTarget<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element(selector) => f.debug_tuple("Element").field(selector.locator()).finish(),
            Self::Nested(component) => f
                .debug_tuple("Nested")
                .field(component.container().locator())
                .finish(),
        }
    }
}

/// One registered rule: a field, its target, and its expectations
#[derive(Debug)]
pub struct RuleEntry<'a> {
    /// Field name, for diagnostics
    pub field: &'a str,
    /// What the rule is attached to
    pub target: RuleTarget<'a>,
    /// The readiness expectation
    pub ready: Ready,
    /// The loader expectation, if the field is a transient indicator
    pub loader: Option<Loader>,
}

/// The rules declared by one type in a composition chain
#[derive(Debug, Default)]
pub struct RuleLayer<'a> {
    /// The declaring type's name, for diagnostics
    pub name: &'a str,
    /// Entries in declaration order
    pub entries: Vec<RuleEntry<'a>>,
}

/// A loadable's full rule registry: layers ordered most-base first, entries
/// in declaration order within each layer.
///
/// Validation walks this structure in order and stops at the first violation.
#[derive(Debug, Default)]
pub struct RuleSet<'a> {
    layers: Vec<RuleLayer<'a>>,
}

impl<'a> RuleSet<'a> {
    /// An empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry opening its first layer
    #[must_use]
    pub fn layer(name: &'a str) -> Self {
        Self {
            layers: vec![RuleLayer {
                name,
                entries: Vec::new(),
            }],
        }
    }

    /// Open a new layer; used by a derived type to extend its base's rules
    #[must_use]
    pub fn push_layer(mut self, name: &'a str) -> Self {
        self.layers.push(RuleLayer {
            name,
            entries: Vec::new(),
        });
        self
    }

    /// Register a rule on a selector field
    #[must_use]
    pub fn element(mut self, field: &'a str, selector: &'a Selector, ready: Ready) -> Self {
        self.push_entry(RuleEntry {
            field,
            target: RuleTarget::Element(selector),
            ready,
            loader: None,
        });
        self
    }

    /// Register a rule and a loader rule on a selector field
    #[must_use]
    pub fn element_with_loader(
        mut self,
        field: &'a str,
        selector: &'a Selector,
        ready: Ready,
        loader: Loader,
    ) -> Self {
        self.push_entry(RuleEntry {
            field,
            target: RuleTarget::Element(selector),
            ready,
            loader: Some(loader),
        });
        self
    }

    /// Register a rule on a nested component field
    #[must_use]
    pub fn nested(mut self, field: &'a str, component: &'a dyn Component, ready: Ready) -> Self {
        self.push_entry(RuleEntry {
            field,
            target: RuleTarget::Nested(component),
            ready,
            loader: None,
        });
        self
    }

    /// Register a rule and a loader rule on a nested component field
    #[must_use]
    pub fn nested_with_loader(
        mut self,
        field: &'a str,
        component: &'a dyn Component,
        ready: Ready,
        loader: Loader,
    ) -> Self {
        self.push_entry(RuleEntry {
            field,
            target: RuleTarget::Nested(component),
            ready,
            loader: Some(loader),
        });
        self
    }

    /// The layers, most-base first
    #[must_use]
    pub fn layers(&self) -> &[RuleLayer<'a>] {
        &self.layers
    }

    /// Total number of registered entries
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.entries.len()).sum()
    }

    fn push_entry(&mut self, entry: RuleEntry<'a>) {
        if self.layers.is_empty() {
            self.layers.push(RuleLayer::default());
        }
        if let Some(layer) = self.layers.last_mut() {
            layer.entries.push(entry);
        }
    }
}

/// A structural node of a page model: a page or a component
pub trait Loadable {
    /// The session this loadable belongs to
    fn session(&self) -> &Session;

    /// This loadable's rule registry, layers ordered most-base first
    fn rules(&self) -> RuleSet<'_>;

    /// Whether this loadable (and everything it structurally owns) is ready
    /// for interaction.
    ///
    /// `Ok(false)` means a rule was violated, an expected, poll-worthy
    /// outcome, logged but never an error. `Err` is reserved for programming
    /// faults such as a rule on an empty locator.
    fn is_ready(&self) -> ListoResult<bool>
    where
        Self: Sized,
    {
        Validator::new().validate(self)
    }
}

/// A page: the root of a URL-addressable unit
pub trait Page: Loadable {
    /// The page's path chain
    fn path(&self) -> &Path;

    /// The relative path to this page, excluding the host
    fn relative_path(&self) -> String {
        self.path().relative()
    }

    /// The full URL of this page: session host + relative path
    fn url(&self) -> ListoResult<String> {
        Ok(format!("{}{}", self.session().host()?, self.relative_path()))
    }

    /// Navigate the browser to the session's base URL.
    ///
    /// Exists so tests never reach below the page-object layer to navigate.
    fn navigate_to_base_url(&self) -> ListoResult<()> {
        let host = self.session().host()?;
        self.session().env_mut()?.go_to_url(&host)
    }

    /// All HTML comments on the current page.
    ///
    /// There is no CSS selector for comment nodes, so this drops to script
    /// execution.
    fn html_comments(&self) -> ListoResult<Value> {
        self.session().env_mut()?.execute_js(
            "return Array.from(document.querySelectorAll('*')).flatMap(el => \
             Array.from(el.childNodes)).filter(n => n.nodeType === 8).map(n => n.data)",
            false,
            &[],
        )
    }
}

/// A component: a reusable sub-tree anchored at a container selector
pub trait Component: Loadable {
    /// The selector for the element that immediately contains this component
    fn container(&self) -> &Selector;
}

/// Embeddable state for a [`Page`] implementation
#[derive(Debug, Clone)]
pub struct PageBase {
    session: Session,
    path: Path,
}

impl PageBase {
    /// Create page state for a session and path chain
    #[must_use]
    pub fn new(session: Session, path: Path) -> Self {
        Self { session, path }
    }

    /// The session this page belongs to
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// The page's path chain
    #[must_use]
    pub const fn path(&self) -> &Path {
        &self.path
    }
}

/// Embeddable state for a [`Component`] implementation.
///
/// The component shares its owner's session through the container selector.
#[derive(Debug, Clone)]
pub struct ComponentBase {
    container: Selector,
}

impl ComponentBase {
    /// Create component state anchored at `container`.
    ///
    /// # Errors
    ///
    /// Fails with [`ListoError::InvalidRuleTarget`] if the container's
    /// locator pattern is empty.
    pub fn new(container: Selector) -> ListoResult<Self> {
        if container.locator().pattern().is_empty() {
            return Err(ListoError::InvalidRuleTarget {
                message: "the container's locator for a component cannot be empty".to_string(),
            });
        }
        Ok(Self { container })
    }

    /// The session this component belongs to
    #[must_use]
    pub const fn session(&self) -> &Session {
        self.container.session()
    }

    /// The component's container selector
    #[must_use]
    pub const fn container(&self) -> &Selector {
        &self.container
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Browser, DriverConfig};
    use crate::env::DriverEnvironment;
    use crate::locator::Locator;
    use crate::mock::MockDriver;

    fn session_with(driver: MockDriver) -> Session {
        let env = DriverEnvironment::new(
            DriverConfig::new(Browser::Chrome),
            Box::new(move |_| Ok(Box::new(driver.clone()))),
        );
        Session::new("https://example.com", env).unwrap()
    }

    mod path_tests {
        use super::*;

        #[test]
        fn test_root_only() {
            let path = Path::root("/parent");
            assert_eq!(path.relative(), "/parent");
        }

        #[test]
        fn test_child_chains_base_most_first() {
            let parent = Path::root("/parent");
            let child = parent.child("/child");
            assert_eq!(child.relative(), "/parent/child");
            assert_eq!(child.segments(), ["/parent", "/child"]);
            // The parent's own path is untouched.
            assert_eq!(parent.relative(), "/parent");
        }

        #[test]
        fn test_three_levels() {
            let path = Path::root("/a").child("/b").child("/c");
            assert_eq!(path.relative(), "/a/b/c");
        }
    }

    mod page_tests {
        use super::*;

        struct DashboardPage {
            base: PageBase,
        }

        impl DashboardPage {
            fn new(session: &Session) -> Self {
                Self {
                    base: PageBase::new(session.clone(), Path::root("/dashboard")),
                }
            }
        }

        impl Loadable for DashboardPage {
            fn session(&self) -> &Session {
                self.base.session()
            }

            fn rules(&self) -> RuleSet<'_> {
                RuleSet::new()
            }
        }

        impl Page for DashboardPage {
            fn path(&self) -> &Path {
                self.base.path()
            }
        }

        #[test]
        fn test_url_is_host_plus_relative_path() {
            let session = session_with(MockDriver::new());
            let page = DashboardPage::new(&session);
            assert_eq!(page.relative_path(), "/dashboard");
            assert_eq!(page.url().unwrap(), "https://example.com/dashboard");
        }

        #[test]
        fn test_navigate_to_base_url() {
            let driver = MockDriver::new();
            let session = session_with(driver.clone());
            let page = DashboardPage::new(&session);
            page.navigate_to_base_url().unwrap();
            assert_eq!(driver.navigations(), vec!["https://example.com"]);
        }

        #[test]
        fn test_html_comments_drops_to_script() {
            let driver = MockDriver::new();
            let session = session_with(driver.clone());
            let page = DashboardPage::new(&session);
            let _ = page.html_comments().unwrap();
            assert_eq!(driver.scripts_run().len(), 1);
        }
    }

    mod component_base_tests {
        use super::*;

        #[test]
        fn test_empty_container_rejected() {
            let session = session_with(MockDriver::new());
            let container = session.selector(Locator::css(""));
            assert!(matches!(
                ComponentBase::new(container),
                Err(ListoError::InvalidRuleTarget { .. })
            ));
        }

        #[test]
        fn test_component_shares_owner_session() {
            let session = session_with(MockDriver::new());
            let container = session.selector(Locator::css("div.widget"));
            let base = ComponentBase::new(container).unwrap();
            assert_eq!(base.session().id(), session.id());
        }
    }

    mod rule_set_tests {
        use super::*;
        use crate::ready::Ready;

        #[test]
        fn test_layers_stay_ordered() {
            let session = session_with(MockDriver::new());
            let header = session.selector(Locator::css("header"));
            let body = session.selector(Locator::css("main"));
            let footer = session.selector(Locator::css("footer"));

            let rules = RuleSet::layer("BasePage")
                .element("header", &header, Ready::new())
                .element("body", &body, Ready::new())
                .push_layer("ChildPage")
                .element("footer", &footer, Ready::new());

            let layers = rules.layers();
            assert_eq!(layers.len(), 2);
            assert_eq!(layers[0].name, "BasePage");
            assert_eq!(layers[0].entries.len(), 2);
            assert_eq!(layers[0].entries[0].field, "header");
            assert_eq!(layers[1].name, "ChildPage");
            assert_eq!(layers[1].entries[0].field, "footer");
            assert_eq!(rules.entry_count(), 3);
        }

        #[test]
        fn test_entry_without_layer_gets_default_layer() {
            let session = session_with(MockDriver::new());
            let header = session.selector(Locator::css("header"));
            let rules = RuleSet::new().element("header", &header, Ready::new());
            assert_eq!(rules.layers().len(), 1);
            assert_eq!(rules.entry_count(), 1);
        }
    }
}
