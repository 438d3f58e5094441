//! Listo (Spanish: "ready"): declarative readiness validation and page-object
//! scaffolding for browser test automation.
//!
//! A page model declares, per field, the conditions under which that field is
//! ready for interaction (presence, visibility, text, CSS classes, match
//! count), and a single `is_ready()` call walks the whole structural tree,
//! nested components included, stopping at the first violation.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Page / Component (Loadable)                                 │
//! │    declares RuleSet ──► Validator ──► walks fields in order  │
//! │    owns Selectors   ──► lazy resolution via Session driver   │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Session:  Store (copy-on-write) + host + DriverEnvironment  │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Driver (trait): the embedder's browser automation backend   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Selectors never cache elements: every access re-resolves through the
//! driver, trading a lookup per access for immunity to stale references.
//! Everything a session owns is single-threaded by design; parallel tests
//! each build their own session.

#![warn(missing_docs)]

mod config;
mod driver;
mod env;
mod loadable;
mod locator;
mod ready;
mod result;
mod selector;
mod session;
mod store;
mod validator;
mod wait;

/// In-memory driver and fake time for testing page models without a browser
pub mod mock;

pub use config::{Browser, DriverConfig, EnvProperties, Property, PropertySource};
pub use driver::{Driver, Element, Point, Rect, Size};
pub use env::{DriverEnvironment, DriverFactory};
pub use loadable::{
    Component, ComponentBase, Loadable, Page, PageBase, Path, RuleEntry, RuleLayer, RuleSet,
    RuleTarget,
};
pub use locator::{By, Locator};
pub use ready::{CountConstraint, DocumentState, Loader, Ready};
pub use result::{ListoError, ListoResult};
pub use selector::Selector;
pub use session::Session;
pub use store::{Store, MAX_EXPANSIONS};
pub use validator::Validator;
pub use wait::{
    Clock, FnCondition, Interrupted, Sleeper, SystemClock, SystemSleeper, WaitCondition,
    WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS,
};
