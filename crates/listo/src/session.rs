//! Session: the environment and data for a single test.
//!
//! A session bundles the [`Store`], the target host, and the
//! [`DriverEnvironment`]. One session per test is the intended shape: a fresh
//! browser and a fresh store per test keeps state from leaking between tests.
//! A `Session` value is a cheap-clone handle; page objects, components, and
//! selectors all share the same underlying state. The whole object graph is
//! single-threaded by design; tests that run in parallel each build their
//! own session.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::rc::Rc;

use uuid::Uuid;

use crate::env::DriverEnvironment;
use crate::locator::Locator;
use crate::result::{ListoError, ListoResult};
use crate::selector::Selector;
use crate::store::Store;

struct SessionInner {
    id: Uuid,
    store: RefCell<Store>,
    host: RefCell<String>,
    env: RefCell<DriverEnvironment>,
    closed: Cell<bool>,
}

/// Shared handle to one test's environment and data
#[derive(Clone)]
pub struct Session {
    inner: Rc<SessionInner>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.inner.id)
            .field("host", &self.inner.host.borrow())
            .field("closed", &self.inner.closed.get())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a session against `host` with a fresh store.
    ///
    /// # Errors
    ///
    /// Fails with [`ListoError::InvalidHost`] for an empty host.
    pub fn new(host: impl Into<String>, env: DriverEnvironment) -> ListoResult<Self> {
        let host = host.into();
        if host.is_empty() {
            return Err(ListoError::InvalidHost {
                message: "the host for a session cannot be empty".to_string(),
            });
        }
        let id = Uuid::new_v4();
        tracing::debug!(session = %id, %host, "session opened");
        Ok(Self {
            inner: Rc::new(SessionInner {
                id,
                store: RefCell::new(Store::new()),
                host: RefCell::new(host),
                env: RefCell::new(env),
                closed: Cell::new(false),
            }),
        })
    }

    /// Run `body` against a fresh session, closing it on every exit path
    pub fn run<T>(
        host: impl Into<String>,
        env: DriverEnvironment,
        body: impl FnOnce(&Self) -> ListoResult<T>,
    ) -> ListoResult<T> {
        let session = Self::new(host, env)?;
        let result = body(&session);
        session.close();
        result
    }

    /// This session's identifier, for log correlation
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Whether this session has been closed
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.get()
    }

    /// Read access to the session store
    pub fn store(&self) -> ListoResult<Ref<'_, Store>> {
        self.ensure_open()?;
        Ok(self.inner.store.borrow())
    }

    /// Write access to the session store
    pub fn store_mut(&self) -> ListoResult<RefMut<'_, Store>> {
        self.ensure_open()?;
        Ok(self.inner.store.borrow_mut())
    }

    /// The host this session targets
    pub fn host(&self) -> ListoResult<String> {
        self.ensure_open()?;
        Ok(self.inner.host.borrow().clone())
    }

    /// Point this session at a different host.
    ///
    /// # Errors
    ///
    /// Fails with [`ListoError::InvalidHost`] for an empty host or one equal
    /// to the current host.
    pub fn switch_hosts(&self, new_host: impl Into<String>) -> ListoResult<()> {
        self.ensure_open()?;
        let new_host = new_host.into();
        if new_host.is_empty() {
            return Err(ListoError::InvalidHost {
                message: "the host to switch to cannot be empty".to_string(),
            });
        }
        let mut host = self.inner.host.borrow_mut();
        if *host == new_host {
            return Err(ListoError::InvalidHost {
                message: "the new host cannot be the same as the current host".to_string(),
            });
        }
        tracing::debug!(session = %self.inner.id, from = %host.as_str(), to = %new_host, "switching hosts");
        *host = new_host;
        Ok(())
    }

    /// Read access to the driver environment
    pub fn env(&self) -> ListoResult<Ref<'_, DriverEnvironment>> {
        self.ensure_open()?;
        Ok(self.inner.env.borrow())
    }

    /// Write access to the driver environment
    pub fn env_mut(&self) -> ListoResult<RefMut<'_, DriverEnvironment>> {
        self.ensure_open()?;
        Ok(self.inner.env.borrow_mut())
    }

    /// Build a selector bound to this session
    #[must_use]
    pub fn selector(&self, locator: Locator) -> Selector {
        Selector::new(self.clone(), locator)
    }

    /// Close this session and its driver environment. Idempotent.
    pub fn close(&self) {
        if self.inner.closed.replace(true) {
            return;
        }
        self.inner.env.borrow_mut().close();
        tracing::debug!(session = %self.inner.id, "session closed");
    }

    fn ensure_open(&self) -> ListoResult<()> {
        if self.is_closed() {
            return Err(ListoError::SessionClosed);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Browser, DriverConfig};
    use crate::mock::MockDriver;

    fn session_with(driver: MockDriver) -> Session {
        let env = DriverEnvironment::new(
            DriverConfig::new(Browser::Chrome),
            Box::new(move |_| Ok(Box::new(driver.clone()))),
        );
        Session::new("https://example.com", env).unwrap()
    }

    #[test]
    fn test_empty_host_rejected() {
        let env = DriverEnvironment::new(
            DriverConfig::new(Browser::Chrome),
            Box::new(|_| Ok(Box::new(MockDriver::new()))),
        );
        assert!(matches!(
            Session::new("", env),
            Err(ListoError::InvalidHost { .. })
        ));
    }

    #[test]
    fn test_store_round_trip_through_session() {
        let session = session_with(MockDriver::new());
        session.store_mut().unwrap().put("x", 42).unwrap();
        let value: i32 = session.store().unwrap().get_as("x").unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_switch_hosts() {
        let session = session_with(MockDriver::new());
        session.switch_hosts("https://staging.example.com").unwrap();
        assert_eq!(session.host().unwrap(), "https://staging.example.com");
    }

    #[test]
    fn test_switch_to_same_host_rejected() {
        let session = session_with(MockDriver::new());
        assert!(matches!(
            session.switch_hosts("https://example.com"),
            Err(ListoError::InvalidHost { .. })
        ));
    }

    #[test]
    fn test_switch_to_empty_host_rejected() {
        let session = session_with(MockDriver::new());
        assert!(matches!(
            session.switch_hosts(""),
            Err(ListoError::InvalidHost { .. })
        ));
    }

    #[test]
    fn test_closed_session_rejects_every_accessor() {
        let session = session_with(MockDriver::new());
        session.close();
        assert!(session.is_closed());
        assert!(matches!(session.store(), Err(ListoError::SessionClosed)));
        assert!(matches!(session.store_mut(), Err(ListoError::SessionClosed)));
        assert!(matches!(session.host(), Err(ListoError::SessionClosed)));
        assert!(matches!(session.env_mut(), Err(ListoError::SessionClosed)));
        assert!(matches!(
            session.switch_hosts("https://other.example.com"),
            Err(ListoError::SessionClosed)
        ));
    }

    #[test]
    fn test_close_propagates_to_environment() {
        let driver = MockDriver::new();
        let session = session_with(driver.clone());
        session.env_mut().unwrap().driver_mut().unwrap();
        session.close();
        assert_eq!(driver.quit_calls(), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let session = session_with(MockDriver::new());
        let other = session.clone();
        other.store_mut().unwrap().put("shared", true).unwrap();
        assert!(session.store().unwrap().contains("shared"));
        assert_eq!(session.id(), other.id());
    }

    #[test]
    fn test_run_closes_on_success_and_failure() {
        let driver = MockDriver::new();
        let handle = driver.clone();
        let env = DriverEnvironment::new(
            DriverConfig::new(Browser::Chrome),
            Box::new(move |_| Ok(Box::new(driver.clone()))),
        );
        let result = Session::run("https://example.com", env, |session| {
            session.env_mut()?.driver_mut()?;
            Err::<(), _>(ListoError::BrowserNotOpen)
        });
        assert!(result.is_err());
        assert_eq!(handle.quit_calls(), 1);
    }
}
