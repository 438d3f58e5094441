//! Driver environment: owns the browser connection for one session.
//!
//! The driver itself is started lazily on first use and is guaranteed to be
//! shut down when the environment is dropped, whatever exit path the test
//! takes.

use std::fmt;

use serde_json::Value;

use crate::config::{Browser, DriverConfig};
use crate::driver::{Driver, Element};
use crate::locator::Locator;
use crate::result::{ListoError, ListoResult};

/// Builds a [`Driver`] from a configuration.
///
/// Concrete browser bootstrapping lives with the embedder; the environment
/// only decides *when* to call this.
pub type DriverFactory = Box<dyn Fn(&DriverConfig) -> ListoResult<Box<dyn Driver>>>;

/// Manages the connection to the browser driver for a single session
pub struct DriverEnvironment {
    config: DriverConfig,
    factory: DriverFactory,
    driver: Option<Box<dyn Driver>>,
    started: bool,
    closed: bool,
}

impl fmt::Debug for DriverEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverEnvironment")
            .field("config", &self.config)
            .field("started", &self.started)
            .field("closed", &self.closed)
            .field("browser_open", &self.driver.is_some())
            .finish_non_exhaustive()
    }
}

impl DriverEnvironment {
    /// Create an environment; the driver is not started until first use
    #[must_use]
    pub fn new(config: DriverConfig, factory: DriverFactory) -> Self {
        Self {
            config,
            factory,
            driver: None,
            started: false,
            closed: false,
        }
    }

    /// Whether this environment has been closed
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// The configuration this environment was built with
    #[must_use]
    pub const fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// The configured browser profile
    pub fn browser(&self) -> ListoResult<Browser> {
        self.ensure_open()?;
        Ok(self.config.browser)
    }

    /// The configured proxy server, if any
    pub fn proxy(&self) -> ListoResult<Option<&str>> {
        self.ensure_open()?;
        Ok(self.config.proxy_server.as_deref())
    }

    /// Whether a browser window is currently open
    #[must_use]
    pub const fn is_browser_open(&self) -> bool {
        self.driver.is_some()
    }

    /// Open a browser window.
    ///
    /// # Errors
    ///
    /// Fails with [`ListoError::BrowserAlreadyOpen`] if one is already open.
    pub fn open_browser(&mut self) -> ListoResult<()> {
        self.ensure_open()?;
        if self.driver.is_some() {
            return Err(ListoError::BrowserAlreadyOpen);
        }
        self.start()?;
        Ok(())
    }

    /// Close the browser window, keeping the environment usable
    pub fn close_browser(&mut self) -> ListoResult<()> {
        self.ensure_open()?;
        if let Some(driver) = self.driver.as_mut() {
            driver.quit()?;
        }
        self.driver = None;
        Ok(())
    }

    /// Navigate to a URL.
    ///
    /// The attempted URL is attached to any failure, since "which URL" is the
    /// first question when navigation breaks.
    pub fn go_to_url(&mut self, url: &str) -> ListoResult<()> {
        self.driver_mut()?.goto(url).map_err(|e| ListoError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// Reload the current page
    pub fn refresh(&mut self) -> ListoResult<()> {
        self.driver_mut()?.refresh()
    }

    /// Navigate back in history
    pub fn back(&mut self) -> ListoResult<()> {
        self.driver_mut()?.back()
    }

    /// Navigate forward in history
    pub fn forward(&mut self) -> ListoResult<()> {
        self.driver_mut()?.forward()
    }

    /// Execute JavaScript on the current page.
    ///
    /// Arguments can be referenced in the script as `arguments[n]`.
    pub fn execute_js(
        &mut self,
        script: &str,
        async_script: bool,
        args: &[Value],
    ) -> ListoResult<Value> {
        self.driver_mut()?.execute_script(script, async_script, args)
    }

    /// Resolve the first element matching `locator`
    pub fn find_one(&mut self, locator: &Locator) -> ListoResult<Box<dyn Element>> {
        self.driver_mut()?.find_one(locator)
    }

    /// Resolve every element matching `locator`
    pub fn find_all(&mut self, locator: &Locator) -> ListoResult<Vec<Box<dyn Element>>> {
        self.driver_mut()?.find_all(locator)
    }

    /// The live driver, started lazily on first access.
    ///
    /// # Errors
    ///
    /// Fails with [`ListoError::SessionClosed`] after [`close`](Self::close)
    /// and [`ListoError::BrowserNotOpen`] after
    /// [`close_browser`](Self::close_browser).
    pub fn driver_mut(&mut self) -> ListoResult<&mut dyn Driver> {
        self.ensure_open()?;
        if !self.started {
            self.start()?;
        }
        match self.driver.as_mut() {
            Some(driver) => Ok(driver.as_mut()),
            None => Err(ListoError::BrowserNotOpen),
        }
    }

    /// Close this environment, quitting the driver if one is running.
    ///
    /// Idempotent; a failure to quit is logged rather than propagated so that
    /// cleanup always completes.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Some(driver) = self.driver.as_mut() {
            if let Err(error) = driver.quit() {
                tracing::warn!(%error, "driver did not shut down cleanly");
            }
        }
        self.driver = None;
    }

    fn ensure_open(&self) -> ListoResult<()> {
        if self.closed {
            return Err(ListoError::SessionClosed);
        }
        Ok(())
    }

    fn start(&mut self) -> ListoResult<()> {
        self.started = true;
        tracing::debug!(browser = self.config.browser.name(), "starting driver");
        self.driver = Some((self.factory)(&self.config)?);
        Ok(())
    }
}

impl Drop for DriverEnvironment {
    fn drop(&mut self) {
        self.close();
    }
}
