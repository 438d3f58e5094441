//! Driver configuration.
//!
//! Configuration is an explicit struct handed to the session at construction
//! time, not ambient process state. A [`PropertySource`] adapter exists for
//! embedders that still feed settings in through the environment.

use crate::result::{ListoError, ListoResult};

/// Supported browser profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Browser {
    /// Local Chrome
    Chrome,
    /// Chrome reached through a remote driver endpoint
    RemoteChrome,
    /// Local Firefox
    Firefox,
}

impl Browser {
    /// The configuration name of this profile
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::RemoteChrome => "remotechrome",
            Self::Firefox => "firefox",
        }
    }

    /// Identify a profile from its configuration name, case-insensitively.
    ///
    /// # Errors
    ///
    /// Fails with [`ListoError::UnknownBrowser`] if no profile matches.
    pub fn identify(name: &str) -> ListoResult<Self> {
        [Self::Chrome, Self::RemoteChrome, Self::Firefox]
            .into_iter()
            .find(|browser| browser.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| ListoError::UnknownBrowser {
                name: name.to_string(),
            })
    }
}

/// Recognized configuration properties
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    /// Which browser profile to drive
    DriverBrowser,
    /// Host of a remote driver endpoint
    DriverHost,
    /// Port of a remote driver endpoint
    DriverPort,
    /// Path to a local driver binary
    DriverBinary,
    /// Proxy server as `host:port`
    ProxyServer,
}

impl Property {
    /// The property's lookup name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::DriverBrowser => "driver.browser",
            Self::DriverHost => "driver.host",
            Self::DriverPort => "driver.port",
            Self::DriverBinary => "driver.binary",
            Self::ProxyServer => "proxy.server",
        }
    }

    /// Every recognized property
    #[must_use]
    pub const fn all() -> [Self; 5] {
        [
            Self::DriverBrowser,
            Self::DriverHost,
            Self::DriverPort,
            Self::DriverBinary,
            Self::ProxyServer,
        ]
    }
}

/// String-keyed property lookup with default-empty semantics
pub trait PropertySource {
    /// Value for `name`, or the empty string when unset
    fn get(&self, name: &str) -> String;
}

/// [`PropertySource`] backed by the process environment.
///
/// Property names are mapped to environment variables by upper-casing and
/// replacing dots with underscores (`driver.browser` → `DRIVER_BROWSER`).
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvProperties;

impl PropertySource for EnvProperties {
    fn get(&self, name: &str) -> String {
        let var = name.replace('.', "_").to_uppercase();
        std::env::var(var).unwrap_or_default()
    }
}

/// Explicit driver configuration, injected at session construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Browser profile to drive
    pub browser: Browser,
    /// Proxy server as `host:port`, if any
    pub proxy_server: Option<String>,
    /// Path to a local driver binary, if one is needed
    pub driver_binary_path: Option<String>,
    /// Remote driver host, for remote profiles
    pub remote_host: Option<String>,
    /// Remote driver port, for remote profiles
    pub remote_port: Option<u16>,
}

impl DriverConfig {
    /// Configuration for a browser profile with no extras
    #[must_use]
    pub const fn new(browser: Browser) -> Self {
        Self {
            browser,
            proxy_server: None,
            driver_binary_path: None,
            remote_host: None,
            remote_port: None,
        }
    }

    /// Set the proxy server
    #[must_use]
    pub fn with_proxy_server(mut self, proxy: impl Into<String>) -> Self {
        self.proxy_server = Some(proxy.into());
        self
    }

    /// Set the driver binary path
    #[must_use]
    pub fn with_driver_binary_path(mut self, path: impl Into<String>) -> Self {
        self.driver_binary_path = Some(path.into());
        self
    }

    /// Set the remote driver host
    #[must_use]
    pub fn with_remote_host(mut self, host: impl Into<String>) -> Self {
        self.remote_host = Some(host.into());
        self
    }

    /// Set the remote driver port
    #[must_use]
    pub const fn with_remote_port(mut self, port: u16) -> Self {
        self.remote_port = Some(port);
        self
    }

    /// Build a configuration from a property source.
    ///
    /// `driver.browser` is required; a remote Chrome profile additionally
    /// requires `driver.binary`. Everything else defaults to unset.
    ///
    /// # Errors
    ///
    /// Fails with [`ListoError::PropertyUndefined`] for a missing required
    /// property and [`ListoError::UnknownBrowser`] for an unknown profile.
    pub fn from_properties(source: &dyn PropertySource) -> ListoResult<Self> {
        let browser_name = source.get(Property::DriverBrowser.name());
        if browser_name.is_empty() {
            return Err(ListoError::PropertyUndefined {
                name: Property::DriverBrowser.name().to_string(),
            });
        }
        let browser = Browser::identify(&browser_name)?;

        let driver_binary_path = non_empty(source.get(Property::DriverBinary.name()));
        if browser == Browser::RemoteChrome && driver_binary_path.is_none() {
            return Err(ListoError::PropertyUndefined {
                name: Property::DriverBinary.name().to_string(),
            });
        }

        Ok(Self {
            browser,
            proxy_server: non_empty(source.get(Property::ProxyServer.name())),
            driver_binary_path,
            remote_host: non_empty(source.get(Property::DriverHost.name())),
            remote_port: non_empty(source.get(Property::DriverPort.name()))
                .and_then(|port| port.parse().ok()),
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapProperties(HashMap<&'static str, &'static str>);

    impl PropertySource for MapProperties {
        fn get(&self, name: &str) -> String {
            self.0.get(name).map_or_else(String::new, ToString::to_string)
        }
    }

    fn properties(pairs: &[(&'static str, &'static str)]) -> MapProperties {
        MapProperties(pairs.iter().copied().collect())
    }

    mod browser_tests {
        use super::*;

        #[test]
        fn test_identify_is_case_insensitive() {
            assert_eq!(Browser::identify("Chrome").unwrap(), Browser::Chrome);
            assert_eq!(
                Browser::identify("REMOTECHROME").unwrap(),
                Browser::RemoteChrome
            );
            assert_eq!(Browser::identify("firefox").unwrap(), Browser::Firefox);
        }

        #[test]
        fn test_identify_unknown_browser() {
            let result = Browser::identify("netscape");
            assert!(matches!(
                result,
                Err(ListoError::UnknownBrowser { name }) if name == "netscape"
            ));
        }
    }

    mod property_tests {
        use super::*;

        #[test]
        fn test_property_names() {
            assert_eq!(Property::DriverBrowser.name(), "driver.browser");
            assert_eq!(Property::ProxyServer.name(), "proxy.server");
        }

        #[test]
        fn test_all_properties_have_distinct_names() {
            let names: Vec<_> = Property::all().iter().map(|p| p.name()).collect();
            let mut deduped = names.clone();
            deduped.dedup();
            assert_eq!(names.len(), deduped.len());
        }

        #[test]
        fn test_env_properties_default_empty() {
            assert_eq!(EnvProperties.get("listo.test.never.set"), "");
        }
    }

    mod config_tests {
        use super::*;

        #[test]
        fn test_builder_chain() {
            let config = DriverConfig::new(Browser::Chrome)
                .with_proxy_server("proxy.internal:3128")
                .with_driver_binary_path("/usr/bin/chromedriver")
                .with_remote_host("grid.internal")
                .with_remote_port(4444);
            assert_eq!(config.proxy_server.as_deref(), Some("proxy.internal:3128"));
            assert_eq!(config.remote_port, Some(4444));
        }

        #[test]
        fn test_from_properties_minimal() {
            let source = properties(&[("driver.browser", "firefox")]);
            let config = DriverConfig::from_properties(&source).unwrap();
            assert_eq!(config.browser, Browser::Firefox);
            assert!(config.proxy_server.is_none());
            assert!(config.remote_port.is_none());
        }

        #[test]
        fn test_from_properties_requires_browser() {
            let source = properties(&[]);
            let result = DriverConfig::from_properties(&source);
            assert!(matches!(
                result,
                Err(ListoError::PropertyUndefined { name }) if name == "driver.browser"
            ));
        }

        #[test]
        fn test_remote_chrome_requires_binary() {
            let source = properties(&[("driver.browser", "remotechrome")]);
            let result = DriverConfig::from_properties(&source);
            assert!(matches!(
                result,
                Err(ListoError::PropertyUndefined { name }) if name == "driver.binary"
            ));
        }

        #[test]
        fn test_from_properties_parses_port() {
            let source = properties(&[
                ("driver.browser", "chrome"),
                ("driver.host", "grid.internal"),
                ("driver.port", "4444"),
            ]);
            let config = DriverConfig::from_properties(&source).unwrap();
            assert_eq!(config.remote_host.as_deref(), Some("grid.internal"));
            assert_eq!(config.remote_port, Some(4444));
        }

        #[test]
        fn test_unparseable_port_is_dropped() {
            let source = properties(&[("driver.browser", "chrome"), ("driver.port", "grid")]);
            let config = DriverConfig::from_properties(&source).unwrap();
            assert!(config.remote_port.is_none());
        }
    }
}
