//! Connection configuration.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::errors::RemoteError;

/// Default RFB port.
pub const DEFAULT_PORT: u16 = 5900;

/// Settings for one set-top-box connection.
///
/// Loadable from a TOML file or built in code; every field except the host
/// has a sensible default.
///
/// ```toml
/// host = "stb.local"
/// port = 5900
/// password = "hunter2"
/// keep_framebuffer = true
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Host name or address of the box.
    pub host: String,
    /// TCP port of the RFB service.
    pub port: u16,
    /// Username, for servers that want one.
    pub username: Option<String>,
    /// Password for VNC authentication.
    pub password: Option<String>,
    /// Retain decoded screen pixels in memory.
    pub keep_framebuffer: bool,
    /// Upper bound on TCP establishment and on the protocol handshake.
    pub connect_timeout_ms: u64,
    /// How long a single poll may wait for socket readiness.
    pub poll_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
            username: None,
            password: None,
            keep_framebuffer: false,
            connect_timeout_ms: 5_000,
            poll_timeout_ms: 20,
        }
    }
}

impl Config {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_keep_framebuffer(mut self, keep: bool) -> Self {
        self.keep_framebuffer = keep;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Load and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RemoteError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| RemoteError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| RemoteError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RemoteError> {
        if self.host.is_empty() {
            return Err(RemoteError::InvalidConfig("host must not be empty".into()));
        }
        if self.port == 0 {
            return Err(RemoteError::InvalidConfig("port must not be zero".into()));
        }
        if self.connect_timeout_ms == 0 {
            return Err(RemoteError::InvalidConfig(
                "connect_timeout_ms must not be zero".into(),
            ));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }
}
