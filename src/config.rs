//! Client configuration: credentials, endpoint base, and name-alias tables.
//!
//! The configuration is an explicit value handed to [`crate::ZohoClient`];
//! operations read it on every call and never mutate it.

use std::collections::HashMap;
use std::time::Duration;

use crate::error::{Error, ErrorKind, Result};
use crate::DEFAULT_BASE_URL;

/// Configuration for the Zoho client.
#[derive(Clone)]
pub struct ZohoConfig {
    /// Zoho auth token sent with every request.
    pub auth_token: String,
    /// API base URL, without the trailing `/json` or `/xml` segment.
    pub base_url: String,
    /// Caller-facing module name to wire module name.
    pub module_aliases: HashMap<String, String>,
    /// Caller-facing field name to wire field name, per module.
    pub field_aliases: HashMap<String, HashMap<String, String>>,
    /// Request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
}

impl std::fmt::Debug for ZohoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZohoConfig")
            .field("auth_token", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("module_aliases", &self.module_aliases)
            .field("field_aliases", &self.field_aliases)
            .finish_non_exhaustive()
    }
}

impl ZohoConfig {
    /// Create a configuration with just an auth token and defaults.
    pub fn new(auth_token: impl Into<String>) -> Result<Self> {
        Self::builder().auth_token(auth_token).build()
    }

    /// Create a new config builder.
    pub fn builder() -> ZohoConfigBuilder {
        ZohoConfigBuilder::default()
    }
}

/// Builder for [`ZohoConfig`].
#[derive(Debug)]
pub struct ZohoConfigBuilder {
    auth_token: String,
    base_url: String,
    module_aliases: HashMap<String, String>,
    field_aliases: HashMap<String, HashMap<String, String>>,
    timeout: Duration,
    connect_timeout: Duration,
}

impl Default for ZohoConfigBuilder {
    fn default() -> Self {
        Self {
            auth_token: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            module_aliases: HashMap::new(),
            field_aliases: HashMap::new(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ZohoConfigBuilder {
    /// Set the auth token.
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = token.into();
        self
    }

    /// Override the API base URL (e.g. for a mock server).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Map a caller-facing module name to its wire name.
    pub fn module_alias(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.module_aliases.insert(from.into(), to.into());
        self
    }

    /// Map a caller-facing field name to its wire name within a module.
    ///
    /// The per-module table is created on first use; registering a field
    /// for a previously-unseen module is not an error.
    pub fn field_alias(
        mut self,
        module: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        self.field_aliases
            .entry(module.into())
            .or_default()
            .insert(from.into(), to.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<ZohoConfig> {
        if self.auth_token.is_empty() {
            return Err(Error::new(ErrorKind::Config(
                "auth token must not be empty".to_string(),
            )));
        }

        Ok(ZohoConfig {
            auth_token: self.auth_token,
            base_url: self.base_url,
            module_aliases: self.module_aliases,
            field_aliases: self.field_aliases,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
        })
    }
}
