use std::time::Duration;

use crate::error::{AsinError, Result};
use crate::params::{ParamValue, Params};

/// Request path of the REST endpoint; constant for every operation.
pub const PATH: &str = "/onca/xml";

/// Host used when none is configured.
pub const DEFAULT_HOST: &str = "webservices.amazon.com";

/// Configuration for the product API client.
///
/// `ClientConfig::default()` is the pristine configuration; build a fresh one
/// instead of mutating a shared instance when credentials or hosts differ.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Host the requests are sent to and that takes part in the signature.
    pub host: String,

    /// URL scheme, `http` unless overridden.
    pub scheme: String,

    /// Optional API version, sent as `Version` when set.
    pub version: Option<String>,

    /// HTTP request timeout.
    pub timeout: Duration,

    /// Whether the client emits `log` records. `false` silences the crate.
    pub logging: bool,

    /// Parameters sent with every request unless the call sets the same key.
    pub default_params: Params,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            scheme: "http".to_string(),
            version: None,
            timeout: Duration::from_secs(30),
            logging: true,
            default_params: Params::new(),
        }
    }
}

impl ClientConfig {
    /// Sets the host, e.g. `webservices.amazon.de`.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the URL scheme (`http` or `https`).
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Sets the API version sent with every request.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the HTTP request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enables or disables log output from the client.
    pub fn with_logging(mut self, logging: bool) -> Self {
        self.logging = logging;
        self
    }

    /// Adds a parameter sent with every request, e.g. a marketplace-wide
    /// `Condition`.
    pub fn with_default_param(
        mut self,
        key: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Self {
        self.default_params.insert(key, value);
        self
    }

    /// Base URL of the endpoint, without query string.
    pub fn endpoint(&self) -> String {
        format!("{}://{}{}", self.scheme, self.host, PATH)
    }

    /// Checks the fields that must be present before any request is signed.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(AsinError::Config("host must not be empty".into()));
        }
        if self.scheme != "http" && self.scheme != "https" {
            return Err(AsinError::Config(format!(
                "unsupported scheme '{}', expected http or https",
                self.scheme
            )));
        }
        Ok(())
    }

    /// The version to send, if one is configured and non-blank.
    pub(crate) fn version(&self) -> Option<&str> {
        self.version.as_deref().filter(|v| !v.trim().is_empty())
    }
}
