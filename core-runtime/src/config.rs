//! # Request Configuration
//!
//! Timeout policy shared by every operation of a request client.
//!
//! ## Overview
//!
//! A [`RequestConfig`] is fixed once the client is constructed. It carries the
//! timeout in milliseconds (`0` disables it), the message logged when a timer
//! fires, and the set of operation kinds the timeout applies to.
//!
//! ## Usage
//!
//! ```
//! use core_runtime::config::{RequestConfig, RequestMethod};
//! use std::time::Duration;
//!
//! let config = RequestConfig::builder()
//!     .timeout_ms(5_000)
//!     .restricted_methods([RequestMethod::Post, RequestMethod::Upload])
//!     .build();
//!
//! assert_eq!(config.timeout_for(RequestMethod::Post), Some(Duration::from_millis(5_000)));
//! assert_eq!(config.timeout_for(RequestMethod::Download), None);
//! ```
//!
//! The SDK hands the same settings over as JSON:
//!
//! ```
//! use core_runtime::config::RequestConfig;
//!
//! let config = RequestConfig::from_json(
//!     r#"{"timeout": 3000, "timeoutMsg": "slow network", "restrictedMethods": ["post"]}"#,
//! )
//! .unwrap();
//! assert_eq!(config.timeout_message, "slow network");
//! ```

use crate::error::{Error, Result};

use core_async::time::millis_or_unlimited;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Message logged when no explicit timeout message is configured
pub const DEFAULT_TIMEOUT_MESSAGE: &str = "request timeout";

/// Operation kinds a timeout can be restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestMethod {
    Get,
    Post,
    Upload,
    Download,
}

impl RequestMethod {
    pub const ALL: [RequestMethod; 4] = [
        RequestMethod::Get,
        RequestMethod::Post,
        RequestMethod::Upload,
        RequestMethod::Download,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMethod::Get => "get",
            RequestMethod::Post => "post",
            RequestMethod::Upload => "upload",
            RequestMethod::Download => "download",
        }
    }
}

/// Timeout policy of a request client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestConfig {
    /// Timeout in milliseconds; `0` means unlimited
    pub timeout_ms: u64,
    /// Logged at WARN when a timer fires
    pub timeout_message: String,
    /// Operation kinds subject to the timeout
    pub restricted_methods: HashSet<RequestMethod>,
    /// Settle with `TimedOut` as soon as the timer fires instead of waiting
    /// for the host's abort callback
    pub settle_on_timeout: bool,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 0,
            timeout_message: DEFAULT_TIMEOUT_MESSAGE.to_string(),
            restricted_methods: RequestMethod::ALL.into_iter().collect(),
            settle_on_timeout: false,
        }
    }
}

/// JSON shape used by the SDK
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRequestConfig {
    #[serde(default)]
    timeout: Option<u64>,
    #[serde(default)]
    timeout_msg: Option<String>,
    #[serde(default)]
    restricted_methods: Option<HashSet<RequestMethod>>,
    #[serde(default)]
    settle_on_timeout: Option<bool>,
}

impl RequestConfig {
    /// Creates a new builder for constructing a `RequestConfig`.
    pub fn builder() -> RequestConfigBuilder {
        RequestConfigBuilder::default()
    }

    /// Parse the SDK's `{timeout, timeoutMsg, restrictedMethods}` object.
    ///
    /// Missing fields take their defaults. An empty `timeoutMsg` falls back to
    /// the default message; an empty `restrictedMethods` list is kept as is.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawRequestConfig = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Invalid request config: {}", e)))?;

        let mut builder = Self::builder();
        if let Some(timeout) = raw.timeout {
            builder = builder.timeout_ms(timeout);
        }
        if let Some(message) = raw.timeout_msg {
            builder = builder.timeout_message(message);
        }
        if let Some(methods) = raw.restricted_methods {
            builder = builder.restricted_methods(methods);
        }
        if let Some(settle) = raw.settle_on_timeout {
            builder = builder.settle_on_timeout(settle);
        }

        Ok(builder.build())
    }

    /// Timeout applicable to `method`, or `None` when it runs unguarded.
    pub fn timeout_for(&self, method: RequestMethod) -> Option<Duration> {
        if !self.restricted_methods.contains(&method) {
            return None;
        }
        millis_or_unlimited(self.timeout_ms)
    }
}

/// Builder for [`RequestConfig`]
#[derive(Debug, Default)]
pub struct RequestConfigBuilder {
    timeout_ms: u64,
    timeout_message: Option<String>,
    restricted_methods: Option<HashSet<RequestMethod>>,
    settle_on_timeout: bool,
}

impl RequestConfigBuilder {
    /// Sets the timeout in milliseconds (`0` disables it).
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Sets the message logged when a timer fires. Empty messages are
    /// replaced by [`DEFAULT_TIMEOUT_MESSAGE`].
    pub fn timeout_message(mut self, message: impl Into<String>) -> Self {
        self.timeout_message = Some(message.into());
        self
    }

    /// Restricts the timeout to the given operation kinds.
    pub fn restricted_methods(mut self, methods: impl IntoIterator<Item = RequestMethod>) -> Self {
        self.restricted_methods = Some(methods.into_iter().collect());
        self
    }

    pub fn settle_on_timeout(mut self, settle: bool) -> Self {
        self.settle_on_timeout = settle;
        self
    }

    pub fn build(self) -> RequestConfig {
        let timeout_message = self
            .timeout_message
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| DEFAULT_TIMEOUT_MESSAGE.to_string());

        RequestConfig {
            timeout_ms: self.timeout_ms,
            timeout_message,
            restricted_methods: self
                .restricted_methods
                .unwrap_or_else(|| RequestMethod::ALL.into_iter().collect()),
            settle_on_timeout: self.settle_on_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RequestConfig::default();
        assert_eq!(config.timeout_ms, 0);
        assert_eq!(config.timeout_message, DEFAULT_TIMEOUT_MESSAGE);
        assert_eq!(config.restricted_methods.len(), 4);
        assert!(!config.settle_on_timeout);
        assert_eq!(config, RequestConfig::builder().build());
    }

    #[test]
    fn test_zero_timeout_never_applies() {
        let config = RequestConfig::builder().timeout_ms(0).build();
        for method in RequestMethod::ALL {
            assert_eq!(config.timeout_for(method), None);
        }
    }

    #[test]
    fn test_timeout_respects_restricted_methods() {
        let config = RequestConfig::builder()
            .timeout_ms(1_000)
            .restricted_methods([RequestMethod::Upload])
            .build();

        assert_eq!(config.timeout_for(RequestMethod::Post), None);
        assert_eq!(
            config.timeout_for(RequestMethod::Upload),
            Some(Duration::from_millis(1_000))
        );
    }

    #[test]
    fn test_empty_restricted_methods_stays_empty() {
        let config = RequestConfig::builder()
            .timeout_ms(1_000)
            .restricted_methods(std::iter::empty())
            .build();

        assert!(config.restricted_methods.is_empty());
        assert_eq!(config.timeout_for(RequestMethod::Get), None);
    }

    #[test]
    fn test_empty_timeout_message_falls_back() {
        let config = RequestConfig::builder().timeout_message("").build();
        assert_eq!(config.timeout_message, DEFAULT_TIMEOUT_MESSAGE);
    }

    #[test]
    fn test_from_json_full() {
        let config = RequestConfig::from_json(
            r#"{"timeout":2500,"timeoutMsg":"too slow","restrictedMethods":["post","download"],"settleOnTimeout":true}"#,
        )
        .unwrap();

        assert_eq!(config.timeout_ms, 2500);
        assert_eq!(config.timeout_message, "too slow");
        assert!(config.restricted_methods.contains(&RequestMethod::Post));
        assert!(config.restricted_methods.contains(&RequestMethod::Download));
        assert!(!config.restricted_methods.contains(&RequestMethod::Get));
        assert!(config.settle_on_timeout);
    }

    #[test]
    fn test_from_json_defaults() {
        let config = RequestConfig::from_json("{}").unwrap();
        assert_eq!(config, RequestConfig::default());

        let config = RequestConfig::from_json(r#"{"timeoutMsg":""}"#).unwrap();
        assert_eq!(config.timeout_message, DEFAULT_TIMEOUT_MESSAGE);
    }

    #[test]
    fn test_from_json_rejects_unknown_method() {
        let err = RequestConfig::from_json(r#"{"restrictedMethods":["patch"]}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_config_is_cloneable() {
        let config = RequestConfig::builder().timeout_ms(10).build();
        let cloned = config.clone();
        assert_eq!(config, cloned);
    }
}
