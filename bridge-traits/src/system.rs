//! System Information and Capability Descriptor
//!
//! Instead of probing host objects for individual functions, a host declares
//! what it supports once through [`HostCapabilities`].

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Capabilities a host declares up front
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostCapabilities {
    /// `onHide` / `offHide` / `onShow` / `offShow`
    pub lifecycle_events: bool,
    /// `getSystemInfoSync`
    pub system_info: bool,
    /// `getStorageSync` / `setStorageSync`
    pub storage: bool,
    /// `connectSocket`
    pub connect_socket: bool,
    /// `request`
    pub request: bool,
}

impl HostCapabilities {
    /// Every capability declared
    pub fn all() -> Self {
        Self {
            lifecycle_events: true,
            system_info: true,
            storage: true,
            connect_socket: true,
            request: true,
        }
    }

    /// Names of the capabilities that are not declared
    pub fn missing(&self) -> Vec<&'static str> {
        let checks = [
            (self.lifecycle_events, "lifecycle_events"),
            (self.system_info, "system_info"),
            (self.storage, "storage"),
            (self.connect_socket, "connect_socket"),
            (self.request, "request"),
        ];
        checks
            .iter()
            .filter(|(present, _)| !present)
            .map(|(_, name)| *name)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}

/// Result of `getSystemInfoSync`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemInfo {
    pub brand: String,
    pub model: String,
    pub platform: String,
    pub system: String,
    pub version: String,
    pub sdk_version: String,
}

/// Result of `getEnvInfoSync`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnvInfo {
    pub app_key: Option<String>,
    pub app_name: Option<String>,
    pub env: Option<String>,
}

/// Host system probe trait
pub trait SystemHost: Send + Sync {
    /// Capabilities this host supports
    fn capabilities(&self) -> HostCapabilities;

    fn get_system_info_sync(&self) -> Result<SystemInfo>;

    /// Environment information; older hosts return `NotAvailable`
    fn get_env_info_sync(&self) -> Result<EnvInfo>;
}
