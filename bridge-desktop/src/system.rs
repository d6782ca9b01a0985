//! System probe for desktop processes

use bridge_traits::{
    error::{BridgeError, Result},
    system::{EnvInfo, HostCapabilities, SystemHost, SystemInfo},
};

/// Environment variable read by [`DesktopSystem::from_env`]
pub const APP_KEY_ENV: &str = "HOST_ADAPTER_APP_KEY";

/// Desktop system host
///
/// Reports every capability. The environment probe only succeeds once an
/// app key is configured, matching hosts that predate `getEnvInfoSync`.
#[derive(Debug, Clone, Default)]
pub struct DesktopSystem {
    app_key: Option<String>,
    app_name: Option<String>,
}

impl DesktopSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick up the app key from `HOST_ADAPTER_APP_KEY` when set
    pub fn from_env() -> Self {
        let app_key = std::env::var(APP_KEY_ENV).ok().filter(|key| !key.is_empty());
        Self {
            app_key,
            app_name: None,
        }
    }

    pub fn with_app_key(mut self, app_key: impl Into<String>) -> Self {
        self.app_key = Some(app_key.into());
        self
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }
}

impl SystemHost for DesktopSystem {
    fn capabilities(&self) -> HostCapabilities {
        HostCapabilities::all()
    }

    fn get_system_info_sync(&self) -> Result<SystemInfo> {
        Ok(SystemInfo {
            brand: "desktop".to_string(),
            model: std::env::consts::ARCH.to_string(),
            platform: std::env::consts::OS.to_string(),
            system: format!("{} {}", std::env::consts::OS, std::env::consts::ARCH),
            version: env!("CARGO_PKG_VERSION").to_string(),
            sdk_version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    fn get_env_info_sync(&self) -> Result<EnvInfo> {
        match &self.app_key {
            Some(app_key) => Ok(EnvInfo {
                app_key: Some(app_key.clone()),
                app_name: self.app_name.clone(),
                env: Some("desktop".to_string()),
            }),
            None => Err(BridgeError::NotAvailable("getEnvInfoSync".to_string())),
        }
    }
}
