//! Composition root: host detection and the adapter handed to the SDK.

use std::sync::Arc;

use bridge_traits::request::RequestHost;
use bridge_traits::socket::{ConnectOptions, SocketHost};
use bridge_traits::storage::StorageHost;
use bridge_traits::system::SystemHost;
use core_request::RequestClient;
use core_runtime::config::RequestConfig;
use core_socket::SocketSession;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::error::{CoreError, Result};
use crate::storage::{LocalStorage, StorageTier};

/// Host capability implementations the adapter is built from.
#[derive(Clone)]
pub struct HostBridges {
    pub request: Arc<dyn RequestHost>,
    pub socket: Arc<dyn SocketHost>,
    pub storage: Arc<dyn StorageHost>,
    pub system: Arc<dyn SystemHost>,
}

impl HostBridges {
    pub fn new(
        request: Arc<dyn RequestHost>,
        socket: Arc<dyn SocketHost>,
        storage: Arc<dyn StorageHost>,
        system: Arc<dyn SystemHost>,
    ) -> Self {
        Self {
            request,
            socket,
            storage,
            system,
        }
    }
}

/// Capability surface consumed by the SDK.
#[derive(Clone)]
pub struct SdkAdapter {
    bridges: HostBridges,
    local_storage: LocalStorage,
    root: Map<String, Value>,
}

impl SdkAdapter {
    pub fn new(bridges: HostBridges) -> Self {
        let local_storage = LocalStorage::new(Arc::clone(&bridges.storage));
        Self {
            bridges,
            local_storage,
            root: Map::new(),
        }
    }

    /// Global object the SDK may attach to; always empty on mini-game hosts.
    pub fn root(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn request_client(&self, config: RequestConfig) -> RequestClient {
        RequestClient::new(Arc::clone(&self.bridges.request), config)
    }

    /// Build a request client from the SDK's JSON config object.
    pub fn request_client_from_json(&self, config: &str) -> Result<RequestClient> {
        Ok(self.request_client(RequestConfig::from_json(config)?))
    }

    pub fn connect_socket(&self, url: &str, options: ConnectOptions) -> Result<SocketSession> {
        Ok(SocketSession::connect(
            self.bridges.socket.as_ref(),
            url,
            options,
        )?)
    }

    pub fn local_storage(&self) -> &LocalStorage {
        &self.local_storage
    }

    /// Mini-game hosts have no session storage.
    pub fn primary_storage(&self) -> StorageTier {
        StorageTier::Local
    }

    /// Environment signature (`appKey`), or `""` when the host can't provide it.
    pub fn app_sign(&self) -> String {
        match self.bridges.system.get_env_info_sync() {
            Ok(info) => info.app_key.unwrap_or_default(),
            Err(err) => {
                debug!(error = %err, "env info unavailable");
                String::new()
            }
        }
    }
}

impl std::fmt::Debug for SdkAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdkAdapter")
            .field("primary_storage", &self.primary_storage())
            .finish_non_exhaustive()
    }
}

/// A host platform the SDK can run on.
pub trait PlatformAdapter {
    /// Runtime tag reported to the SDK
    fn runtime(&self) -> &'static str;

    /// Whether `bridges` describe a host this adapter supports.
    fn is_match(&self, bridges: &HostBridges) -> bool;

    fn gen_adapter(&self, bridges: HostBridges) -> SdkAdapter;
}

/// Adapter for the `bd_game` mini-game runtime
#[derive(Debug, Clone, Copy, Default)]
pub struct BdGameAdapter;

impl BdGameAdapter {
    pub const RUNTIME: &'static str = "bd_game";

    /// Build the adapter, or explain which capability is missing.
    #[instrument(skip_all)]
    pub fn detect(&self, bridges: HostBridges) -> Result<SdkAdapter> {
        let missing = bridges.system.capabilities().missing();
        if !missing.is_empty() {
            return Err(CoreError::CapabilityMissing {
                capability: missing.join(", "),
                message: format!("{} host does not declare these capabilities", Self::RUNTIME),
            });
        }

        bridges
            .system
            .get_system_info_sync()
            .map_err(|err| CoreError::CapabilityMissing {
                capability: "system_info".to_string(),
                message: err.to_string(),
            })?;

        Ok(self.gen_adapter(bridges))
    }
}

impl PlatformAdapter for BdGameAdapter {
    fn runtime(&self) -> &'static str {
        Self::RUNTIME
    }

    fn is_match(&self, bridges: &HostBridges) -> bool {
        let capabilities = bridges.system.capabilities();
        if !capabilities.is_complete() {
            debug!(missing = ?capabilities.missing(), "host capabilities incomplete");
            return false;
        }
        match bridges.system.get_system_info_sync() {
            Ok(info) => {
                debug!(platform = %info.platform, "host matched");
                true
            }
            Err(err) => {
                debug!(error = %err, "system info probe failed");
                false
            }
        }
    }

    fn gen_adapter(&self, bridges: HostBridges) -> SdkAdapter {
        info!(runtime = Self::RUNTIME, "adapter generated");
        SdkAdapter::new(bridges)
    }
}
