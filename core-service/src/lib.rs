//! Composition root and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (request, socket,
//! storage, system) into the request coordinator and socket session, and
//! hands the result to the SDK as an [`SdkAdapter`]. Hosts are detected
//! through [`PlatformAdapter`]; the `bd_game` mini-game runtime is the only
//! one implemented.
//!
//! Desktop builds enable the `desktop-shims` feature (which depends on
//! `bridge-desktop`) and call [`desktop_bridges`] to get a working host
//! outside a mini-game runtime.
//!
//! ```ignore
//! use core_service::{desktop_bridges, BdGameAdapter, PlatformAdapter};
//! use core_runtime::RequestConfig;
//!
//! # async fn example() -> core_service::Result<()> {
//! let bridges = desktop_bridges(None)?;
//! let adapter = BdGameAdapter.detect(bridges)?;
//! let client = adapter.request_client(RequestConfig::builder().timeout_ms(5_000).build());
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod error;
pub mod storage;

pub use adapter::{BdGameAdapter, HostBridges, PlatformAdapter, SdkAdapter};
pub use error::{CoreError, Result};
pub use storage::{LocalStorage, StorageTier};

#[cfg(feature = "desktop-shims")]
use std::{path::PathBuf, sync::Arc};

/// Build bridges backed by the desktop host.
///
/// `storage_path` selects a JSON file for persistent storage; `None` keeps
/// storage in memory. The app key for `app_sign` comes from
/// `HOST_ADAPTER_APP_KEY`.
#[cfg(feature = "desktop-shims")]
pub fn desktop_bridges(storage_path: Option<PathBuf>) -> Result<HostBridges> {
    use bridge_desktop::{DesktopSystem, FileStorage, ReqwestRequestHost, TungsteniteSocketHost};

    let request = ReqwestRequestHost::new()
        .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;
    let storage = match storage_path {
        Some(path) => FileStorage::open(path)
            .map_err(|err| CoreError::InitializationFailed(err.to_string()))?,
        None => FileStorage::in_memory(),
    };

    tracing::debug!("desktop bridges initialised");
    Ok(HostBridges::new(
        Arc::new(request),
        Arc::new(TungsteniteSocketHost::new()),
        Arc::new(storage),
        Arc::new(DesktopSystem::from_env()),
    ))
}
