//! Workspace umbrella crate.
//!
//! Re-exports the composition root from `core-service` so an SDK can depend on
//! `host-adapter` alone and pick the host bridges through feature flags
//! (`desktop-shims` wires the reqwest/tungstenite desktop host).

pub use core_service::*;
