//! End-to-end flows through the adapter against scripted hosts.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::request::HostResponse;
use bridge_traits::socket::ConnectOptions;
use bridge_traits::storage::StorageHost;
use bridge_traits::system::{EnvInfo, HostCapabilities, SystemHost, SystemInfo};
use bridge_traits::testing::{ImmediateReply, RecordedCall, ScriptedRequestHost, ScriptedSocketHost};
use core_request::{PostOptions, UploadOptions};
use core_runtime::RequestConfig;
use core_service::{BdGameAdapter, CoreError, HostBridges, PlatformAdapter, StorageTier};
use core_socket::ReadyState;
use serde_json::{json, Value};

#[derive(Default)]
struct MemoryStorage {
    entries: Mutex<HashMap<String, Value>>,
}

impl StorageHost for MemoryStorage {
    fn get_storage_sync(&self, key: &str) -> BridgeResult<Option<Value>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set_storage_sync(&self, key: &str, value: Value) -> BridgeResult<()> {
        self.entries.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    fn remove_storage_sync(&self, key: &str) -> BridgeResult<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    fn clear_storage_sync(&self) -> BridgeResult<()> {
        self.entries.lock().unwrap().clear();
        Ok(())
    }
}

struct MiniGameSystem {
    app_key: Option<&'static str>,
}

impl SystemHost for MiniGameSystem {
    fn capabilities(&self) -> HostCapabilities {
        HostCapabilities::all()
    }

    fn get_system_info_sync(&self) -> BridgeResult<SystemInfo> {
        Ok(SystemInfo {
            platform: "android".to_string(),
            ..SystemInfo::default()
        })
    }

    fn get_env_info_sync(&self) -> BridgeResult<EnvInfo> {
        match self.app_key {
            Some(key) => Ok(EnvInfo {
                app_key: Some(key.to_string()),
                ..EnvInfo::default()
            }),
            None => Err(BridgeError::NotAvailable("getEnvInfoSync".to_string())),
        }
    }
}

fn bridges(
    request: ScriptedRequestHost,
    socket: ScriptedSocketHost,
    app_key: Option<&'static str>,
) -> HostBridges {
    HostBridges::new(
        Arc::new(request),
        Arc::new(socket),
        Arc::new(MemoryStorage::default()),
        Arc::new(MiniGameSystem { app_key }),
    )
}

#[tokio::test]
async fn test_post_through_adapter() {
    let request = ScriptedRequestHost::new().with_immediate_reply(ImmediateReply::Response(
        HostResponse::new(200, json!({ "code": 0 })),
    ));
    let adapter = BdGameAdapter
        .detect(bridges(request.clone(), ScriptedSocketHost::new(), Some("k")))
        .unwrap();

    let client = adapter.request_client(RequestConfig::default());
    let response = client
        .post(PostOptions::new("api.example.com/v1/login").data(json!({ "code": "x" })))
        .await
        .unwrap();

    assert_eq!(response.data, json!({ "code": 0 }));
    match &request.calls()[0] {
        RecordedCall::Request(call) => {
            assert_eq!(call.url, "https://api.example.com/v1/login");
            assert_eq!(call.data, Some(json!({ "code": "x" })));
        }
        other => panic!("unexpected call: {other:?}"),
    }
}

#[tokio::test]
async fn test_upload_through_json_configured_client() {
    let request = ScriptedRequestHost::new().with_immediate_reply(ImmediateReply::Response(
        HostResponse::new(200, Value::String(String::new())),
    ));
    let adapter =
        BdGameAdapter.gen_adapter(bridges(request, ScriptedSocketHost::new(), None));

    let client = adapter
        .request_client_from_json(r#"{"timeout": 3000, "restrictedMethods": ["upload"]}"#)
        .unwrap();
    let outcome = client
        .upload(
            UploadOptions::new("//cdn.example.com/upload", "/tmp/a.png")
                .field("success_action_status", json!("201")),
        )
        .await;

    let result = outcome.into_result().unwrap();
    assert_eq!(result.status_code, 201);
    assert_eq!(result.data, json!({}));
}

#[test]
fn test_socket_through_adapter() {
    let socket_host = ScriptedSocketHost::new();
    let adapter = BdGameAdapter.gen_adapter(bridges(
        ScriptedRequestHost::new(),
        socket_host.clone(),
        None,
    ));

    let session = adapter
        .connect_socket("wss://rt.example.com/ws", ConnectOptions::default())
        .unwrap();
    let socket = socket_host.socket(0).unwrap();

    assert_eq!(session.ready_state(), ReadyState::Connecting);
    socket.emit_open();
    assert_eq!(session.ready_state(), ReadyState::Open);
    socket.emit_close(Some(1000), "");
    assert_eq!(session.ready_state(), ReadyState::Closed);
}

#[test]
fn test_connect_failure_maps_to_core_error() {
    let socket_host = ScriptedSocketHost::new();
    socket_host.fail_connects_with(BridgeError::NotAvailable("connectSocket".to_string()));
    let adapter = BdGameAdapter.gen_adapter(bridges(
        ScriptedRequestHost::new(),
        socket_host,
        None,
    ));

    let err = adapter
        .connect_socket("wss://rt.example.com/ws", ConnectOptions::default())
        .unwrap_err();
    assert!(matches!(err, CoreError::Socket(_)));
}

#[test]
fn test_storage_and_signature() {
    let adapter = BdGameAdapter.gen_adapter(bridges(
        ScriptedRequestHost::new(),
        ScriptedSocketHost::new(),
        Some("sign-abc"),
    ));

    assert_eq!(adapter.primary_storage(), StorageTier::Local);
    assert_eq!(adapter.app_sign(), "sign-abc");

    let storage = adapter.local_storage();
    storage.set_item("access_token", "t0k3n").unwrap();
    assert_eq!(storage.get_item("access_token").unwrap(), Some(json!("t0k3n")));
    storage.clear().unwrap();
    assert_eq!(storage.get_item("access_token").unwrap(), None);
}

#[test]
fn test_signature_empty_on_old_hosts() {
    let adapter = BdGameAdapter.gen_adapter(bridges(
        ScriptedRequestHost::new(),
        ScriptedSocketHost::new(),
        None,
    ));
    assert_eq!(adapter.app_sign(), "");
}
