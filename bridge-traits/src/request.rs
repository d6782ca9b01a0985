//! Request Host Abstraction
//!
//! The host exposes callback-style request, upload and download primitives.
//! Each call returns a task handle that can be aborted; the outcome is
//! delivered exactly once through the supplied completion callback.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::HostFailure;

/// Header map passed to and received from the host.
pub type Headers = HashMap<String, String>;

/// Completion callback for a host task.
///
/// Hosts must invoke it at most once. Dropping it without invoking it is
/// allowed (for example after an abort) and is observed by the caller.
pub type Completion<T> = Box<dyn FnOnce(std::result::Result<T, HostFailure>) + Send + 'static>;

/// HTTP method types understood by the host request primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

/// Arguments of the host `request` primitive
#[derive(Debug, Clone, PartialEq)]
pub struct HostRequest {
    pub url: String,
    pub method: HttpMethod,
    pub header: Headers,
    pub data: Option<Value>,
}

impl HostRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            header: Headers::new(),
            data: None,
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.header.insert(key.into(), value.into());
        self
    }

    pub fn headers(mut self, headers: Headers) -> Self {
        self.header.extend(headers);
        self
    }

    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Arguments of the host `uploadFile` primitive
#[derive(Debug, Clone, PartialEq)]
pub struct HostUpload {
    pub url: String,
    pub file_path: String,
    /// Form field the file content is carried under
    pub name: String,
    pub header: Headers,
    pub form_data: Map<String, Value>,
}

/// Arguments of the host `downloadFile` primitive
#[derive(Debug, Clone, PartialEq)]
pub struct HostDownload {
    pub url: String,
    pub header: Headers,
}

/// Response delivered by `request` and `uploadFile`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostResponse {
    pub status_code: u16,
    #[serde(default)]
    pub header: Headers,
    #[serde(default)]
    pub data: Value,
}

impl HostResponse {
    pub fn new(status_code: u16, data: Value) -> Self {
        Self {
            status_code,
            header: Headers::new(),
            data,
        }
    }

    /// Check if response status is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Response delivered by `downloadFile`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostDownloadResponse {
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_file_path: Option<String>,
    #[serde(default)]
    pub header: Headers,
    /// Any further fields the host attaches (file size, profile data, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HostDownloadResponse {
    pub fn new(status_code: u16, temp_file_path: Option<String>) -> Self {
        Self {
            status_code,
            temp_file_path,
            header: Headers::new(),
            extra: Map::new(),
        }
    }
}

/// Handle to an in-flight host task
pub trait HostTask: Send + Sync {
    /// Ask the host to abort the task.
    ///
    /// Hosts are expected to follow an abort with the task's failure
    /// callback, but callers must not rely on it.
    fn abort(&self);
}

/// Host request primitives
///
/// Implementations must be callable from any thread and must not invoke the
/// completion while holding locks the caller might need; invoking it
/// synchronously from inside the call is permitted.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::request::{HostRequest, HttpMethod, RequestHost};
///
/// fn ping(host: &dyn RequestHost) {
///     let request = HostRequest::new(HttpMethod::Get, "https://example.com/ping");
///     let task = host.request(request, Box::new(|outcome| {
///         println!("{outcome:?}");
///     }));
///     task.abort();
/// }
/// ```
pub trait RequestHost: Send + Sync {
    fn request(&self, request: HostRequest, complete: Completion<HostResponse>)
        -> Arc<dyn HostTask>;

    fn upload_file(&self, upload: HostUpload, complete: Completion<HostResponse>)
        -> Arc<dyn HostTask>;

    fn download_file(
        &self,
        download: HostDownload,
        complete: Completion<HostDownloadResponse>,
    ) -> Arc<dyn HostTask>;
}

/// A task that has already finished; aborting it does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FinishedTask;

impl HostTask for FinishedTask {
    fn abort(&self) {}
}
