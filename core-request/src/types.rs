//! Request, upload and download option and result types.

use bridge_traits::request::{Headers, HostDownloadResponse};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RequestError;

/// Form field that can remap a successful upload's status code
pub const SUCCESS_ACTION_STATUS: &str = "success_action_status";

/// Arguments of [`RequestClient::post`](crate::RequestClient::post)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostOptions {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default)]
    pub headers: Headers,
}

impl PostOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// Arguments of [`RequestClient::upload`](crate::RequestClient::upload)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOptions {
    pub url: String,
    /// Path of the local file to upload
    pub file: String,
    /// Extra form fields
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default)]
    pub headers: Headers,
}

impl UploadOptions {
    pub fn new(url: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            file: file.into(),
            ..Default::default()
        }
    }

    pub fn field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Status code requested through `success_action_status`, if any.
    ///
    /// Strings are read like `parseInt(s, 10)`: leading whitespace and an
    /// optional `+` are skipped and the leading digits are used. Numbers are
    /// truncated. Anything falsy, unparsable, negative or above `u16::MAX`
    /// yields `None`, since no HTTP status can carry it.
    pub fn success_action_status(&self) -> Option<u16> {
        match self.data.get(SUCCESS_ACTION_STATUS)? {
            Value::String(text) => parse_leading_digits(text),
            Value::Number(number) => {
                let value = number.as_f64()?;
                if value < 1.0 || value >= f64::from(u16::MAX) + 1.0 {
                    return None;
                }
                Some(value.trunc() as u16)
            }
            _ => None,
        }
    }
}

fn parse_leading_digits(text: &str) -> Option<u16> {
    let trimmed = text.trim_start();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok().filter(|status| *status != 0)
}

/// Arguments of [`RequestClient::download`](crate::RequestClient::download)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadOptions {
    pub url: String,
    #[serde(default)]
    pub headers: Headers,
}

impl DownloadOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Headers::new(),
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// Successful upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub status_code: u16,
    pub data: Value,
}

impl UploadResult {
    /// Normalize the host's upload response.
    ///
    /// Empty payloads (`null`, `false`, `0`, `""`) become `{}`; a host 200 is
    /// replaced by `requested_status` when one was supplied.
    pub(crate) fn from_host(status_code: u16, data: Value, requested_status: Option<u16>) -> Self {
        let data = if is_falsy(&data) {
            Value::Object(Map::new())
        } else {
            data
        };
        let status_code = match (status_code, requested_status) {
            (200, Some(requested)) => requested,
            (status, _) => status,
        };
        Self { status_code, data }
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Outcome of an upload.
///
/// Uploads never fail the future: a host failure is delivered as
/// [`UploadOutcome::Failed`] with the raw payload.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    Completed(UploadResult),
    Failed(RequestError),
}

impl UploadOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, UploadOutcome::Completed(_))
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            UploadOutcome::Completed(result) => Some(result.status_code),
            UploadOutcome::Failed(_) => None,
        }
    }

    pub fn into_result(self) -> Result<UploadResult, RequestError> {
        match self {
            UploadOutcome::Completed(result) => Ok(result),
            UploadOutcome::Failed(error) => Err(error),
        }
    }
}

/// Successful download
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadResult {
    /// Status 200 with a transient file reference; nothing is persisted
    TempFile { temp_file_path: String },
    /// Any other host response, unchanged
    Raw(HostDownloadResponse),
}

impl DownloadResult {
    pub(crate) fn from_host(response: HostDownloadResponse) -> Self {
        match response {
            HostDownloadResponse {
                status_code: 200,
                temp_file_path: Some(temp_file_path),
                ..
            } if !temp_file_path.is_empty() => DownloadResult::TempFile { temp_file_path },
            other => DownloadResult::Raw(other),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            DownloadResult::TempFile { .. } => 200,
            DownloadResult::Raw(response) => response.status_code,
        }
    }

    pub fn temp_file_path(&self) -> Option<&str> {
        match self {
            DownloadResult::TempFile { temp_file_path } => Some(temp_file_path),
            DownloadResult::Raw(response) => response.temp_file_path.as_deref(),
        }
    }
}
