//! Request host implementation using Reqwest
//!
//! Every host call is spawned onto the current Tokio runtime and raced against
//! a cancellation token, so `abort()` resolves the completion with the usual
//! `<operation>:fail abort` failure.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use bridge_traits::{
    error::{BridgeError, HostFailure, Result},
    request::{
        Completion, FinishedTask, Headers, HostDownload, HostDownloadResponse, HostRequest,
        HostResponse, HostTask, HostUpload, HttpMethod, RequestHost,
    },
};
use core_async::runtime::Handle;
use core_async::task;
use core_async::sync::CancellationToken;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

/// Reqwest-based request host
///
/// Provides the mini-game request primitives with:
/// - Connection pooling via reqwest
/// - Multipart uploads from local files
/// - Downloads into a temporary directory
#[derive(Clone)]
pub struct ReqwestRequestHost {
    client: Client,
    download_dir: PathBuf,
}

impl ReqwestRequestHost {
    /// Create a host with default client settings, downloading into the
    /// system temp directory.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("host-adapter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(client))
    }

    /// Create a host around an existing client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            download_dir: std::env::temp_dir(),
        }
    }

    /// Store downloaded files under `dir` instead of the temp directory
    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    fn convert_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Options => reqwest::Method::OPTIONS,
        }
    }

    fn with_headers(mut builder: RequestBuilder, headers: &Headers) -> RequestBuilder {
        for (key, value) in headers {
            builder = builder.header(key, value);
        }
        builder
    }

    /// Build the reqwest request for a host `request` call.
    ///
    /// GET data objects become query parameters; any other data is the body,
    /// strings verbatim and everything else as JSON.
    fn build_request(&self, request: &HostRequest) -> RequestBuilder {
        let builder = self
            .client
            .request(Self::convert_method(request.method), &request.url);
        let mut builder = Self::with_headers(builder, &request.header);

        match (&request.method, &request.data) {
            (_, None) | (_, Some(Value::Null)) => {}
            (HttpMethod::Get, Some(Value::Object(params))) => {
                let pairs: Vec<(String, String)> = params
                    .iter()
                    .map(|(key, value)| (key.clone(), form_value(value)))
                    .collect();
                builder = builder.query(&pairs);
            }
            (_, Some(Value::String(body))) => builder = builder.body(body.clone()),
            (_, Some(data)) => builder = builder.json(data),
        }
        builder
    }

    fn spawn<T, F>(operation: &'static str, complete: Completion<T>, work: F) -> Arc<dyn HostTask>
    where
        T: Send + 'static,
        F: std::future::Future<Output = std::result::Result<T, HostFailure>> + Send + 'static,
    {
        let Ok(handle) = Handle::try_current() else {
            warn!(operation, "no async runtime available");
            complete(Err(HostFailure::new(format!(
                "{operation}:fail no async runtime"
            ))));
            return Arc::new(FinishedTask);
        };

        let token = CancellationToken::new();
        let cancelled = token.clone();
        task::spawn_on(&handle, async move {
            let outcome = tokio::select! {
                biased;
                _ = cancelled.cancelled() => Err(HostFailure::aborted(operation)),
                outcome = work => outcome,
            };
            complete(outcome);
        });

        Arc::new(ReqwestTask { token })
    }
}

struct ReqwestTask {
    token: CancellationToken,
}

impl HostTask for ReqwestTask {
    fn abort(&self) {
        self.token.cancel();
    }
}

fn failure(operation: &str, error: impl std::fmt::Display) -> HostFailure {
    HostFailure::new(format!("{operation}:fail {error}"))
}

fn form_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn response_headers(response: &Response) -> Headers {
    response
        .headers()
        .iter()
        .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
        .collect()
}

/// File name for a download, keeping the URL's extension when it has one
fn download_file_name(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && !ext.contains('/'));
    match extension {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
        None => Uuid::new_v4().to_string(),
    }
}

impl Default for ReqwestRequestHost {
    fn default() -> Self {
        Self::with_client(Client::new())
    }
}

impl RequestHost for ReqwestRequestHost {
    fn request(&self, request: HostRequest, complete: Completion<HostResponse>) -> Arc<dyn HostTask> {
        let builder = self.build_request(&request);
        debug!(method = request.method.as_str(), url = %request.url, "host request");

        Self::spawn("request", complete, async move {
            let response = builder.send().await.map_err(|e| failure("request", e))?;
            let status_code = response.status().as_u16();
            let header = response_headers(&response);
            let body = response.text().await.map_err(|e| failure("request", e))?;
            let data = serde_json::from_str(&body).unwrap_or(Value::String(body));

            Ok(HostResponse {
                status_code,
                header,
                data,
            })
        })
    }

    fn upload_file(&self, upload: HostUpload, complete: Completion<HostResponse>) -> Arc<dyn HostTask> {
        let client = self.client.clone();
        debug!(url = %upload.url, field = %upload.name, "host uploadFile");

        Self::spawn("uploadFile", complete, async move {
            let bytes = tokio::fs::read(&upload.file_path)
                .await
                .map_err(|e| failure("uploadFile", e))?;
            let file_name = Path::new(&upload.file_path)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| upload.name.clone());

            let mut form = Form::new();
            for (key, value) in &upload.form_data {
                // The file part carries this field.
                if key != &upload.name {
                    form = form.text(key.clone(), form_value(value));
                }
            }
            form = form.part(upload.name.clone(), Part::bytes(bytes).file_name(file_name));

            let builder = Self::with_headers(client.post(&upload.url), &upload.header);
            let response = builder
                .multipart(form)
                .send()
                .await
                .map_err(|e| failure("uploadFile", e))?;
            let status_code = response.status().as_u16();
            let header = response_headers(&response);
            let body = response.text().await.map_err(|e| failure("uploadFile", e))?;

            Ok(HostResponse {
                status_code,
                header,
                data: Value::String(body),
            })
        })
    }

    fn download_file(
        &self,
        download: HostDownload,
        complete: Completion<HostDownloadResponse>,
    ) -> Arc<dyn HostTask> {
        let builder = Self::with_headers(self.client.get(&download.url), &download.header);
        let target = self.download_dir.join(download_file_name(&download.url));
        debug!(url = %download.url, "host downloadFile");

        Self::spawn("downloadFile", complete, async move {
            let response = builder.send().await.map_err(|e| failure("downloadFile", e))?;
            let status_code = response.status().as_u16();
            let header = response_headers(&response);
            let bytes = response.bytes().await.map_err(|e| failure("downloadFile", e))?;

            let mut result = HostDownloadResponse::new(status_code, None);
            result.header = header;
            if status_code == 200 {
                if let Some(parent) = target.parent() {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .map_err(|e| failure("downloadFile", e))?;
                }
                tokio::fs::write(&target, &bytes)
                    .await
                    .map_err(|e| failure("downloadFile", e))?;
                result.temp_file_path = Some(target.to_string_lossy().into_owned());
            }
            Ok(result)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serve one connection with a canned HTTP response; returns the base URL.
    async fn serve_once(status: &'static str, content_type: &'static str, body: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let _ = stream.read(&mut buf).await;
            let head = format!(
                "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            stream.write_all(head.as_bytes()).await.unwrap();
            stream.write_all(body).await.unwrap();
            let _ = stream.shutdown().await;
        });
        format!("http://{addr}")
    }

    /// Accept one connection and never answer it.
    async fn serve_silently() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(60)).await;
        });
        format!("http://{addr}")
    }

    fn channel_completion<T: Send + 'static>() -> (
        Completion<T>,
        oneshot::Receiver<std::result::Result<T, HostFailure>>,
    ) {
        let (tx, rx) = oneshot::channel();
        let tx = Mutex::new(Some(tx));
        let complete: Completion<T> = Box::new(move |outcome| {
            if let Some(tx) = tx.lock().unwrap().take() {
                let _ = tx.send(outcome);
            }
        });
        (complete, rx)
    }

    #[test]
    fn test_method_conversion() {
        assert_eq!(
            ReqwestRequestHost::convert_method(HttpMethod::Post),
            reqwest::Method::POST
        );
        assert_eq!(
            ReqwestRequestHost::convert_method(HttpMethod::Options),
            reqwest::Method::OPTIONS
        );
    }

    #[test]
    fn test_download_file_name_keeps_extension() {
        assert!(download_file_name("https://x.com/a/b.png?sig=1").ends_with(".png"));
        assert!(!download_file_name("https://x.com/a/b").contains('.'));
    }

    #[test]
    fn test_dispatch_without_runtime_fails_immediately() {
        let host = ReqwestRequestHost::default();
        let outcome = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&outcome);

        host.request(
            HostRequest::new(HttpMethod::Post, "http://127.0.0.1:9"),
            Box::new(move |result| *slot.lock().unwrap() = Some(result)),
        );

        let outcome = outcome.lock().unwrap().take().unwrap();
        assert!(outcome.unwrap_err().err_msg.starts_with("request:fail"));
    }

    #[tokio::test]
    async fn test_request_parses_json_body() {
        let url = serve_once("200 OK", "application/json", br#"{"code":0}"#).await;
        let host = ReqwestRequestHost::default();
        let (complete, rx) = channel_completion();

        host.request(
            HostRequest::new(HttpMethod::Post, url).data(json!({ "action": "ping" })),
            complete,
        );

        let response = rx.await.unwrap().unwrap();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.data, json!({ "code": 0 }));
        assert_eq!(
            response.header.get("content-type"),
            Some(&"application/json".to_string())
        );
    }

    #[tokio::test]
    async fn test_abort_fails_with_abort_message() {
        let url = serve_silently().await;
        let host = ReqwestRequestHost::default();
        let (complete, rx) = channel_completion();

        let task = host.request(HostRequest::new(HttpMethod::Post, url), complete);
        task.abort();

        let failure = rx.await.unwrap().unwrap_err();
        assert_eq!(failure, HostFailure::aborted("request"));
    }

    #[tokio::test]
    async fn test_download_writes_temp_file() {
        let url = serve_once("200 OK", "image/png", b"\x89PNG").await;
        let dir = std::env::temp_dir().join(format!("host-adapter-test-{}", Uuid::new_v4()));
        let host = ReqwestRequestHost::default().with_download_dir(&dir);
        let (complete, rx) = channel_completion();

        host.download_file(
            HostDownload {
                url: format!("{url}/avatar.png"),
                header: Headers::new(),
            },
            complete,
        );

        let response = rx.await.unwrap().unwrap();
        assert_eq!(response.status_code, 200);
        let path = response.temp_file_path.unwrap();
        assert!(path.ends_with(".png"));
        assert_eq!(std::fs::read(&path).unwrap(), b"\x89PNG");
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_download_non_200_has_no_file() {
        let url = serve_once("404 Not Found", "text/plain", b"missing").await;
        let host = ReqwestRequestHost::default();
        let (complete, rx) = channel_completion();

        host.download_file(
            HostDownload {
                url,
                header: Headers::new(),
            },
            complete,
        );

        let response = rx.await.unwrap().unwrap();
        assert_eq!(response.status_code, 404);
        assert_eq!(response.temp_file_path, None);
    }

    #[tokio::test]
    async fn test_upload_missing_file_fails() {
        let host = ReqwestRequestHost::default();
        let (complete, rx) = channel_completion();

        host.upload_file(
            HostUpload {
                url: "http://127.0.0.1:9/upload".to_string(),
                file_path: "/definitely/not/here.png".to_string(),
                name: "file".to_string(),
                header: Headers::new(),
                form_data: serde_json::Map::new(),
            },
            complete,
        );

        let failure = rx.await.unwrap().unwrap_err();
        assert!(failure.err_msg.starts_with("uploadFile:fail"));
    }
}
