//! Request client over the host request primitives.

use std::sync::Arc;

use bridge_traits::request::{
    Completion, HostDownload, HostRequest, HostResponse, HostTask, HostUpload, HttpMethod,
    RequestHost,
};
use core_runtime::config::{RequestConfig, RequestMethod};
use core_runtime::logging::describe_headers;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error::{RequestError, Result};
use crate::pending::{PendingOperation, TimeoutPolicy};
use crate::types::{
    DownloadOptions, DownloadResult, PostOptions, UploadOptions, UploadOutcome, UploadResult,
};
use crate::url::secure_url;

/// Form field the uploaded file travels under
pub const UPLOAD_FIELD: &str = "file";

/// Future-returning facade over a [`RequestHost`].
///
/// Each call is independent; the only shared state is the immutable
/// [`RequestConfig`]. Callers cannot cancel an operation, the timeout is the
/// only cancellation path.
#[derive(Clone)]
pub struct RequestClient {
    host: Arc<dyn RequestHost>,
    config: RequestConfig,
}

impl std::fmt::Debug for RequestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RequestClient {
    pub fn new(host: Arc<dyn RequestHost>, config: RequestConfig) -> Self {
        Self { host, config }
    }

    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    /// POST `options.data` and resolve with the raw host response.
    ///
    /// # Errors
    ///
    /// [`RequestError::Host`] with the host's failure payload, including the
    /// abort failure that follows a timeout.
    #[instrument(skip_all, fields(url = %options.url))]
    pub async fn post(&self, options: PostOptions) -> Result<HostResponse> {
        let PostOptions { url, data, headers } = options;
        let url = secure_url(&url);
        debug!(url = %url, headers = %describe_headers(&headers), "dispatching post");

        let mut request = HostRequest::new(HttpMethod::Post, url).headers(headers);
        request.data = data;

        let host = Arc::clone(&self.host);
        let response = self
            .dispatch(RequestMethod::Post, "request", move |complete| {
                host.request(request, complete)
            })
            .await?;

        debug!(status_code = response.status_code, "post completed");
        Ok(response)
    }

    /// Upload `options.file` as multipart form data.
    ///
    /// Never fails: a host failure is returned as [`UploadOutcome::Failed`].
    #[instrument(skip_all, fields(url = %options.url))]
    pub async fn upload(&self, options: UploadOptions) -> UploadOutcome {
        let requested_status = options.success_action_status();
        let UploadOptions {
            url,
            file,
            data,
            headers,
        } = options;
        let url = secure_url(&url);
        debug!(url = %url, headers = %describe_headers(&headers), "dispatching upload");

        let mut form_data = data;
        form_data.insert(UPLOAD_FIELD.to_string(), Value::String(file.clone()));
        let upload = HostUpload {
            url,
            file_path: file,
            name: UPLOAD_FIELD.to_string(),
            header: headers,
            form_data,
        };

        let host = Arc::clone(&self.host);
        let outcome = self
            .dispatch(RequestMethod::Upload, "uploadFile", move |complete| {
                host.upload_file(upload, complete)
            })
            .await;

        match outcome {
            Ok(response) => {
                let result =
                    UploadResult::from_host(response.status_code, response.data, requested_status);
                debug!(status_code = result.status_code, "upload completed");
                UploadOutcome::Completed(result)
            }
            Err(error) => {
                warn!(error = %error, "upload failed");
                UploadOutcome::Failed(error)
            }
        }
    }

    /// Download `options.url` to a host-managed temporary file.
    ///
    /// # Errors
    ///
    /// [`RequestError::Host`] with the host's failure payload.
    #[instrument(skip_all, fields(url = %options.url))]
    pub async fn download(&self, options: DownloadOptions) -> Result<DownloadResult> {
        let DownloadOptions { url, headers } = options;
        let download = HostDownload {
            url: secure_url(&url),
            header: headers,
        };
        debug!(url = %download.url, headers = %describe_headers(&download.header), "dispatching download");

        let host = Arc::clone(&self.host);
        let response = self
            .dispatch(RequestMethod::Download, "downloadFile", move |complete| {
                host.download_file(download, complete)
            })
            .await?;

        let result = DownloadResult::from_host(response);
        debug!(status_code = result.status_code(), "download completed");
        Ok(result)
    }

    async fn dispatch<T, F>(
        &self,
        method: RequestMethod,
        operation: &'static str,
        start: F,
    ) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(Completion<T>) -> Arc<dyn HostTask>,
    {
        let (pending, settler) = PendingOperation::new(operation);
        let complete: Completion<T> =
            Box::new(move |outcome| settler.settle(outcome.map_err(RequestError::Host)));

        let task = start(complete);
        pending.arm(task, self.timeout_policy(method));
        pending.wait().await
    }

    fn timeout_policy(&self, method: RequestMethod) -> Option<TimeoutPolicy> {
        self.config
            .timeout_for(method)
            .map(|delay| TimeoutPolicy {
                delay,
                message: self.config.timeout_message.clone(),
                settle_on_timeout: self.config.settle_on_timeout,
            })
    }
}
