//! # Request Client
//!
//! Turns the host's callback-style `request`, `uploadFile` and `downloadFile`
//! primitives into futures, each optionally guarded by a timeout that aborts
//! the host task when it fires.
//!
//! ## Overview
//!
//! Every operation goes through the same steps:
//!
//! 1. The target URL is rewritten to `https://` ([`url::secure_url`]).
//! 2. The host primitive is dispatched with a completion bound to a
//!    [`PendingOperation`](pending::PendingOperation).
//! 3. If the operation kind is timeout-eligible, a
//!    [`TimerGuard`](pending::TimerGuard) is armed. When it fires it logs the
//!    configured message and aborts the task.
//! 4. The first completion settles the future and clears the timer.
//!
//! ## Usage
//!
//! ```ignore
//! use core_request::{PostOptions, RequestClient};
//! use core_runtime::config::RequestConfig;
//!
//! let client = RequestClient::new(host, RequestConfig::builder().timeout_ms(5_000).build());
//! let response = client.post(PostOptions::new("api.example.com/v1")).await?;
//! ```

pub mod client;
pub mod error;
pub mod pending;
pub mod types;
pub mod url;

pub use client::RequestClient;
pub use error::{RequestError, Result};
pub use types::{
    DownloadOptions, DownloadResult, PostOptions, UploadOptions, UploadOutcome, UploadResult,
};
