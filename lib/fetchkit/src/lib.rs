//! HTTP client wrapper for the data-platform console.
//!
//! [`ApiClient`] issues GET/POST/PUT/DELETE/download calls against one base
//! URL, runs ordered request and response interceptors, drives a loading
//! indicator through a shared [`LoadingTracker`] and normalizes errors and
//! response bodies.
//!
//! # Example
//!
//! ```ignore
//! use fetchkit::prelude::*;
//!
//! let tokens = TokenStore::in_memory();
//! tokens.remember("abc123", false)?;
//!
//! let api = ApiClient::with_defaults("https://console.example.com/api", tokens)?;
//!
//! let page = api
//!     .get(
//!         "/data-management/datasets",
//!         &Query::new().param("page", 0).param_opt("keyword", None::<&str>),
//!         &RequestOptions::loading(),
//!     )
//!     .await?;
//!
//! api.delete("/data-management/datasets", DeleteParams::id("ds-1"), &RequestOptions::new())
//!     .await?;
//!
//! let report = api
//!     .download("/cleaning/tasks/7/report", &Query::new(), Some("report.csv"), &RequestOptions::new())
//!     .await?;
//! ```

mod api_client;
mod client;
mod config;
mod connector;
mod download;
mod interceptors;
mod loading;
pub mod middleware;
pub mod prelude;
mod storage;

pub use api_client::{ApiClient, ApiClientBuilder, RequestOptions};
pub use client::{BoxedService, HyperClient, HyperClientBuilder, ServiceFuture};
pub use config::{ApiConfig, ClientConfig, ClientConfigBuilder};
pub use download::{
    DEFAULT_FILENAME, DirectorySink, Download, DownloadSink, MemorySink, SaveFuture,
};
pub use interceptors::{BearerTokenInterceptor, PassThrough};
pub use loading::{DEFAULT_HIDE_DELAY, LoadingGuard, LoadingIndicator, LoadingTracker, NoopIndicator};
pub use storage::{DEFAULT_TOKEN_KEY, FileStorage, MemoryStorage, TokenStorage, TokenStore};

// Re-export tower for middleware composition
pub use tower;

pub use fetchkit_core::{
    Content, ContentType, DeleteParams, Error, Form, Headers, HttpClient, InterceptFuture,
    InterceptorChain, Method, Part, Payload, Query, Request, RequestBuilder, RequestFn,
    RequestInterceptor, Response, ResponseFn, ResponseInterceptor, Result,
    filename_from_disposition, from_json, request_fn, response_fn, to_json,
};

pub use url;
