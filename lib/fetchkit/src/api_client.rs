//! The console's call surface.
//!
//! [`ApiClient`] wraps any [`HttpClient`] with a base URL, default headers,
//! the interceptor chains and the loading tracker. Every call goes through
//! the same steps:
//!
//! 1. take a [`LoadingGuard`](crate::LoadingGuard) when `show_loading` is set;
//! 2. run the request interceptors;
//! 3. dispatch;
//! 4. run the response interceptors;
//! 5. turn a non-2xx status into [`Error::Http`];
//! 6. decode the body by content type.
//!
//! ```ignore
//! use fetchkit::{ApiClient, Query, RequestOptions, TokenStore};
//!
//! let api = ApiClient::with_defaults("https://console.example.com/api", TokenStore::in_memory())?;
//! let datasets = api
//!     .get("/data-management/datasets", &Query::new().param("page", 1), &RequestOptions::loading())
//!     .await?;
//! ```

use std::sync::Arc;

use fetchkit_core::{RequestInterceptor, ResponseInterceptor};
use tracing::{debug, warn};

use crate::{
    ApiConfig, BearerTokenInterceptor, Content, DeleteParams, DirectorySink, Download,
    DownloadSink, Error, Headers, HttpClient, HyperClient, InterceptorChain, LoadingIndicator,
    LoadingTracker, Method, PassThrough, Payload, Query, Request, Response, Result, TokenStore,
    download::DEFAULT_FILENAME, filename_from_disposition,
};

/// Per-call options.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Drive the loading indicator for this call.
    pub show_loading: bool,
    /// Headers merged over the defaults, replacing same-named ones.
    pub headers: Headers,
}

impl RequestOptions {
    /// No loading indicator, no extra headers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options with the loading indicator on.
    #[must_use]
    pub fn loading() -> Self {
        Self::new().show_loading(true)
    }

    /// Sets the loading flag.
    #[must_use]
    pub const fn show_loading(mut self, show_loading: bool) -> Self {
        self.show_loading = show_loading;
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }
}

/// HTTP client wrapper bound to one backend.
pub struct ApiClient<C> {
    client: C,
    config: ApiConfig,
    interceptors: InterceptorChain,
    loading: LoadingTracker,
    sink: Arc<dyn DownloadSink>,
}

impl<C> std::fmt::Debug for ApiClient<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .field("interceptors", &self.interceptors)
            .field("loading", &self.loading)
            .finish_non_exhaustive()
    }
}

impl<C: Clone> Clone for ApiClient<C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            config: self.config.clone(),
            interceptors: self.interceptors.clone(),
            loading: self.loading.clone(),
            sink: Arc::clone(&self.sink),
        }
    }
}

impl ApiClient<HyperClient> {
    /// The console's standard client: redirect-following transport with
    /// logging, the bearer token interceptor and the pass-through response
    /// hook.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if `base_url` does not parse.
    pub fn with_defaults(base_url: impl Into<String>, tokens: TokenStore) -> Result<Self> {
        let transport = HyperClient::builder().with_defaults().build();
        Self::builder(transport, base_url)
            .with_default_interceptors(tokens)
            .build()
    }
}

impl<C> ApiClient<C> {
    /// A client for `base_url` with no interceptors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if `base_url` does not parse.
    pub fn new(client: C, base_url: impl Into<String>) -> Result<Self> {
        Self::builder(client, base_url).build()
    }

    /// Start building a client.
    pub fn builder(client: C, base_url: impl Into<String>) -> ApiClientBuilder<C> {
        ApiClientBuilder::new(client, base_url)
    }

    /// Appends a request interceptor.
    pub fn add_request_interceptor(&mut self, interceptor: impl RequestInterceptor + 'static) {
        self.interceptors.add_request(interceptor);
    }

    /// Appends a response interceptor.
    pub fn add_response_interceptor(&mut self, interceptor: impl ResponseInterceptor + 'static) {
        self.interceptors.add_response(interceptor);
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// The base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }

    /// The loading tracker shared by every call.
    #[must_use]
    pub const fn loading(&self) -> &LoadingTracker {
        &self.loading
    }

    /// The interceptor chains.
    #[must_use]
    pub const fn interceptors(&self) -> &InterceptorChain {
        &self.interceptors
    }

    /// The transport.
    #[must_use]
    pub const fn inner(&self) -> &C {
        &self.client
    }

    fn build_request(
        &self,
        method: Method,
        path: &str,
        query: &Query,
        payload: Payload,
        options: &RequestOptions,
    ) -> Result<Request> {
        let url = self.config.url_for(path)?;
        let mut builder = Request::builder(method, url)
            .headers(self.config.default_headers())
            .query_pairs(query)
            .show_loading(options.show_loading);

        builder = match payload {
            Payload::Empty => builder,
            Payload::Json(body) => builder.body(body),
            Payload::Multipart(form) => {
                let (content_type, body) = form.into_body();
                builder.header("Content-Type", content_type).body(body)
            }
        };

        Ok(builder.headers(&options.headers).build())
    }
}

impl<C: HttpClient> ApiClient<C> {
    /// GET `path`. Absent query values are left out.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] for non-2xx responses, a transport error if
    /// the call fails, or an interceptor error.
    pub async fn get(&self, path: &str, query: &Query, options: &RequestOptions) -> Result<Content> {
        self.request(Method::Get, path, query, Payload::Empty, options)
            .await
    }

    /// POST `payload` to `path`.
    ///
    /// # Errors
    ///
    /// See [`Self::get`].
    pub async fn post(
        &self,
        path: &str,
        payload: impl Into<Payload>,
        options: &RequestOptions,
    ) -> Result<Content> {
        self.request(Method::Post, path, &Query::new(), payload.into(), options)
            .await
    }

    /// PUT `payload` to `path`.
    ///
    /// # Errors
    ///
    /// See [`Self::get`].
    pub async fn put(
        &self,
        path: &str,
        payload: impl Into<Payload>,
        options: &RequestOptions,
    ) -> Result<Content> {
        self.request(Method::Put, path, &Query::new(), payload.into(), options)
            .await
    }

    /// DELETE `path`, sending `params` in the query string or the body.
    ///
    /// Always sends `X-Requested-With: XMLHttpRequest`.
    ///
    /// # Errors
    ///
    /// See [`Self::get`].
    pub async fn delete(
        &self,
        path: &str,
        params: DeleteParams,
        options: &RequestOptions,
    ) -> Result<Content> {
        let options = options.clone().header("X-Requested-With", "XMLHttpRequest");
        let (query, payload) = match params {
            DeleteParams::None => (Query::new(), Payload::Empty),
            DeleteParams::Query(query) => (query, Payload::Empty),
            DeleteParams::Body(payload) => (Query::new(), payload),
        };
        self.request(Method::Delete, path, &query, payload, &options)
            .await
    }

    /// GET `path` as a file and hand it to the download sink.
    ///
    /// The filename comes from `Content-Disposition`, falling back to
    /// `default_filename` and then to `"download"`. The returned download
    /// carries the name the sink stored it under. With `show_loading` the
    /// call stays counted until the sink is done.
    ///
    /// # Errors
    ///
    /// See [`Self::get`]; also fails when the sink cannot save the file.
    pub async fn download(
        &self,
        path: &str,
        query: &Query,
        default_filename: Option<&str>,
        options: &RequestOptions,
    ) -> Result<Download> {
        let request = self.build_request(Method::Get, path, query, Payload::Empty, options)?;
        let _guard = request.shows_loading().then(|| self.loading.acquire());
        let response = self.exchange(request).await?;

        let filename = response
            .header("content-disposition")
            .and_then(filename_from_disposition)
            .or_else(|| {
                default_filename
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| DEFAULT_FILENAME.to_string());
        let content_type = response.content_type().map(str::to_string);
        let download = Download::new(filename, content_type, response.into_body());

        let stored = self.sink.save(&download).await?;
        let download = download.with_filename(stored);
        debug!(filename = download.filename(), bytes = download.data().len(), "download completed");
        Ok(download)
    }

    /// Issues `method` on `path` and decodes the body by content type.
    ///
    /// # Errors
    ///
    /// See [`Self::get`]; a malformed JSON success body is
    /// [`Error::JsonDeserialization`].
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &Query,
        payload: Payload,
        options: &RequestOptions,
    ) -> Result<Content> {
        let request = self.build_request(method, path, query, payload, options)?;
        let response = self.send(request).await?;
        Content::negotiate(response.content_type(), response.body())
    }

    /// Runs a prepared request through the interceptors and the transport,
    /// returning the raw response once its status is known to be 2xx.
    ///
    /// # Errors
    ///
    /// See [`Self::get`].
    pub async fn send(&self, request: Request) -> Result<Response> {
        let _guard = request.shows_loading().then(|| self.loading.acquire());
        self.exchange(request).await
    }

    async fn exchange(&self, request: Request) -> Result<Response> {
        let request = self.interceptors.apply_request(request).await?;
        debug!(method = %request.method(), url = %request.url(), "dispatching request");

        let response = match self.client.execute(request.clone()).await {
            Ok(response) => response,
            Err(err) => {
                warn!(method = %request.method(), url = %request.url(), error = %err, "request failed");
                return Err(err);
            }
        };

        let response = self.interceptors.apply_response(response, &request).await?;
        response.error_for_status().inspect_err(|err: &Error| {
            warn!(method = %request.method(), url = %request.url(), error = %err, "request returned an error status");
        })
    }
}

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder<C> {
    client: C,
    base_url: String,
    default_headers: Headers,
    hide_delay: Option<std::time::Duration>,
    interceptors: InterceptorChain,
    loading: Option<LoadingTracker>,
    indicator: Option<Box<dyn FnOnce(std::time::Duration) -> LoadingTracker + Send>>,
    sink: Option<Arc<dyn DownloadSink>>,
}

impl<C> std::fmt::Debug for ApiClientBuilder<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClientBuilder")
            .field("base_url", &self.base_url)
            .field("default_headers", &self.default_headers)
            .field("interceptors", &self.interceptors)
            .finish_non_exhaustive()
    }
}

impl<C> ApiClientBuilder<C> {
    fn new(client: C, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            default_headers: Headers::new(),
            hide_delay: None,
            interceptors: InterceptorChain::new(),
            loading: None,
            indicator: None,
            sink: None,
        }
    }

    /// Overrides or adds a default header.
    #[must_use]
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.set(name, value);
        self
    }

    /// Appends a request interceptor.
    #[must_use]
    pub fn request_interceptor(mut self, interceptor: impl RequestInterceptor + 'static) -> Self {
        self.interceptors.add_request(interceptor);
        self
    }

    /// Appends a response interceptor.
    #[must_use]
    pub fn response_interceptor(mut self, interceptor: impl ResponseInterceptor + 'static) -> Self {
        self.interceptors.add_response(interceptor);
        self
    }

    /// Appends the bearer token interceptor and the pass-through response
    /// hook.
    #[must_use]
    pub fn with_default_interceptors(self, tokens: TokenStore) -> Self {
        self.request_interceptor(BearerTokenInterceptor::new(tokens))
            .response_interceptor(PassThrough)
    }

    /// Shares an existing tracker, e.g. between several clients.
    #[must_use]
    pub fn loading(mut self, tracker: LoadingTracker) -> Self {
        self.loading = Some(tracker);
        self
    }

    /// Drives `indicator` from a tracker owned by this client.
    #[must_use]
    pub fn loading_indicator(mut self, indicator: impl LoadingIndicator) -> Self {
        self.indicator = Some(Box::new(move |delay| {
            LoadingTracker::with_hide_delay(indicator, delay)
        }));
        self
    }

    /// Sets the hide debounce of a tracker owned by this client.
    #[must_use]
    pub const fn hide_delay(mut self, delay: std::time::Duration) -> Self {
        self.hide_delay = Some(delay);
        self
    }

    /// Where downloads are saved. Defaults to the working directory.
    #[must_use]
    pub fn download_sink(mut self, sink: impl DownloadSink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the base URL does not parse.
    pub fn build(self) -> Result<ApiClient<C>> {
        let mut config = ApiConfig::new(self.base_url)?;
        for (name, value) in self.default_headers.iter() {
            config = config.default_header(name, value);
        }
        if let Some(delay) = self.hide_delay {
            config = config.hide_delay(delay);
        }

        let delay = config.hide_delay_duration();
        let loading = match (self.loading, self.indicator) {
            (Some(tracker), _) => tracker,
            (None, Some(make)) => make(delay),
            (None, None) => LoadingTracker::with_hide_delay(crate::NoopIndicator, delay),
        };

        Ok(ApiClient {
            client: self.client,
            config,
            interceptors: self.interceptors,
            loading,
            sink: self
                .sink
                .unwrap_or_else(|| Arc::new(DirectorySink::default())),
        })
    }
}
