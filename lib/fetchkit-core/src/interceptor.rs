//! Request and response interceptors.
//!
//! Interceptors run in registration order. Each one sees the output of the
//! previous one and may replace it (`Some`) or leave it alone (`None`). An
//! interceptor may suspend; the next one only starts once it has finished.
//! An error aborts the call.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::{Request, Response, Result};

/// Future returned by interceptors.
pub type InterceptFuture<'a, T> = Pin<Box<dyn Future<Output = Result<Option<T>>> + Send + 'a>>;

/// Hook run on every request before dispatch.
pub trait RequestInterceptor: Send + Sync {
    /// Returns a replacement request, or `None` to keep `request`.
    fn intercept<'a>(&'a self, request: &'a Request) -> InterceptFuture<'a, Request>;
}

/// Hook run on every response before status handling.
pub trait ResponseInterceptor: Send + Sync {
    /// Returns a replacement response, or `None` to keep `response`.
    /// `request` is the descriptor that was dispatched.
    fn intercept<'a>(
        &'a self,
        response: &'a Response,
        request: &'a Request,
    ) -> InterceptFuture<'a, Response>;
}

// ============================================================================
// Closure adapters
// ============================================================================

/// Request interceptor backed by a closure; see [`request_fn`].
#[derive(Clone)]
pub struct RequestFn<F>(F);

/// Response interceptor backed by a closure; see [`response_fn`].
#[derive(Clone)]
pub struct ResponseFn<F>(F);

/// Wraps an async closure as a [`RequestInterceptor`].
///
/// The closure receives its own copy of the request.
///
/// ```
/// use fetchkit_core::{Request, request_fn};
///
/// let trace = request_fn(|request: Request| async move {
///     Ok(Some(request.with_header("X-Request-Source", "console")))
/// });
/// # let _ = trace;
/// ```
pub fn request_fn<F, Fut>(f: F) -> RequestFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Request>>> + Send + 'static,
{
    RequestFn(f)
}

/// Wraps an async closure as a [`ResponseInterceptor`].
///
/// The closure receives its own copies of the response and the request.
pub fn response_fn<F, Fut>(f: F) -> ResponseFn<F>
where
    F: Fn(Response, Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Response>>> + Send + 'static,
{
    ResponseFn(f)
}

impl<F, Fut> RequestInterceptor for RequestFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Request>>> + Send + 'static,
{
    fn intercept<'a>(&'a self, request: &'a Request) -> InterceptFuture<'a, Request> {
        Box::pin((self.0)(request.clone()))
    }
}

impl<F, Fut> ResponseInterceptor for ResponseFn<F>
where
    F: Fn(Response, Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Response>>> + Send + 'static,
{
    fn intercept<'a>(
        &'a self,
        response: &'a Response,
        request: &'a Request,
    ) -> InterceptFuture<'a, Response> {
        Box::pin((self.0)(response.clone(), request.clone()))
    }
}

impl<F> std::fmt::Debug for RequestFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RequestFn")
    }
}

impl<F> std::fmt::Debug for ResponseFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ResponseFn")
    }
}

// ============================================================================
// Chain
// ============================================================================

/// The two ordered interceptor lists of a client.
#[derive(Clone, Default)]
pub struct InterceptorChain {
    request: Vec<Arc<dyn RequestInterceptor>>,
    response: Vec<Arc<dyn ResponseInterceptor>>,
}

impl std::fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("request", &self.request.len())
            .field("response", &self.response.len())
            .finish()
    }
}

impl InterceptorChain {
    /// An empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a request interceptor.
    pub fn add_request(&mut self, interceptor: impl RequestInterceptor + 'static) {
        self.request.push(Arc::new(interceptor));
    }

    /// Appends a response interceptor.
    pub fn add_response(&mut self, interceptor: impl ResponseInterceptor + 'static) {
        self.response.push(Arc::new(interceptor));
    }

    /// Number of request interceptors.
    #[must_use]
    pub fn request_len(&self) -> usize {
        self.request.len()
    }

    /// Number of response interceptors.
    #[must_use]
    pub fn response_len(&self) -> usize {
        self.response.len()
    }

    /// Runs every request interceptor in order.
    ///
    /// # Errors
    ///
    /// Returns the first interceptor error.
    pub async fn apply_request(&self, mut request: Request) -> Result<Request> {
        for interceptor in &self.request {
            if let Some(replaced) = interceptor.intercept(&request).await? {
                request = replaced;
            }
        }
        Ok(request)
    }

    /// Runs every response interceptor in order.
    ///
    /// # Errors
    ///
    /// Returns the first interceptor error.
    pub async fn apply_response(&self, mut response: Response, request: &Request) -> Result<Response> {
        for interceptor in &self.response {
            if let Some(replaced) = interceptor.intercept(&response, request).await? {
                response = replaced;
            }
        }
        Ok(response)
    }
}
