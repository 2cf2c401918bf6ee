//! Redirect following.
//!
//! Follows 3xx responses carrying a `Location` header with the method
//! rewriting browsers apply, so the wrapper above sees the final response
//! just as it would from `fetch`. A 3xx without `Location` is the final
//! response.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tower::{Layer, Service};
use tracing::debug;
use url::Url;

use crate::{Error, Method, Request, Response, Result};

/// Hop limit shared with browsers.
pub const DEFAULT_MAX_REDIRECTS: usize = 20;

/// Layer that follows HTTP redirects.
///
/// ```ignore
/// use fetchkit::middleware::{FollowRedirectLayer, ServiceBuilder};
///
/// let service = ServiceBuilder::new()
///     .layer(FollowRedirectLayer::new())
///     .service(transport);
/// ```
#[derive(Debug, Clone)]
pub struct FollowRedirectLayer {
    max_redirects: usize,
}

impl Default for FollowRedirectLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl FollowRedirectLayer {
    /// Follow up to [`DEFAULT_MAX_REDIRECTS`] hops.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }

    /// Follow up to `max_redirects` hops.
    #[must_use]
    pub const fn with_max_redirects(max_redirects: usize) -> Self {
        Self { max_redirects }
    }
}

impl<S> Layer<S> for FollowRedirectLayer {
    type Service = FollowRedirect<S>;

    fn layer(&self, inner: S) -> Self::Service {
        FollowRedirect {
            inner,
            max_redirects: self.max_redirects,
        }
    }
}

/// Service that follows HTTP redirects.
#[derive(Debug, Clone)]
pub struct FollowRedirect<S> {
    inner: S,
    max_redirects: usize,
}

impl<S> FollowRedirect<S> {
    /// Wraps `inner` with the default hop limit.
    #[must_use]
    pub const fn new(inner: S) -> Self {
        Self {
            inner,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

const fn is_redirect(status: u16) -> bool {
    matches!(status, 301 | 302 | 303 | 307 | 308)
}

/// Method of the follow-up request.
///
/// 303 turns anything but GET into GET, 301/302 only rewrite POST, and
/// 307/308 keep the method.
const fn redirect_method(status: u16, original: Method) -> Method {
    let to_get = match status {
        303 => !matches!(original, Method::Get),
        301 | 302 => matches!(original, Method::Post),
        _ => false,
    };
    if to_get { Method::Get } else { original }
}

fn resolve_redirect_url(base_url: &Url, location: &str) -> Result<Url> {
    base_url.join(location).map_err(Error::InvalidUrl)
}

fn same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}

fn next_request(current: Request, status: u16, location: &str) -> Result<Request> {
    let next_url = resolve_redirect_url(current.url(), location)?;
    let original_method = current.method();
    let next_method = redirect_method(status, original_method);
    let show_loading = current.shows_loading();
    let cross_origin = !same_origin(current.url(), &next_url);

    let (_, _, mut headers, body) = current.into_parts();

    let rewritten = next_method != original_method;
    if rewritten {
        headers.remove("content-type");
        headers.remove("content-length");
    }
    if cross_origin {
        headers.remove("authorization");
    }

    let mut builder = Request::builder(next_method, next_url)
        .headers(&headers)
        .show_loading(show_loading);
    if let Some(body) = body.filter(|_| !rewritten && next_method.carries_body()) {
        builder = builder.body(body);
    }

    Ok(builder.build())
}

fn location(response: &Response) -> Option<&str> {
    if is_redirect(response.status()) {
        response.header("location")
    } else {
        None
    }
}

impl<S> Service<Request> for FollowRedirect<S>
where
    S: Service<Request, Response = Response, Error = Error> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let mut inner = self.inner.clone();
        let max_redirects = self.max_redirects;

        Box::pin(async move {
            let mut current = request;
            let mut redirects = 0;

            loop {
                let response = inner.call(current.clone()).await?;

                let Some(location) = location(&response) else {
                    return Ok(response);
                };

                if redirects >= max_redirects {
                    return Err(Error::TooManyRedirects {
                        count: redirects,
                        max: max_redirects,
                    });
                }

                debug!(status = response.status(), location, "following redirect");
                current = next_request(current, response.status(), location)?;

                redirects += 1;
            }
        })
    }
}
