//! Request descriptors.
//!
//! A [`Request`] is built once per call, passed through the request
//! interceptor chain and handed to the transport.
//!
//! # Example
//!
//! ```
//! use fetchkit_core::{Method, Request};
//!
//! let request = Request::builder(Method::Get, "https://api.example.com/data-management/datasets".parse().unwrap())
//!     .header("Accept", "application/json")
//!     .query("page", "1")
//!     .show_loading(true)
//!     .build();
//!
//! assert_eq!(request.url().query(), Some("page=1"));
//! ```

use bytes::Bytes;
use url::Url;

use crate::{Headers, Method, Query};

/// An HTTP request: method, URL, headers, optional body and the loading flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    url: Url,
    headers: Headers,
    body: Option<Bytes>,
    show_loading: bool,
}

impl Request {
    /// Creates a new [`RequestBuilder`].
    #[must_use]
    pub fn builder(method: Method, url: Url) -> RequestBuilder {
        RequestBuilder::new(method, url)
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Request URL, query string included.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Request headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Mutable access to headers.
    #[must_use]
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Single header value by name, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Whether this call drives the loading indicator.
    #[must_use]
    pub const fn shows_loading(&self) -> bool {
        self.show_loading
    }

    /// Returns a copy with `name` set to `value`.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Turns the request back into a builder.
    #[must_use]
    pub fn into_builder(self) -> RequestBuilder {
        RequestBuilder {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
            show_loading: self.show_loading,
        }
    }

    /// Consume into (method, url, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (Method, Url, Headers, Option<Bytes>) {
        (self.method, self.url, self.headers, self.body)
    }
}

/// Builder for [`Request`].
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    url: Url,
    headers: Headers,
    body: Option<Bytes>,
    show_loading: bool,
}

impl RequestBuilder {
    /// Creates a new builder.
    #[must_use]
    pub const fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Headers::new(),
            body: None,
            show_loading: false,
        }
    }

    /// Sets a header, replacing any entry with the same name.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Merges `headers` over the current ones.
    #[must_use]
    pub fn headers(mut self, headers: &Headers) -> Self {
        self.headers.merge(headers);
        self
    }

    /// Removes a header.
    #[must_use]
    pub fn without_header(mut self, name: &str) -> Self {
        self.headers.remove(name);
        self
    }

    /// Appends a query parameter to the URL.
    #[must_use]
    pub fn query(mut self, name: &str, value: &str) -> Self {
        self.url.query_pairs_mut().append_pair(name, value);
        self
    }

    /// Appends every pair of `query` to the URL. An empty query leaves the
    /// URL untouched (no trailing `?`).
    #[must_use]
    pub fn query_pairs(mut self, query: &Query) -> Self {
        if query.is_empty() {
            return self;
        }
        {
            let mut pairs = self.url.query_pairs_mut();
            for (name, value) in query.iter() {
                pairs.append_pair(name, value);
            }
        }
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets whether the call drives the loading indicator.
    #[must_use]
    pub const fn show_loading(mut self, show_loading: bool) -> Self {
        self.show_loading = show_loading;
        self
    }

    /// Builds the [`Request`].
    #[must_use]
    pub fn build(self) -> Request {
        Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
            show_loading: self.show_loading,
        }
    }
}

impl RequestBuilder {
    /// Set a JSON body and the matching content type.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn json<T: serde::Serialize>(self, value: &T) -> crate::Result<Self> {
        let body = crate::to_json(value)?;
        Ok(self
            .header("Content-Type", crate::ContentType::Json.as_str())
            .body(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datasets_url() -> Url {
        Url::parse("https://console.example.com/api/data-management/datasets").expect("valid URL")
    }

    #[test]
    fn request_builder_basic() {
        let request = Request::builder(Method::Get, datasets_url())
            .header("Accept", "*/*")
            .build();

        assert_eq!(request.method(), Method::Get);
        assert_eq!(
            request.url().as_str(),
            "https://console.example.com/api/data-management/datasets"
        );
        assert_eq!(request.header("accept"), Some("*/*"));
        assert!(request.body().is_none());
        assert!(!request.shows_loading());
    }

    #[test]
    fn request_builder_with_query_pairs() {
        let query = Query::new().param("page", 0).param("size", 20);
        let request = Request::builder(Method::Get, datasets_url())
            .query_pairs(&query)
            .build();

        assert_eq!(request.url().query(), Some("page=0&size=20"));
    }

    #[test]
    fn empty_query_leaves_url_untouched() {
        let request = Request::builder(Method::Get, datasets_url())
            .query_pairs(&Query::new())
            .build();

        assert_eq!(request.url().query(), None);
        assert!(!request.url().as_str().ends_with('?'));
    }

    #[test]
    fn request_builder_json() {
        #[derive(serde::Serialize)]
        struct NewDataset {
            name: String,
        }

        let request = Request::builder(Method::Post, datasets_url())
            .json(&NewDataset {
                name: "corpus".to_string(),
            })
            .expect("json")
            .build();

        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert_eq!(
            request.body().map(Bytes::as_ref),
            Some(br#"{"name":"corpus"}"#.as_slice())
        );
    }

    #[test]
    fn into_builder_keeps_everything() {
        let request = Request::builder(Method::Put, datasets_url())
            .header("X-Trace", "abc")
            .body("{}")
            .show_loading(true)
            .build();

        let rebuilt = request.clone().into_builder().build();
        assert_eq!(rebuilt, request);

        let changed = request.with_header("x-trace", "def");
        assert_eq!(changed.header("X-Trace"), Some("def"));
        assert!(changed.shows_loading());
    }
}
