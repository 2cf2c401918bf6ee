//! HTTP responses.
//!
//! [`Response`] is what the transport returns and what response interceptors
//! see. [`Response::into_content`] applies the wrapper's status and
//! content-type rules.

use bytes::Bytes;

use crate::{Content, Error, Headers, Result};

/// HTTP response with status, reason phrase, headers, and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    status_text: String,
    headers: Headers,
    body: Bytes,
}

impl Response {
    /// Creates a response; the reason phrase is the canonical one for
    /// `status`, or empty for unknown codes.
    #[must_use]
    pub fn new(status: u16, headers: Headers, body: impl Into<Bytes>) -> Self {
        let status_text = http::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or_default()
            .to_string();
        Self {
            status,
            status_text,
            headers,
            body: body.into(),
        }
    }

    /// Replaces the reason phrase.
    #[must_use]
    pub fn with_status_text(mut self, status_text: impl Into<String>) -> Self {
        self.status_text = status_text.into();
        self
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Reason phrase.
    #[must_use]
    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// Response headers.
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

    /// The `Content-Type` header.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Response body.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Consume into body.
    #[must_use]
    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Status is 3xx.
    #[must_use]
    pub const fn is_redirection(&self) -> bool {
        self.status >= 300 && self.status < 400
    }

    /// Converts a non-2xx response into [`Error::Http`], keeping the JSON
    /// body when it parses. Successful responses pass through.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] for any non-2xx status.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::http_with_body(
                self.status,
                self.status_text,
                &self.body,
            ))
        }
    }

    /// Checks the status, then decodes the body by content type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] for non-2xx statuses and
    /// [`Error::JsonDeserialization`] for malformed JSON bodies.
    pub fn into_content(self) -> Result<Content> {
        let response = self.error_for_status()?;
        Content::negotiate(response.content_type(), &response.body)
    }

    /// Deserialize the body as JSON, ignoring the content type.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        crate::from_json(&self.body)
    }

    /// The body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use serde_json::json;

    use super::*;

    fn with_content_type(status: u16, content_type: &str, body: &'static str) -> Response {
        let headers: Headers = [("content-type", content_type)].into_iter().collect();
        Response::new(status, headers, body)
    }

    #[test]
    fn canonical_status_text() {
        assert_eq!(Response::new(404, Headers::new(), "").status_text(), "Not Found");
        assert_eq!(Response::new(599, Headers::new(), "").status_text(), "");
        assert_eq!(
            Response::new(200, Headers::new(), "")
                .with_status_text("Fine")
                .status_text(),
            "Fine"
        );
    }

    #[test]
    fn status_checks() {
        assert!(Response::new(204, Headers::new(), "").is_success());
        assert!(Response::new(302, Headers::new(), "").is_redirection());
        assert!(!Response::new(404, Headers::new(), "").is_success());
    }

    #[test]
    fn json_content() {
        let response = with_content_type(200, "application/json", r#"{"id":"ds-1"}"#);
        let_assert!(Ok(Content::Json(value)) = response.into_content());
        check!(value == json!({"id": "ds-1"}));
    }

    #[test]
    fn text_content() {
        let response = with_content_type(200, "text/plain", "pong");
        let_assert!(Ok(Content::Text(text)) = response.into_content());
        check!(text == "pong");
    }

    #[test]
    fn error_status_with_json_body() {
        let response = with_content_type(400, "application/json", r#"{"message":"bad"}"#);
        let_assert!(Err(err) = response.into_content());
        check!(err.status() == Some(400));
        check!(err.status_text() == Some("Bad Request"));
        check!(err.data() == Some(&json!({"message": "bad"})));
    }

    #[test]
    fn error_status_with_html_body() {
        let response = with_content_type(503, "text/html", "<h1>down</h1>");
        let_assert!(Err(Error::Http { status, data, .. }) = response.into_content());
        check!(status == 503);
        check!(data.is_none());
    }

    #[test]
    fn text_is_lossy() {
        let response = Response::new(200, Headers::new(), vec![b'o', b'k', 0xff]);
        assert_eq!(response.text(), "ok\u{fffd}");
    }
}
