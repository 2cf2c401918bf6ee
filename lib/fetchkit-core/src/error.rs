//! Error types for fetchkit.
//!
//! Every failure reaches the caller unchanged; nothing is retried or
//! recovered inside the wrapper. Callers branch on [`Error::status`] and
//! [`Error::data`] regardless of the backend's error payload shape.

use derive_more::{Display, Error, From};
use serde_json::Value;

/// Main error type for fetchkit operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// Non-2xx response.
    #[display("HTTP error {status}: {status_text}")]
    #[from(skip)]
    Http {
        /// HTTP status code.
        status: u16,
        /// Reason phrase.
        status_text: String,
        /// Parsed JSON error body, when the body was valid JSON.
        #[error(not(source))]
        data: Option<Value>,
    },

    /// Network/connection errors.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// Transport timeout, only raised when one is configured.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// Invalid request configuration.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// An interceptor refused the request or response.
    #[display("interceptor error: {_0}")]
    #[from(skip)]
    Interceptor(#[error(not(source))] String),

    /// JSON serialization error.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// JSON deserialization error with path context.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// JSON path to the error (e.g., "content[0].name").
        path: String,
        /// Error message.
        message: String,
    },

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),

    /// Too many redirects.
    #[display("too many redirects ({count} exceeded max of {max})")]
    #[from(skip)]
    TooManyRedirects {
        /// Number of redirects followed.
        count: usize,
        /// Maximum allowed redirects.
        max: usize,
    },

    /// Saving a download failed.
    #[display("I/O error: {_0}")]
    #[from]
    Io(std::io::Error),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an HTTP error without a body.
    #[must_use]
    pub fn http(status: u16, status_text: impl Into<String>) -> Self {
        Self::Http {
            status,
            status_text: status_text.into(),
            data: None,
        }
    }

    /// Create an HTTP error, parsing `body` as JSON on a best-effort basis.
    ///
    /// A body that is empty or not valid JSON yields an error without data.
    #[must_use]
    pub fn http_with_body(status: u16, status_text: impl Into<String>, body: &[u8]) -> Self {
        Self::Http {
            status,
            status_text: status_text.into(),
            data: serde_json::from_slice(body).ok(),
        }
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create an interceptor error.
    #[must_use]
    pub fn interceptor(message: impl Into<String>) -> Self {
        Self::Interceptor(message.into())
    }

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` for failures below HTTP: connection, TLS, timeout.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Tls(_) | Self::Timeout)
    }

    /// Returns the HTTP status code if this is an HTTP error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the reason phrase if this is an HTTP error.
    #[must_use]
    pub fn status_text(&self) -> Option<&str> {
        match self {
            Self::Http { status_text, .. } => Some(status_text),
            _ => None,
        }
    }

    /// Returns the parsed error body if this is an HTTP error with one.
    #[must_use]
    pub const fn data(&self) -> Option<&Value> {
        match self {
            Self::Http { data, .. } => data.as_ref(),
            _ => None,
        }
    }

    /// Returns `true` if this is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    /// Returns `true` if this is a server error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| (500..600).contains(&s))
    }

    /// Returns `true` for 401, the signal an expired token produces.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Decodes the error body into a typed error.
    ///
    /// Returns `None` if there is no body.
    ///
    /// ```
    /// use fetchkit_core::Error;
    ///
    /// #[derive(serde::Deserialize)]
    /// struct ApiError { code: String }
    ///
    /// let err = Error::http_with_body(409, "Conflict", br#"{"code":"DATASET_EXISTS"}"#);
    /// let api_error: ApiError = err.decode_data().unwrap().unwrap();
    /// assert_eq!(api_error.code, "DATASET_EXISTS");
    /// ```
    pub fn decode_data<T: serde::de::DeserializeOwned>(&self) -> Option<Result<T>> {
        self.data().map(|data| {
            serde_path_to_error::deserialize(data).map_err(|e| {
                Self::json_deserialization(e.path().to_string(), e.inner().to_string())
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use serde_json::json;

    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            Error::http(404, "Not Found").to_string(),
            "HTTP error 404: Not Found"
        );
        assert_eq!(Error::Timeout.to_string(), "request timeout");
        assert_eq!(
            Error::connection("dns failure").to_string(),
            "connection error: dns failure"
        );
        assert_eq!(
            Error::interceptor("no session").to_string(),
            "interceptor error: no session"
        );
    }

    #[test]
    fn http_with_json_body_keeps_data() {
        let err = Error::http_with_body(400, "Bad Request", br#"{"message":"name required"}"#);

        check!(err.status() == Some(400));
        check!(err.status_text() == Some("Bad Request"));
        check!(err.data() == Some(&json!({"message": "name required"})));
        check!(err.is_client_error());
        check!(!err.is_server_error());
    }

    #[test]
    fn http_with_invalid_body_has_no_data() {
        let err = Error::http_with_body(502, "Bad Gateway", b"<html>upstream down</html>");
        check!(err.status() == Some(502));
        check!(err.data().is_none());
        check!(err.is_server_error());

        let err = Error::http_with_body(500, "Internal Server Error", b"");
        check!(err.data().is_none());
    }

    #[test]
    fn transport_classification() {
        assert!(Error::connection("refused").is_transport());
        assert!(Error::tls("bad cert").is_transport());
        assert!(Error::Timeout.is_transport());
        assert!(!Error::http(500, "x").is_transport());
        assert!(Error::Timeout.is_timeout());
    }

    #[test]
    fn unauthorized() {
        assert!(Error::http(401, "Unauthorized").is_unauthorized());
        assert!(!Error::http(403, "Forbidden").is_unauthorized());
        assert!(!Error::Timeout.is_unauthorized());
    }

    #[test]
    fn decode_data_typed() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct ApiError {
            code: u32,
        }

        let err = Error::http_with_body(422, "Unprocessable Entity", br#"{"code":7}"#);
        let_assert!(Some(Ok(decoded)) = err.decode_data::<ApiError>());
        check!(decoded == ApiError { code: 7 });

        let err = Error::http_with_body(422, "Unprocessable Entity", br#"{"code":"x"}"#);
        let_assert!(Some(Err(Error::JsonDeserialization { path, .. })) = err.decode_data::<ApiError>());
        check!(path == "code");

        assert!(Error::http(404, "Not Found").decode_data::<ApiError>().is_none());
        assert!(Error::Timeout.decode_data::<ApiError>().is_none());
    }
}
