//! Body serialization and content negotiation.

use bytes::Bytes;
use serde_json::Value;

use crate::{Form, Result};

/// Content types the wrapper recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// `application/json`.
    Json,
    /// `text/plain`.
    PlainText,
    /// `application/octet-stream`.
    OctetStream,
}

impl ContentType {
    /// Get the MIME type string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::PlainText => "text/plain",
            Self::OctetStream => "application/octet-stream",
        }
    }

    /// Returns `true` if a `Content-Type` header value declares JSON.
    ///
    /// Parameters such as `charset` are allowed.
    #[must_use]
    pub fn is_json(header: &str) -> bool {
        header.contains(Self::Json.as_str())
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Serialize a value to JSON bytes.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(Into::into)
}

/// Deserialize JSON bytes with path-aware error messages.
///
/// # Errors
///
/// Returns [`crate::Error::JsonDeserialization`], whose message names the
/// failing field (e.g. `records[0].size`).
///
/// # Example
///
/// ```
/// use fetchkit_core::from_json;
/// use serde::Deserialize;
///
/// #[derive(Debug, PartialEq, Deserialize)]
/// struct Dataset { name: String }
///
/// let dataset: Dataset = from_json(br#"{"name":"corpus"}"#).unwrap();
/// assert_eq!(dataset, Dataset { name: "corpus".to_string() });
/// ```
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        crate::Error::json_deserialization(e.path().to_string(), e.inner().to_string())
    })
}

// ============================================================================
// Request payloads
// ============================================================================

/// Body of a POST, PUT or body-mode DELETE.
#[derive(Debug, Clone, Default)]
pub enum Payload {
    /// No body at all.
    #[default]
    Empty,
    /// Serialized JSON, sent with `Content-Type: application/json`.
    Json(Bytes),
    /// Multipart form. The JSON content type is not sent; the form's own
    /// `multipart/form-data; boundary=...` header is used instead.
    Multipart(Form),
}

impl Payload {
    /// Serialize `value` as a JSON payload.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn json<T: serde::Serialize>(value: &T) -> Result<Self> {
        to_json(value).map(Self::Json)
    }

    /// Returns `true` for [`Payload::Multipart`].
    #[must_use]
    pub const fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart(_))
    }
}

impl From<Form> for Payload {
    fn from(form: Form) -> Self {
        Self::Multipart(form)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Empty,
            value => Self::Json(Bytes::from(value.to_string())),
        }
    }
}

// ============================================================================
// Negotiated response content
// ============================================================================

/// Successful response body, decoded according to its `Content-Type`.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// The response declared JSON and was parsed.
    Json(Value),
    /// Anything else, as text.
    Text(String),
}

impl Content {
    /// Decodes `body` according to `content_type`.
    ///
    /// # Errors
    ///
    /// Returns an error if the body declares JSON but does not parse.
    pub fn negotiate(content_type: Option<&str>, body: &[u8]) -> Result<Self> {
        match content_type {
            Some(content_type) if ContentType::is_json(content_type) => {
                from_json(body).map(Self::Json)
            }
            _ => Ok(Self::Text(String::from_utf8_lossy(body).into_owned())),
        }
    }

    /// The JSON value, if this is JSON content.
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// The text, if this is text content.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Json(_) => None,
        }
    }

    /// Deserialize the content into `T`.
    ///
    /// Text content is parsed as JSON, so endpoints that omit the JSON
    /// content type still decode.
    ///
    /// # Errors
    ///
    /// Returns an error if the content does not match `T`.
    pub fn deserialize<T: serde::de::DeserializeOwned>(self) -> Result<T> {
        match self {
            Self::Json(value) => serde_path_to_error::deserialize(value).map_err(|e| {
                crate::Error::json_deserialization(e.path().to_string(), e.inner().to_string())
            }),
            Self::Text(text) => from_json(text.as_bytes()),
        }
    }
}
