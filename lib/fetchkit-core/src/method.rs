//! HTTP method types.

use derive_more::Display;

/// HTTP verbs issued by the wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Method {
    /// GET, also used by downloads.
    #[display("GET")]
    Get,
    /// POST.
    #[display("POST")]
    Post,
    /// PUT.
    #[display("PUT")]
    Put,
    /// DELETE, either by query parameters or by JSON body.
    #[display("DELETE")]
    Delete,
}

impl Method {
    /// Returns `true` if a body may be forwarded when following a
    /// method-preserving redirect.
    #[must_use]
    pub const fn carries_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Delete)
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Delete => Self::DELETE,
        }
    }
}
