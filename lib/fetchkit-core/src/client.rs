//! Transport trait.
//!
//! [`HttpClient`] is the seam between the wrapper and the network. The
//! hyper-based transport implements it, and so do in-memory fakes in tests.

use std::future::Future;
use std::sync::Arc;

use crate::{Request, Response, Result};

/// Executes a fully prepared request.
///
/// A transport reports every HTTP status as `Ok`; only failures below HTTP
/// (connection, TLS, timeout) are errors. Status handling belongs to the
/// wrapper.
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request and return the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be completed:
    /// - Network errors
    /// - TLS errors
    /// - Timeouts, when the transport has one
    fn execute(&self, request: Request) -> impl Future<Output = Result<Response>> + Send;
}

impl<C: HttpClient> HttpClient for Arc<C> {
    fn execute(&self, request: Request) -> impl Future<Output = Result<Response>> + Send {
        C::execute(self, request)
    }
}
