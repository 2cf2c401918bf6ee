//! Interceptors installed by [`crate::ApiClientBuilder::with_default_interceptors`].

use fetchkit_core::{InterceptFuture, RequestInterceptor, ResponseInterceptor};

use crate::{Request, Response, TokenStore};

/// Attaches `Authorization: Bearer <token>` when a token is stored.
#[derive(Debug, Clone)]
pub struct BearerTokenInterceptor {
    tokens: TokenStore,
}

impl BearerTokenInterceptor {
    /// Reads tokens from `tokens` on every request.
    #[must_use]
    pub const fn new(tokens: TokenStore) -> Self {
        Self { tokens }
    }
}

impl RequestInterceptor for BearerTokenInterceptor {
    fn intercept<'a>(&'a self, request: &'a Request) -> InterceptFuture<'a, Request> {
        Box::pin(async move {
            Ok(self
                .tokens
                .token()
                .map(|token| request.clone().with_header("Authorization", format!("Bearer {token}"))))
        })
    }
}

/// Response hook that leaves every response alone.
///
/// Registered so global error handling has a fixed place in the chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl ResponseInterceptor for PassThrough {
    fn intercept<'a>(
        &'a self,
        _response: &'a Response,
        _request: &'a Request,
    ) -> InterceptFuture<'a, Response> {
        Box::pin(async { Ok(None) })
    }
}
