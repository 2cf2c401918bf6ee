//! Tower middleware for the transport.
//!
//! Layers wrap [`crate::HyperClient`]'s raw service and see every hop on
//! the wire, below the interceptor chain of [`crate::ApiClient`].
//!
//! - [`LoggingLayer`] - one `tracing` span per exchange
//! - [`FollowRedirectLayer`] - browser-style redirect following
//!
//! ```ignore
//! use fetchkit::HyperClient;
//! use fetchkit::middleware::FollowRedirectLayer;
//!
//! let transport = HyperClient::builder()
//!     .layer(FollowRedirectLayer::with_max_redirects(5))
//!     .with_debug_logging()
//!     .build();
//! ```

mod follow_redirect;
mod logging;

pub use follow_redirect::{DEFAULT_MAX_REDIRECTS, FollowRedirect, FollowRedirectLayer};
pub use logging::{LogLevel, Logging, LoggingLayer};

pub use tower::{Layer, ServiceBuilder};
