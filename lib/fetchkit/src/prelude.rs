//! Prelude module for convenient imports.
//!
//! ```ignore
//! use fetchkit::prelude::*;
//! ```

pub use crate::{
    ApiClient, Content, DeleteParams, Download, Error, Form, HttpClient, HyperClient,
    LoadingIndicator, LoadingTracker, Method, Part, Payload, Query, Request, RequestInterceptor,
    RequestOptions, Response, ResponseInterceptor, Result, TokenStore, request_fn, response_fn,
};
pub use serde::{Deserialize, Serialize};
