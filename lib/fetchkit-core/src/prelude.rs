//! Prelude module for convenient imports.
//!
//! ```ignore
//! use fetchkit_core::prelude::*;
//! ```

pub use crate::{
    Content, DeleteParams, Error, Form, Headers, HttpClient, Method, Part, Payload, Query,
    Request, RequestInterceptor, Response, ResponseInterceptor, Result, request_fn, response_fn,
};
