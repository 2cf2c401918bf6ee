//! Core types and traits for the fetchkit HTTP client wrapper.
//!
//! This crate holds everything that does not touch the network:
//! - [`Method`], [`Request`] and [`RequestBuilder`] - request descriptors
//! - [`Response`] and [`Content`] - responses and negotiated bodies
//! - [`Error`] and [`Result`] - the error taxonomy
//! - [`Query`], [`Payload`], [`DeleteParams`], [`Form`] - call parameters
//! - [`HttpClient`] - the transport seam
//! - [`RequestInterceptor`], [`ResponseInterceptor`], [`InterceptorChain`]
//! - [`filename_from_disposition`] - download filename extraction

mod body;
mod client;
mod delete;
mod disposition;
mod error;
mod headers;
mod interceptor;
mod method;
mod multipart;
pub mod prelude;
mod query;
mod request;
mod response;

pub use body::{Content, ContentType, Payload, from_json, to_json};
pub use client::HttpClient;
pub use delete::DeleteParams;
pub use disposition::filename_from_disposition;
pub use error::{Error, Result};
pub use headers::Headers;
pub use interceptor::{
    InterceptFuture, InterceptorChain, RequestFn, RequestInterceptor, ResponseFn,
    ResponseInterceptor, request_fn, response_fn,
};
pub use method::Method;
pub use multipart::{Form, Part};
pub use query::Query;
pub use request::{Request, RequestBuilder};
pub use response::Response;
