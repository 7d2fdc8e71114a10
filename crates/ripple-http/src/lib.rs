//! # Ripple HTTP
//!
//! The HTTP exchange model seen by the dispatch core.
//!
//! - [`ServerHttpRequest`]: method, URI, headers, cookies and a body publisher
//! - [`ServerHttpResponse`]: status, headers and cookies that freeze on
//!   commit, with the body written through a [`ResponseTransport`]
//! - [`ClientHttpRequest`] / [`ClientHttpResponse`]: the client-side model
//! - [`HttpHandler`]: the contract a transport calls into

pub mod client;
pub mod cookie;
pub mod extensions;
pub mod handler;
pub mod request;
pub mod response;

pub use http;

pub use client::{ClientHttpRequest, ClientHttpResponse};
pub use cookie::{CookieMap, HttpCookie, ResponseCookie, SameSite};
pub use extensions::Extensions;
pub use handler::HttpHandler;
pub use request::{ServerHttpRequest, ServerHttpRequestBuilder};
pub use response::{BeforeCommit, ResponseState, ResponseTransport, ServerHttpResponse};
