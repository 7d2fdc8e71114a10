//! # Ripple Server
//!
//! Transport bridge between hyper 1.x and the Ripple exchange model.
//!
//! - [`HttpServer`]: accept loop serving each connection on its own task,
//!   with graceful shutdown through a [`ShutdownCoordinator`]
//! - [`RequestService`]: maps a hyper request into a
//!   [`ServerHttpRequest`](ripple_http::ServerHttpRequest), runs the
//!   [`HttpHandler`](ripple_http::HttpHandler) and completes the response;
//!   failures left unhandled become an error status while the response is
//!   still open
//! - [`HyperResponseTransport`]: streams the response body with one chunk of
//!   buffering so the body publisher follows the client's pace
//! - [`HttpClient`]: executes a [`ClientHttpRequest`](ripple_http::ClientHttpRequest)

mod body;
pub mod client;
pub mod server;
pub mod shutdown;
pub mod transport;

pub use body::RequestBody;
pub use client::HttpClient;
pub use server::{HttpServer, RequestService, serve, serve_with_shutdown};
pub use shutdown::{ShutdownCoordinator, shutdown_signal};
pub use transport::{HyperResponseTransport, ResponseBody};
