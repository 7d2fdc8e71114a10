//! # Ripple
//!
//! A reactive HTTP dispatch core for Rust.
//!
//! Ripple routes each request through a chain of collaborators and lets
//! handlers return whatever asynchronous type they like: a ready value, a
//! `futures` stream or future, a tokio channel or task. Those values are
//! normalised into a demand-driven [`Publisher`](core::Publisher) and only as
//! much as the response needs is ever produced.
//!
//! ## Crates
//!
//! - [`core`]: error taxonomy and the publisher/subscriber contract
//! - [`reactive`]: capability probe and reactive-type adapters
//! - [`http`]: request/response model and the transport seam
//! - [`dispatch`]: the dispatcher and its collaborators
//! - [`server`]: hyper transport bridge (feature `server`)
//! - [`conf`]: TOML and environment settings (feature `conf`)
//! - [`logging`]: `tracing-subscriber` initialisation (feature `conf`)
//! - [`test`]: testing utilities (feature `test`)
//!
//! ## Feature Flags
//!
//! - `full` (default): `server`, `conf` and both adapters
//! - `minimal`: dispatch core only
//! - `futures-adapter`, `tokio-adapter`: reactive-type adapters
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use ripple::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> ripple::core::Result<()> {
//! let hello = InvocableHandler::new(|_request| Ok("Hello, Ripple!")).into_ref("hello");
//! let dispatcher = DispatcherHandler::builder()
//!     .mapping(PathHandlerMapping::new().route(Method::GET, "/", hello))
//!     .adapter(InvocableHandlerAdapter::default())
//!     .result_handler(BytesResultHandler::new())
//!     .build();
//!
//! let settings = Settings::load("ripple.toml").map_err(|e| ripple::core::Error::Internal(e.to_string()))?;
//! ripple::server::serve_with_settings(&settings.server, Arc::new(dispatcher)).await
//! # }
//! ```

pub mod conf;
pub mod core;
pub mod dispatch;
pub mod http;
pub mod logging;
pub mod reactive;
pub mod server;
pub mod test;

pub use ripple_core::{Error, Publisher, Result, Subscriber, Subscription};
pub use ripple_dispatch::DispatcherHandler;
pub use ripple_http::{HttpHandler, ServerHttpRequest, ServerHttpResponse};
pub use ripple_reactive::{Capabilities, CompositionConverter};

#[cfg(feature = "conf")]
pub use ripple_conf::Settings;
#[cfg(feature = "server")]
pub use ripple_server::{HttpClient, HttpServer};

/// Re-exports for building applications.
pub mod prelude {
	pub use crate::{
		Capabilities, CompositionConverter, DispatcherHandler, Error, HttpHandler, Publisher, Result,
		ServerHttpRequest, ServerHttpResponse, Subscriber, Subscription,
	};
	pub use ripple_dispatch::{
		BytesResultHandler, HandlerAdapter, HandlerMapping, HandlerOutcome, HandlerRef, HandlerResult,
		HandlerResultHandler, InvocableHandler, InvocableHandlerAdapter, PathHandlerMapping,
		StreamingResultHandler,
	};
	pub use ripple_http::{HttpCookie, ResponseCookie};
	pub use ripple_reactive::{ReturnValue, TypeDescriptor};

	pub use ripple_http::http::{Method, StatusCode};

	#[cfg(feature = "conf")]
	pub use crate::Settings;
	#[cfg(feature = "server")]
	pub use crate::{HttpClient, HttpServer};
}
