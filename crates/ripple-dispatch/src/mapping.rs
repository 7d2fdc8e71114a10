//! Handler lookup.

use crate::handler::HandlerRef;
use http::Method;
use ripple_http::ServerHttpRequest;
use std::collections::HashMap;

/// Selects the handler for a request.
///
/// Mappings are consulted in ascending [`order`](Self::order); the first one
/// returning a handler wins.
pub trait HandlerMapping: Send + Sync {
	fn get_handler(&self, request: &ServerHttpRequest) -> Option<HandlerRef>;

	fn order(&self) -> i32 {
		0
	}
}

/// Path that selected the handler, stored in the request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedPath(pub String);

/// Mapping from exact method and path to a handler.
///
/// # Examples
///
/// ```
/// use ripple_dispatch::{HandlerMapping, HandlerRef, PathHandlerMapping};
/// use ripple_http::ServerHttpRequest;
/// use http::Method;
///
/// let mapping = PathHandlerMapping::new().route(Method::GET, "/ping", HandlerRef::new("ping", ()));
///
/// let request = ServerHttpRequest::builder().uri("/ping").build().unwrap();
/// assert_eq!(mapping.get_handler(&request).unwrap().name(), "ping");
///
/// let request = ServerHttpRequest::builder().uri("/pong").build().unwrap();
/// assert!(mapping.get_handler(&request).is_none());
/// ```
#[derive(Debug, Default)]
pub struct PathHandlerMapping {
	routes: HashMap<(Method, String), HandlerRef>,
	order: i32,
}

impl PathHandlerMapping {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `handler` for `method` and `path`, replacing any previous one.
	pub fn route(mut self, method: Method, path: impl Into<String>, handler: HandlerRef) -> Self {
		self.routes.insert((method, path.into()), handler);
		self
	}

	pub fn with_order(mut self, order: i32) -> Self {
		self.order = order;
		self
	}

	pub fn len(&self) -> usize {
		self.routes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}
}

impl HandlerMapping for PathHandlerMapping {
	fn get_handler(&self, request: &ServerHttpRequest) -> Option<HandlerRef> {
		let key = (request.method().clone(), request.path().to_string());
		let handler = self.routes.get(&key)?;
		request.extensions().insert(MatchedPath(key.1));
		Some(handler.clone())
	}

	fn order(&self) -> i32 {
		self.order
	}
}
