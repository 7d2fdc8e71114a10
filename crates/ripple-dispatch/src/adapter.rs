//! Handler invocation.

use crate::handler::{HandlerOutcome, HandlerRef, HandlerResult};
use ripple_core::exception::{Error, Result};
use ripple_core::stream::Publisher;
use ripple_http::{ServerHttpRequest, ServerHttpResponse};
use ripple_reactive::{CompositionConverter, ReturnValue, TypeDescriptor};
use std::any::Any;
use std::fmt;

/// Invokes one shape of handler.
///
/// Adapters are consulted in ascending [`order`](Self::order); the first one
/// supporting the handler invokes it and no other adapter is asked.
pub trait HandlerAdapter: Send + Sync {
	fn supports(&self, handler: &HandlerRef) -> bool;

	/// Invokes `handler`. Work that has to wait belongs in a
	/// [`HandlerOutcome::Deferred`] publisher, not in this call.
	fn handle(
		&self,
		request: &ServerHttpRequest,
		response: &mut ServerHttpResponse,
		handler: &HandlerRef,
	) -> Result<HandlerOutcome>;

	fn order(&self) -> i32 {
		0
	}
}

type Invoke = Box<dyn Fn(&ServerHttpRequest) -> Result<ReturnValue> + Send + Sync>;
type Normalize = fn(&CompositionConverter, ReturnValue) -> Result<Publisher<ReturnValue>>;

enum ResultShape {
	/// The returned value is the result.
	Immediate,
	/// The returned value is an asynchronous type resolving to one element.
	Asynchronous {
		element: TypeDescriptor,
		normalize: Normalize,
	},
}

/// Handler backed by a closure.
///
/// # Examples
///
/// ```
/// use ripple_dispatch::InvocableHandler;
/// use futures::future::BoxFuture;
///
/// let hello = InvocableHandler::new(|_request| Ok("hello"));
///
/// // Resolved later; the adapter converts the future into a publisher.
/// let later = InvocableHandler::deferred::<String, _, _>(|_request| {
///     let future: BoxFuture<'static, String> = Box::pin(async { "later".to_string() });
///     Ok(future)
/// });
/// # drop((hello, later));
/// ```
pub struct InvocableHandler {
	invoke: Invoke,
	shape: ResultShape,
}

impl InvocableHandler {
	/// Handler whose return value is the result itself.
	pub fn new<R, F>(f: F) -> Self
	where
		R: Any + Send,
		F: Fn(&ServerHttpRequest) -> Result<R> + Send + Sync + 'static,
	{
		Self {
			invoke: Box::new(move |request| f(request).map(ReturnValue::new)),
			shape: ResultShape::Immediate,
		}
	}

	/// Handler returning an asynchronous value `R` that resolves to a `T`.
	///
	/// `R` can be any type the [`CompositionConverter`] turns into a
	/// `Publisher<T>`, including `Publisher<T>` itself.
	pub fn deferred<T, R, F>(f: F) -> Self
	where
		T: Any + Send,
		R: Any + Send,
		F: Fn(&ServerHttpRequest) -> Result<R> + Send + Sync + 'static,
	{
		Self {
			invoke: Box::new(move |request| f(request).map(ReturnValue::new)),
			shape: ResultShape::Asynchronous {
				element: TypeDescriptor::of::<T>(),
				normalize: normalize::<T>,
			},
		}
	}

	/// Wraps the handler in a [`HandlerRef`].
	pub fn into_ref(self, name: impl AsRef<str>) -> HandlerRef {
		HandlerRef::new(name, self)
	}
}

impl fmt::Debug for InvocableHandler {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let shape = match &self.shape {
			ResultShape::Immediate => "immediate".to_string(),
			ResultShape::Asynchronous { element, .. } => format!("asynchronous<{element}>"),
		};
		f.debug_struct("InvocableHandler").field("shape", &shape).finish_non_exhaustive()
	}
}

fn normalize<T: Any + Send>(converter: &CompositionConverter, value: ReturnValue) -> Result<Publisher<ReturnValue>> {
	Ok(converter.to_publisher::<T>(value)?.map(ReturnValue::new))
}

/// Adapter for [`InvocableHandler`].
#[derive(Debug, Clone)]
pub struct InvocableHandlerAdapter {
	converter: CompositionConverter,
	order: i32,
}

impl InvocableHandlerAdapter {
	pub fn new(converter: CompositionConverter) -> Self {
		Self { converter, order: 0 }
	}

	pub fn with_order(mut self, order: i32) -> Self {
		self.order = order;
		self
	}
}

impl Default for InvocableHandlerAdapter {
	/// Uses the process-wide converter.
	fn default() -> Self {
		Self::new(CompositionConverter::global().clone())
	}
}

impl HandlerAdapter for InvocableHandlerAdapter {
	fn supports(&self, handler: &HandlerRef) -> bool {
		handler.is::<InvocableHandler>()
	}

	fn handle(
		&self,
		request: &ServerHttpRequest,
		_response: &mut ServerHttpResponse,
		handler: &HandlerRef,
	) -> Result<HandlerOutcome> {
		let invocable = handler
			.downcast_ref::<InvocableHandler>()
			.ok_or_else(|| Error::UnsupportedHandler(handler.name().to_string()))?;
		let value = (invocable.invoke)(request)?;

		match &invocable.shape {
			ResultShape::Immediate => Ok(HandlerOutcome::Ready(HandlerResult::new(handler.clone(), value))),
			ResultShape::Asynchronous { element, normalize } => {
				let declared_type = value.descriptor();
				tracing::trace!(handler = handler.name(), element = %element, "normalising asynchronous result");
				let handler = handler.clone();
				let results = normalize(&self.converter, value)?.map(move |value| {
					HandlerResult::new(handler.clone(), value).with_declared_type(declared_type)
				});
				Ok(HandlerOutcome::Deferred(results))
			}
		}
	}

	fn order(&self) -> i32 {
		self.order
	}
}
