//! Handlers and the results they produce.

use ripple_core::stream::Publisher;
use ripple_reactive::{ReturnValue, TypeDescriptor};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Opaque reference to an application handler.
///
/// The dispatcher never looks inside a handler; only the adapter that claims
/// it downcasts to the concrete type.
#[derive(Clone)]
pub struct HandlerRef {
	name: Arc<str>,
	handler: Arc<dyn Any + Send + Sync>,
}

impl HandlerRef {
	pub fn new<H>(name: impl AsRef<str>, handler: H) -> Self
	where
		H: Any + Send + Sync,
	{
		Self::from_arc(name, Arc::new(handler))
	}

	pub fn from_arc(name: impl AsRef<str>, handler: Arc<dyn Any + Send + Sync>) -> Self {
		Self {
			name: Arc::from(name.as_ref()),
			handler,
		}
	}

	/// Descriptive name used in logs and errors.
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn is<H: Any>(&self) -> bool {
		self.handler.is::<H>()
	}

	pub fn downcast_ref<H: Any>(&self) -> Option<&H> {
		self.handler.downcast_ref::<H>()
	}
}

impl fmt::Debug for HandlerRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("HandlerRef").field(&self.name).finish()
	}
}

/// Value produced by invoking a handler, with the handler that produced it.
#[derive(Debug)]
pub struct HandlerResult {
	handler: HandlerRef,
	value: ReturnValue,
	declared_type: TypeDescriptor,
}

impl HandlerResult {
	/// Result whose declared type is the type of `value`.
	pub fn new(handler: HandlerRef, value: ReturnValue) -> Self {
		let declared_type = value.descriptor();
		Self {
			handler,
			value,
			declared_type,
		}
	}

	/// Overrides the declared return type, e.g. when the handler signature
	/// is more general than the value it produced.
	pub fn with_declared_type(mut self, declared_type: TypeDescriptor) -> Self {
		self.declared_type = declared_type;
		self
	}

	pub fn handler(&self) -> &HandlerRef {
		&self.handler
	}

	pub fn value(&self) -> &ReturnValue {
		&self.value
	}

	pub fn declared_type(&self) -> TypeDescriptor {
		self.declared_type
	}

	pub fn into_value(self) -> ReturnValue {
		self.value
	}
}

/// What a handler adapter hands back to the dispatcher.
#[derive(Debug)]
pub enum HandlerOutcome {
	/// The result is already computed.
	Ready(HandlerResult),
	/// The result arrives later as the first value of the publisher.
	Deferred(Publisher<HandlerResult>),
}

impl From<HandlerResult> for HandlerOutcome {
	fn from(result: HandlerResult) -> Self {
		HandlerOutcome::Ready(result)
	}
}

impl From<Publisher<HandlerResult>> for HandlerOutcome {
	fn from(publisher: Publisher<HandlerResult>) -> Self {
		HandlerOutcome::Deferred(publisher)
	}
}
