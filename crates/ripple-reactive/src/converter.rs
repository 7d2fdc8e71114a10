use crate::descriptor::{ReturnValue, TypeDescriptor};
use ripple_core::exception::{BoxError, Error, Result};
use ripple_core::stream::Publisher;

/// Conversion between [`Publisher`] and one family of third-party
/// asynchronous types.
///
/// Every method is parameterised by the element type `T`; an adapter answers
/// for its supported types instantiated at that `T`.
pub trait PublisherConverter: Send + Sync {
	fn name(&self) -> &'static str;

	/// Whether a `Publisher<T>` can be turned into `target`.
	fn can_convert_from_publisher<T: Send + 'static>(&self, target: TypeDescriptor) -> bool;

	/// Whether `source` can be turned into a `Publisher<T>`.
	fn can_convert_to_publisher<T: Send + 'static>(&self, source: TypeDescriptor) -> bool {
		self.can_convert_from_publisher::<T>(source)
	}

	fn convert_from_publisher<T: Send + 'static>(
		&self,
		publisher: Publisher<T>,
		target: TypeDescriptor,
	) -> Result<ReturnValue>;

	fn convert_to_publisher<T: Send + 'static>(&self, source: ReturnValue) -> Result<Publisher<T>>;

	fn can_convert<T: Send + 'static>(&self, source: TypeDescriptor, target: TypeDescriptor) -> bool {
		let publisher = TypeDescriptor::of::<Publisher<T>>();
		(source == publisher && self.can_convert_from_publisher::<T>(target))
			|| (target == publisher && self.can_convert_to_publisher::<T>(source))
	}

	/// Converts in whichever direction `source` allows.
	fn convert<T: Send + 'static>(&self, source: ReturnValue, target: TypeDescriptor) -> Result<ReturnValue> {
		match source.downcast::<Publisher<T>>() {
			Ok(publisher) => self.convert_from_publisher(publisher, target),
			Err(source) => self.convert_to_publisher::<T>(source).map(ReturnValue::new),
		}
	}
}

/// Recovers a Ripple error that crossed a third-party boxed-error boundary,
/// wrapping anything else as a handler failure.
pub(crate) fn into_error(error: BoxError) -> Error {
	match error.downcast::<Error>() {
		Ok(error) => *error,
		Err(other) => Error::Handler(other),
	}
}

/// Builds the error for a value an adapter claimed but cannot downcast.
pub(crate) fn mismatch(adapter: &str, source: &ReturnValue) -> Error {
	Error::Conversion(format!(
		"{adapter} adapter cannot read a value of type {}",
		source.descriptor()
	))
}
