use crate::converter::{PublisherConverter, into_error, mismatch};
use crate::descriptor::{ReturnValue, TypeDescriptor};
use futures::channel::{mpsc, oneshot};
use futures::future::BoxFuture;
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use ripple_core::exception::{BoxError, Error, Result};
use ripple_core::stream::Publisher;

/// Multi-valued `futures` stream carrying failures.
pub type FallibleStream<T> = BoxStream<'static, std::result::Result<T, BoxError>>;

/// Single-valued `futures` future: a value, an empty completion, or a failure.
pub type FallibleFuture<T> = BoxFuture<'static, std::result::Result<Option<T>, BoxError>>;

/// Bridges `futures` streams, futures and channels.
///
/// [`FallibleStream`] and [`FallibleFuture`] convert both ways. Infallible
/// boxed streams and futures, `oneshot` receivers and `mpsc` receivers are
/// accepted as sources only.
#[derive(Debug, Default, Clone, Copy)]
pub struct FuturesConverter;

impl FuturesConverter {
	pub fn new() -> Self {
		Self
	}
}

impl PublisherConverter for FuturesConverter {
	fn name(&self) -> &'static str {
		"futures"
	}

	fn can_convert_from_publisher<T: Send + 'static>(&self, target: TypeDescriptor) -> bool {
		target.is::<FallibleStream<T>>() || target.is::<FallibleFuture<T>>()
	}

	fn can_convert_to_publisher<T: Send + 'static>(&self, source: TypeDescriptor) -> bool {
		self.can_convert_from_publisher::<T>(source)
			|| source.is::<BoxStream<'static, T>>()
			|| source.is::<BoxFuture<'static, T>>()
			|| source.is::<oneshot::Receiver<T>>()
			|| source.is::<mpsc::Receiver<T>>()
	}

	fn convert_from_publisher<T: Send + 'static>(
		&self,
		publisher: Publisher<T>,
		target: TypeDescriptor,
	) -> Result<ReturnValue> {
		if target.is::<FallibleStream<T>>() {
			let stream: FallibleStream<T> = publisher
				.into_stream()
				.map_err(BoxError::from)
				.boxed();
			Ok(ReturnValue::new(stream))
		} else if target.is::<FallibleFuture<T>>() {
			let future: FallibleFuture<T> =
				Box::pin(async move { publisher.next().await.map_err(BoxError::from) });
			Ok(ReturnValue::new(future))
		} else {
			Err(Error::unsupported_conversion(
				std::any::type_name::<Publisher<T>>(),
				target.name(),
			))
		}
	}

	fn convert_to_publisher<T: Send + 'static>(&self, source: ReturnValue) -> Result<Publisher<T>> {
		let source = match source.downcast::<FallibleStream<T>>() {
			Ok(stream) => {
				return Ok(Publisher::from_fallible_stream(stream.map_err(into_error)));
			}
			Err(source) => source,
		};
		let source = match source.downcast::<FallibleFuture<T>>() {
			Ok(future) => {
				return Ok(Publisher::from_future(async move { future.await.map_err(into_error) }));
			}
			Err(source) => source,
		};
		let source = match source.downcast::<BoxStream<'static, T>>() {
			Ok(stream) => return Ok(Publisher::from_stream(stream)),
			Err(source) => source,
		};
		let source = match source.downcast::<BoxFuture<'static, T>>() {
			Ok(future) => return Ok(Publisher::from_future(async move { Ok(Some(future.await)) })),
			Err(source) => source,
		};
		let source = match source.downcast::<oneshot::Receiver<T>>() {
			// A dropped sender completes empty.
			Ok(receiver) => return Ok(Publisher::from_future(async move { Ok(receiver.await.ok()) })),
			Err(source) => source,
		};
		match source.downcast::<mpsc::Receiver<T>>() {
			Ok(receiver) => Ok(Publisher::from_stream(receiver)),
			Err(source) => Err(mismatch(self.name(), &source)),
		}
	}
}
