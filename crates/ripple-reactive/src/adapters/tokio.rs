use crate::converter::{PublisherConverter, mismatch};
use crate::descriptor::{ReturnValue, TypeDescriptor};
use futures::StreamExt;
use ripple_core::exception::{Error, Result};
use ripple_core::stream::Publisher;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::{ReceiverStream, UnboundedReceiverStream};

/// Bridges tokio channels and tasks.
///
/// Receivers and join handles convert into publishers. A publisher converts
/// into a [`ResultOneshot`] (first value) or a bounded [`ResultReceiver`]; both
/// are fed by a task spawned on the current runtime and carry the publisher's
/// failure as their last item.
#[derive(Debug, Clone, Copy)]
pub struct TokioConverter {
	channel_capacity: usize,
}

/// Oneshot receiver produced from a publisher: the first value or the failure.
pub type ResultOneshot<T> = oneshot::Receiver<Result<T>>;

/// Bounded receiver produced from a publisher; a failure is the final item.
pub type ResultReceiver<T> = mpsc::Receiver<Result<T>>;

impl TokioConverter {
	/// Creates a converter whose `mpsc` pumps buffer `channel_capacity` values.
	pub fn new(channel_capacity: usize) -> Self {
		Self {
			channel_capacity: channel_capacity.max(1),
		}
	}

	pub fn channel_capacity(&self) -> usize {
		self.channel_capacity
	}

	fn runtime(&self) -> Result<Handle> {
		Handle::try_current()
			.map_err(|e| Error::Conversion(format!("no tokio runtime to drive the conversion: {e}")))
	}
}

impl Default for TokioConverter {
	fn default() -> Self {
		Self::new(crate::DEFAULT_CHANNEL_CAPACITY)
	}
}

impl PublisherConverter for TokioConverter {
	fn name(&self) -> &'static str {
		"tokio"
	}

	fn can_convert_from_publisher<T: Send + 'static>(&self, target: TypeDescriptor) -> bool {
		target.is::<ResultOneshot<T>>() || target.is::<ResultReceiver<T>>()
	}

	fn can_convert_to_publisher<T: Send + 'static>(&self, source: TypeDescriptor) -> bool {
		self.can_convert_from_publisher::<T>(source)
			|| source.is::<oneshot::Receiver<T>>()
			|| source.is::<mpsc::Receiver<T>>()
			|| source.is::<mpsc::UnboundedReceiver<T>>()
			|| source.is::<JoinHandle<T>>()
	}

	fn convert_from_publisher<T: Send + 'static>(
		&self,
		publisher: Publisher<T>,
		target: TypeDescriptor,
	) -> Result<ReturnValue> {
		if target.is::<ResultOneshot<T>>() {
			let runtime = self.runtime()?;
			let (mut sender, receiver) = oneshot::channel::<Result<T>>();
			runtime.spawn(async move {
				let first = tokio::select! {
					_ = sender.closed() => {
						tracing::debug!("oneshot receiver dropped, cancelling publisher");
						return;
					}
					first = publisher.next() => first,
				};
				// An empty publisher drops the sender, which reads as completion.
				if let Some(outcome) = first.transpose() {
					let _ = sender.send(outcome);
				}
			});
			Ok(ReturnValue::new(receiver))
		} else if target.is::<ResultReceiver<T>>() {
			let runtime = self.runtime()?;
			let (sender, receiver) = mpsc::channel::<Result<T>>(self.channel_capacity);
			runtime.spawn(async move {
				let mut values = publisher.into_stream();
				loop {
					let item = tokio::select! {
						_ = sender.closed() => None,
						item = values.next() => Some(item),
					};
					let Some(item) = item else {
						tracing::debug!("receiver dropped, cancelling publisher");
						break;
					};
					let Some(item) = item else {
						break;
					};
					let failed = item.is_err();
					if sender.send(item).await.is_err() {
						tracing::debug!("receiver dropped, cancelling publisher");
						break;
					}
					if failed {
						break;
					}
				}
			});
			Ok(ReturnValue::new(receiver))
		} else {
			Err(Error::unsupported_conversion(
				std::any::type_name::<Publisher<T>>(),
				target.name(),
			))
		}
	}

	fn convert_to_publisher<T: Send + 'static>(&self, source: ReturnValue) -> Result<Publisher<T>> {
		let source = match source.downcast::<ResultOneshot<T>>() {
			Ok(receiver) => {
				return Ok(Publisher::from_future(async move {
					match receiver.await {
						Ok(outcome) => outcome.map(Some),
						Err(_) => Ok(None),
					}
				}));
			}
			Err(source) => source,
		};
		let source = match source.downcast::<ResultReceiver<T>>() {
			Ok(receiver) => return Ok(Publisher::from_fallible_stream(ReceiverStream::new(receiver))),
			Err(source) => source,
		};
		let source = match source.downcast::<oneshot::Receiver<T>>() {
			// A dropped sender completes empty.
			Ok(receiver) => return Ok(Publisher::from_future(async move { Ok(receiver.await.ok()) })),
			Err(source) => source,
		};
		let source = match source.downcast::<mpsc::Receiver<T>>() {
			Ok(receiver) => return Ok(Publisher::from_stream(ReceiverStream::new(receiver))),
			Err(source) => source,
		};
		let source = match source.downcast::<mpsc::UnboundedReceiver<T>>() {
			Ok(receiver) => return Ok(Publisher::from_stream(UnboundedReceiverStream::new(receiver))),
			Err(source) => source,
		};
		match source.downcast::<JoinHandle<T>>() {
			Ok(handle) => Ok(Publisher::from_future(async move {
				handle.await.map(Some).map_err(Error::handler)
			})),
			Err(source) => Err(mismatch(self.name(), &source)),
		}
	}
}
