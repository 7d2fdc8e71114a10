use super::subscriber::Subscriber;
use super::subscription::Subscription;
use crate::exception::{Error, Result, panic_message};
use futures::future::{self, BoxFuture};
use futures::stream::{self, BoxStream, Stream, StreamExt, TryStreamExt};
use std::fmt;
use std::future::Future;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::pin::Pin;
use std::task::{Context, Poll};

/// Values a driver delivers synchronously before yielding to the executor.
const YIELD_BUDGET: usize = 32;

/// Lazy producer of zero or more values followed by at most one terminal signal.
///
/// A publisher does nothing until it is subscribed. Subscribing consumes it, so
/// a publisher serves exactly one subscriber.
///
/// # Examples
///
/// ```
/// use ripple_core::stream::Publisher;
///
/// # futures::executor::block_on(async {
/// let doubled = Publisher::from_iter(vec![1, 2, 3]).map(|n| n * 2);
/// assert_eq!(doubled.collect().await.unwrap(), vec![2, 4, 6]);
/// # });
/// ```
pub struct Publisher<T> {
	source: BoxStream<'static, Result<T>>,
}

impl<T> Publisher<T>
where
	T: Send + 'static,
{
	/// Wraps a stream whose items already carry the failure channel.
	///
	/// The stream ends after the first `Err` item. A panic raised while polling
	/// it surfaces as [`Error::ProducerPanicked`].
	pub fn from_fallible_stream<S>(source: S) -> Self
	where
		S: Stream<Item = Result<T>> + Send + 'static,
	{
		Self {
			source: PanicGuard {
				inner: Some(source.boxed()),
			}
			.boxed(),
		}
	}

	pub fn from_stream<S>(source: S) -> Self
	where
		S: Stream<Item = T> + Send + 'static,
	{
		Self::from_fallible_stream(source.map(Ok))
	}

	/// Completes immediately without a value.
	pub fn empty() -> Self {
		Self::from_fallible_stream(stream::empty())
	}

	pub fn just(value: T) -> Self {
		Self::from_fallible_stream(stream::once(future::ready(Ok(value))))
	}

	/// Fails immediately with `error`.
	pub fn error(error: Error) -> Self {
		Self::from_fallible_stream(stream::once(future::ready(Err(error))))
	}

	pub fn from_iter<I>(values: I) -> Self
	where
		I: IntoIterator<Item = T>,
		I::IntoIter: Send + 'static,
	{
		Self::from_fallible_stream(stream::iter(values.into_iter().map(Ok)))
	}

	/// Single-valued publisher: `Ok(None)` completes empty.
	///
	/// The future is not polled until the publisher is subscribed with demand.
	pub fn from_future<F>(source: F) -> Self
	where
		F: Future<Output = Result<Option<T>>> + Send + 'static,
	{
		Self::from_fallible_stream(
			stream::once(source).filter_map(|outcome| future::ready(outcome.transpose())),
		)
	}

	/// Builds the real publisher only when it is first polled.
	pub fn defer<F>(factory: F) -> Self
	where
		F: FnOnce() -> Publisher<T> + Send + 'static,
	{
		Self::from_fallible_stream(
			stream::once(future::lazy(move |_| factory().source)).flatten(),
		)
	}

	pub fn map<U, F>(self, mut f: F) -> Publisher<U>
	where
		U: Send + 'static,
		F: FnMut(T) -> U + Send + 'static,
	{
		Publisher::from_fallible_stream(self.source.map_ok(move |value| f(value)))
	}

	pub fn map_err<F>(self, mut f: F) -> Self
	where
		F: FnMut(Error) -> Error + Send + 'static,
	{
		Self::from_fallible_stream(self.source.map_err(move |error| f(error)))
	}

	/// Subscribes `subscriber` and returns the future that drives delivery.
	///
	/// Signals are delivered on the task awaiting the returned future. The
	/// future resolves once a terminal signal was delivered or the
	/// subscription was cancelled.
	pub fn subscribe<S>(self, subscriber: S) -> Subscribed<T>
	where
		S: Subscriber<T> + 'static,
	{
		Subscribed {
			source: Some(self.source),
			subscriber: Box::new(subscriber),
			subscription: Subscription::new(),
			started: false,
		}
	}

	/// Takes the first value and cancels the rest.
	pub async fn next(self) -> Result<Option<T>> {
		let mut source = self.source;
		source.next().await.transpose()
	}

	/// Collects every value, failing on the first failure signal.
	pub async fn collect(self) -> Result<Vec<T>> {
		self.source.try_collect().await
	}

	/// Pull-based view of the publisher: every poll is a demand of one.
	pub fn into_stream(self) -> BoxStream<'static, Result<T>> {
		self.source
	}

	/// Single-valued view resolving to the first value, if any.
	pub fn into_future(self) -> BoxFuture<'static, Result<Option<T>>> {
		Box::pin(self.next())
	}
}

impl<T> fmt::Debug for Publisher<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Publisher")
			.field("element", &std::any::type_name::<T>())
			.finish()
	}
}

/// Ends the stream after a failure and turns producer panics into failures.
struct PanicGuard<T> {
	inner: Option<BoxStream<'static, Result<T>>>,
}

impl<T> Stream for PanicGuard<T> {
	type Item = Result<T>;

	fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
		let this = self.get_mut();
		let Some(inner) = this.inner.as_mut() else {
			return Poll::Ready(None);
		};
		match catch_unwind(AssertUnwindSafe(|| inner.poll_next_unpin(cx))) {
			Ok(Poll::Ready(Some(Ok(value)))) => Poll::Ready(Some(Ok(value))),
			Ok(Poll::Ready(Some(Err(error)))) => {
				this.inner = None;
				Poll::Ready(Some(Err(error)))
			}
			Ok(Poll::Ready(None)) => {
				this.inner = None;
				Poll::Ready(None)
			}
			Ok(Poll::Pending) => Poll::Pending,
			Err(payload) => {
				this.inner = None;
				let message = panic_message(payload.as_ref());
				tracing::warn!(panic = %message, "publisher panicked while producing a value");
				Poll::Ready(Some(Err(Error::ProducerPanicked(message))))
			}
		}
	}
}

/// Driver future returned by [`Publisher::subscribe`].
#[must_use = "a subscription delivers nothing unless its driver is awaited"]
pub struct Subscribed<T> {
	source: Option<BoxStream<'static, Result<T>>>,
	subscriber: Box<dyn Subscriber<T>>,
	subscription: Subscription,
	started: bool,
}

impl<T> Subscribed<T> {
	fn terminate(&mut self, signal: Option<Error>) -> Poll<()> {
		self.source = None;
		if self.subscription.is_cancelled() {
			return Poll::Ready(());
		}
		match signal {
			Some(error) => self.subscriber.on_error(error),
			None => self.subscriber.on_complete(),
		}
		Poll::Ready(())
	}
}

impl<T> Future for Subscribed<T> {
	type Output = ();

	fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
		let this = self.get_mut();
		if !this.started {
			this.started = true;
			this.subscriber.on_subscribe(this.subscription.clone());
		}

		let mut budget = YIELD_BUDGET;
		loop {
			if this.source.is_none() {
				return Poll::Ready(());
			}
			this.subscription.register(cx.waker());

			if this.subscription.is_cancelled() {
				tracing::debug!("subscription cancelled, dropping upstream");
				this.source = None;
				return Poll::Ready(());
			}
			if this.subscription.take_invalid_request() {
				return this.terminate(Some(Error::InvalidDemand(0)));
			}
			if !this.subscription.has_demand() {
				return Poll::Pending;
			}

			let Some(source) = this.source.as_mut() else {
				return Poll::Ready(());
			};
			match source.poll_next_unpin(cx) {
				Poll::Ready(Some(Ok(value))) => {
					this.subscription.consume_one();
					this.subscriber.on_next(value);
					budget -= 1;
					if budget == 0 {
						cx.waker().wake_by_ref();
						return Poll::Pending;
					}
				}
				Poll::Ready(Some(Err(error))) => return this.terminate(Some(error)),
				Poll::Ready(None) => return this.terminate(None),
				Poll::Pending => return Poll::Pending,
			}
		}
	}
}
