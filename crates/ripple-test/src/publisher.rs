//! Publishers and subscribers that record what happened to them.

use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use ripple_core::exception::Error;
use ripple_core::stream::{Publisher, Subscriber, Subscription};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counter shared with a publisher built by [`counting_publisher`].
#[derive(Debug, Clone, Default)]
pub struct ProducedCounter(Arc<AtomicUsize>);

impl ProducedCounter {
	/// Values actually produced so far.
	pub fn get(&self) -> usize {
		self.0.load(Ordering::SeqCst)
	}
}

/// Publisher over `values` that counts every value it produces.
///
/// # Examples
///
/// ```
/// use ripple_test::publisher::counting_publisher;
///
/// # futures::executor::block_on(async {
/// let (publisher, produced) = counting_publisher(vec![1, 2, 3]);
/// assert_eq!(publisher.next().await.unwrap(), Some(1));
/// assert_eq!(produced.get(), 1);
/// # });
/// ```
pub fn counting_publisher<T>(values: Vec<T>) -> (Publisher<T>, ProducedCounter)
where
	T: Send + 'static,
{
	let counter = ProducedCounter::default();
	let shared = counter.clone();
	let source = stream::iter(values).map(move |value| {
		shared.0.fetch_add(1, Ordering::SeqCst);
		value
	});
	(Publisher::from_stream(source), counter)
}

/// Signal observed by a [`RecordingSubscriber`].
#[derive(Debug, Clone, PartialEq)]
pub enum Signal<T> {
	Next(T),
	Error(String),
	Complete,
}

/// Subscriber that requests a fixed demand and records every signal.
#[derive(Debug, Clone)]
pub struct RecordingSubscriber<T> {
	demand: u64,
	signals: Arc<Mutex<Vec<Signal<T>>>>,
	subscription: Arc<Mutex<Option<Subscription>>>,
}

impl<T: Clone> RecordingSubscriber<T> {
	/// Requests `demand` values on subscription; zero requests nothing.
	pub fn new(demand: u64) -> Self {
		Self {
			demand,
			signals: Arc::new(Mutex::new(Vec::new())),
			subscription: Arc::new(Mutex::new(None)),
		}
	}

	pub fn signals(&self) -> Vec<Signal<T>> {
		self.signals.lock().clone()
	}

	/// Number of terminal signals seen.
	pub fn terminal_count(&self) -> usize {
		self.signals
			.lock()
			.iter()
			.filter(|signal| !matches!(signal, Signal::Next(_)))
			.count()
	}

	pub fn subscription(&self) -> Option<Subscription> {
		self.subscription.lock().clone()
	}
}

impl<T: Send> Subscriber<T> for RecordingSubscriber<T> {
	fn on_subscribe(&mut self, subscription: Subscription) {
		if self.demand > 0 {
			subscription.request(self.demand);
		}
		*self.subscription.lock() = Some(subscription);
	}

	fn on_next(&mut self, item: T) {
		self.signals.lock().push(Signal::Next(item));
	}

	fn on_error(&mut self, error: Error) {
		self.signals.lock().push(Signal::Error(error.to_string()));
	}

	fn on_complete(&mut self) {
		self.signals.lock().push(Signal::Complete);
	}
}
