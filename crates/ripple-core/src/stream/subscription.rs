use futures::task::AtomicWaker;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::task::Waker;

/// Demand value that disables flow control for the rest of the subscription.
pub const UNBOUNDED: u64 = u64::MAX;

#[derive(Default)]
struct SubscriptionState {
	demand: AtomicU64,
	cancelled: AtomicBool,
	invalid_request: AtomicBool,
	waker: AtomicWaker,
}

/// Handle through which a subscriber signals demand or cancels.
///
/// Cloning is cheap and every clone controls the same subscription, so the
/// handle may be moved to another task or thread. Calls made after the
/// subscription terminated have no effect.
#[derive(Clone, Default)]
pub struct Subscription {
	state: Arc<SubscriptionState>,
}

impl Subscription {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	/// Requests `n` more values.
	///
	/// Demand accumulates and saturates at [`UNBOUNDED`]. Requesting zero values
	/// is a protocol violation that terminates the subscription with
	/// [`Error::InvalidDemand`](crate::exception::Error::InvalidDemand).
	pub fn request(&self, n: u64) {
		if n == 0 {
			self.state.invalid_request.store(true, Ordering::Release);
		} else {
			let _ = self
				.state
				.demand
				.fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
					Some(current.saturating_add(n))
				});
		}
		self.state.waker.wake();
	}

	/// Stops the producer. No further signal, terminal or not, is delivered.
	pub fn cancel(&self) {
		self.state.cancelled.store(true, Ordering::Release);
		self.state.waker.wake();
	}

	/// Whether [`cancel`](Self::cancel) has been called on any clone.
	pub fn is_cancelled(&self) -> bool {
		self.state.cancelled.load(Ordering::Acquire)
	}

	/// Outstanding demand not yet satisfied by delivered values.
	pub fn pending_demand(&self) -> u64 {
		self.state.demand.load(Ordering::Acquire)
	}

	pub(crate) fn has_demand(&self) -> bool {
		self.pending_demand() > 0
	}

	pub(crate) fn take_invalid_request(&self) -> bool {
		self.state.invalid_request.swap(false, Ordering::AcqRel)
	}

	pub(crate) fn consume_one(&self) {
		let _ = self
			.state
			.demand
			.fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| match current {
				UNBOUNDED => None,
				0 => None,
				n => Some(n - 1),
			});
	}

	pub(crate) fn register(&self, waker: &Waker) {
		self.state.waker.register(waker);
	}
}

impl fmt::Debug for Subscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription")
			.field("demand", &self.pending_demand())
			.field("cancelled", &self.is_cancelled())
			.finish()
	}
}
