use super::subscription::Subscription;
use crate::exception::Error;

/// Consumer side of a [`Publisher`](super::Publisher) subscription.
///
/// Signals arrive in the order `on_subscribe`, then zero or more `on_next`
/// bounded by the requested demand, then at most one of `on_error` or
/// `on_complete`. No terminal signal is delivered after the subscription has
/// been cancelled.
pub trait Subscriber<T>: Send {
	/// Receives the subscription handle. Nothing is produced until demand is
	/// requested through it.
	fn on_subscribe(&mut self, subscription: Subscription);

	fn on_next(&mut self, item: T);

	fn on_error(&mut self, error: Error);

	fn on_complete(&mut self);
}

impl<T, S> Subscriber<T> for Box<S>
where
	S: Subscriber<T> + ?Sized,
{
	fn on_subscribe(&mut self, subscription: Subscription) {
		(**self).on_subscribe(subscription);
	}

	fn on_next(&mut self, item: T) {
		(**self).on_next(item);
	}

	fn on_error(&mut self, error: Error) {
		(**self).on_error(error);
	}

	fn on_complete(&mut self) {
		(**self).on_complete();
	}
}
