//! Graceful shutdown coordination.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

struct Inner {
	timeout: Duration,
	signal: watch::Sender<bool>,
	complete: watch::Sender<bool>,
}

/// Broadcasts a shutdown request to the listener loop and its connections,
/// and reports when the server finished draining.
///
/// Clones share the same state.
///
/// # Examples
///
/// ```
/// use ripple_server::ShutdownCoordinator;
/// use std::time::Duration;
///
/// let coordinator = ShutdownCoordinator::new(Duration::from_secs(5));
/// assert!(!coordinator.is_shutting_down());
/// coordinator.shutdown();
/// assert!(coordinator.is_shutting_down());
/// ```
#[derive(Clone)]
pub struct ShutdownCoordinator {
	inner: Arc<Inner>,
}

impl ShutdownCoordinator {
	/// `timeout` bounds how long open connections may take to finish.
	pub fn new(timeout: Duration) -> Self {
		let (signal, _) = watch::channel(false);
		let (complete, _) = watch::channel(false);
		Self {
			inner: Arc::new(Inner {
				timeout,
				signal,
				complete,
			}),
		}
	}

	pub fn timeout(&self) -> Duration {
		self.inner.timeout
	}

	/// Requests shutdown. Idempotent.
	pub fn shutdown(&self) {
		self.inner.signal.send_replace(true);
	}

	pub fn is_shutting_down(&self) -> bool {
		*self.inner.signal.borrow()
	}

	/// Resolves once [`shutdown`](Self::shutdown) has been called, including
	/// calls made before this future was created.
	pub async fn signalled(&self) {
		let mut receiver = self.inner.signal.subscribe();
		while !*receiver.borrow_and_update() {
			if receiver.changed().await.is_err() {
				return;
			}
		}
	}

	/// Marks the server as fully stopped.
	pub fn notify_shutdown_complete(&self) {
		self.inner.complete.send_replace(true);
	}

	/// Resolves once the server reported completion.
	pub async fn wait_for_shutdown(&self) {
		let mut receiver = self.inner.complete.subscribe();
		while !*receiver.borrow_and_update() {
			if receiver.changed().await.is_err() {
				return;
			}
		}
	}
}

impl std::fmt::Debug for ShutdownCoordinator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ShutdownCoordinator")
			.field("timeout", &self.inner.timeout)
			.field("shutting_down", &self.is_shutting_down())
			.finish()
	}
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
pub async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(error) = tokio::signal::ctrl_c().await {
			tracing::error!(%error, "failed to listen for Ctrl+C");
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
			Ok(mut signal) => {
				signal.recv().await;
			}
			Err(error) => {
				tracing::error!(%error, "failed to listen for SIGTERM");
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}
	tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[tokio::test]
	async fn test_signal_sent_before_waiting_is_observed() {
		// Arrange
		let coordinator = ShutdownCoordinator::new(Duration::from_secs(1));
		coordinator.shutdown();

		// Act
		let observed = tokio::time::timeout(Duration::from_millis(100), coordinator.signalled()).await;

		// Assert
		assert!(observed.is_ok());
	}

	#[rstest]
	#[tokio::test]
	async fn test_clones_share_completion() {
		// Arrange
		let coordinator = ShutdownCoordinator::new(Duration::from_secs(1));
		let clone = coordinator.clone();
		let waiter = tokio::spawn(async move { clone.wait_for_shutdown().await });

		// Act
		coordinator.notify_shutdown_complete();

		// Assert
		tokio::time::timeout(Duration::from_millis(100), waiter)
			.await
			.unwrap()
			.unwrap();
	}

	#[rstest]
	#[tokio::test]
	async fn test_signalled_waits_for_shutdown() {
		let coordinator = ShutdownCoordinator::new(Duration::from_secs(1));

		let observed = tokio::time::timeout(Duration::from_millis(20), coordinator.signalled()).await;

		assert!(observed.is_err());
	}
}
