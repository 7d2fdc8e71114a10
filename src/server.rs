//! hyper transport bridge.

#[cfg(feature = "server")]
pub use ripple_server::*;

#[cfg(all(feature = "server", feature = "conf"))]
use ripple_core::exception::{Error, Result};
#[cfg(all(feature = "server", feature = "conf"))]
use ripple_http::HttpHandler;
#[cfg(all(feature = "server", feature = "conf"))]
use std::sync::Arc;

/// Serves `handler` with the given listener settings until Ctrl+C or
/// SIGTERM, then drains open connections within the configured timeout.
///
/// # Examples
///
/// ```no_run
/// use ripple::conf::Settings;
/// use ripple::dispatch::DispatcherHandler;
/// use std::sync::Arc;
///
/// # async fn example() -> ripple::core::Result<()> {
/// let settings = Settings::from_env().unwrap();
/// let dispatcher = DispatcherHandler::builder().build();
/// ripple::server::serve_with_settings(&settings.server, Arc::new(dispatcher)).await?;
/// # Ok(())
/// # }
/// ```
#[cfg(all(feature = "server", feature = "conf"))]
pub async fn serve_with_settings(
	settings: &ripple_conf::ServerSettings,
	handler: Arc<dyn HttpHandler>,
) -> Result<()> {
	let addr = settings
		.addr()
		.map_err(|e| Error::Internal(e.to_string()))?;
	let coordinator = ShutdownCoordinator::new(settings.shutdown_timeout());

	let trigger = coordinator.clone();
	tokio::spawn(async move {
		shutdown_signal().await;
		trigger.shutdown();
	});

	serve_with_shutdown(addr, handler, coordinator).await
}
