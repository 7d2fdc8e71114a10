//! Log output initialisation.
//!
//! Library crates only emit `tracing` events; applications call [`init`] once
//! at startup to print them.

#[cfg(feature = "conf")]
use ripple_conf::LoggingSettings;
#[cfg(feature = "conf")]
use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(feature = "conf")]
use tracing_subscriber::prelude::*;
#[cfg(feature = "conf")]
use tracing_subscriber::{EnvFilter, fmt};

#[cfg(feature = "conf")]
static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Logging initialisation errors
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
	#[error("Invalid log filter '{filter}': {message}")]
	InvalidFilter { filter: String, message: String },
}

/// Installs a global `tracing` subscriber configured by `settings`.
///
/// Returns `Ok(true)` when this call installed the subscriber and `Ok(false)`
/// when one was already present, so calling it again is harmless.
///
/// # Examples
///
/// ```
/// use ripple::conf::LoggingSettings;
///
/// let settings = LoggingSettings {
///     filter: "info,ripple_dispatch=debug".to_string(),
///     json: false,
/// };
/// ripple::logging::init(&settings).unwrap();
/// assert!(!ripple::logging::init(&settings).unwrap());
/// ```
#[cfg(feature = "conf")]
pub fn init(settings: &LoggingSettings) -> Result<bool, LoggingError> {
	let filter = EnvFilter::try_new(&settings.filter).map_err(|e| LoggingError::InvalidFilter {
		filter: settings.filter.clone(),
		message: e.to_string(),
	})?;

	if INSTALLED.swap(true, Ordering::AcqRel) {
		return Ok(false);
	}

	let registry = tracing_subscriber::registry().with(filter);
	let installed = if settings.json {
		registry
			.with(fmt::layer().json().with_target(true).with_current_span(true))
			.try_init()
	} else {
		registry.with(fmt::layer().with_target(true)).try_init()
	};

	Ok(installed.is_ok())
}
