//! Detection of the asynchronous libraries an adapter can bridge to.
//!
//! Detection runs once per process and is cached; startup code may pin the
//! flags explicitly with [`Capabilities::install`] before anything reads them.

use ripple_core::exception::{Error, Result};
use std::sync::OnceLock;

static GLOBAL: OnceLock<Capabilities> = OnceLock::new();

/// Availability flags for each bridgeable asynchronous library.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
	/// `futures` streams and futures can be bridged.
	pub futures: bool,
	/// Tokio channels and tasks can be bridged. Conversions that spawn a pump
	/// task check for a runtime when they run.
	pub tokio: bool,
	/// The tokio channel-to-stream bridge is compiled in.
	pub tokio_stream: bool,
}

impl Capabilities {
	/// Probes which adapter libraries are compiled into this build.
	///
	/// The result does not depend on the calling context, so it is safe to
	/// detect before a runtime is started.
	pub fn detect() -> Self {
		let detected = Self {
			futures: cfg!(feature = "futures-adapter"),
			tokio: cfg!(feature = "tokio-adapter"),
			tokio_stream: cfg!(feature = "tokio-stream"),
		};
		tracing::debug!(
			futures = detected.futures,
			tokio = detected.tokio,
			tokio_stream = detected.tokio_stream,
			"detected reactive capabilities"
		);
		detected
	}

	/// Every capability enabled, regardless of what is compiled in.
	pub fn all() -> Self {
		Self {
			futures: true,
			tokio: true,
			tokio_stream: true,
		}
	}

	/// Process-wide capabilities, detected on first access.
	pub fn global() -> Self {
		*GLOBAL.get_or_init(Self::detect)
	}

	/// Pins the process-wide capabilities.
	///
	/// Fails once the flags have been read or installed.
	pub fn install(capabilities: Self) -> Result<()> {
		GLOBAL
			.set(capabilities)
			.map_err(|_| Error::Internal("reactive capabilities are already initialised".to_string()))
	}

	/// Clears the flag belonging to `adapter` (`futures`, `tokio` or
	/// `tokio-stream`). Unknown names are ignored with a warning.
	pub fn without(mut self, adapter: &str) -> Self {
		match adapter {
			"futures" => self.futures = false,
			"tokio" => self.tokio = false,
			"tokio-stream" | "tokio_stream" => self.tokio_stream = false,
			other => tracing::warn!(adapter = other, "ignoring unknown reactive adapter name"),
		}
		self
	}

	pub fn has_futures(&self) -> bool {
		self.futures
	}

	pub fn has_tokio(&self) -> bool {
		self.tokio
	}

	pub fn has_tokio_stream_bridge(&self) -> bool {
		self.tokio_stream
	}
}
