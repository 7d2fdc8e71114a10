//! Error taxonomy shared by every Ripple crate.
//!
//! All fatal conditions of a dispatch travel through the same [`Error`] type so
//! the caller observes a single failure channel. The only self-handled outcome,
//! "no handler found", is not an error and therefore has no variant here.

use thiserror::Error;

/// Boxed error type produced by third-party asynchronous sources and handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for Ripple operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the dispatch core, its adapters and the transport bridge
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
	/// No handler adapter claims the resolved handler
	#[error("No HandlerAdapter for {0}")]
	UnsupportedHandler(String),

	/// No result handler claims the produced handler result
	#[error("No HandlerResultHandler for {0}")]
	UnsupportedResult(String),

	/// No reactive-type adapter claims the requested type pair
	#[error("Source of type [{source_type}] cannot be converted to type [{target_type}]")]
	UnsupportedConversion {
		source_type: String,
		target_type: String,
	},

	/// A conversion was claimed by an adapter but could not be carried out
	#[error("Conversion error: {0}")]
	Conversion(String),

	/// The handler (or its asynchronous result) signalled a failure.
	///
	/// The inner error is the one produced by the handler, untouched.
	#[error("{0}")]
	Handler(BoxError),

	/// The handler panicked while being invoked
	#[error("Handler panicked: {0}")]
	HandlerPanicked(String),

	/// A publisher panicked while producing a value
	#[error("Publisher panicked: {0}")]
	ProducerPanicked(String),

	/// A subscriber requested a non-positive amount of values
	#[error("Invalid demand: {0} (must be positive)")]
	InvalidDemand(u64),

	/// The response was already committed when a write was attempted
	#[error("Response already committed")]
	ResponseCommitted,

	/// Failure reported by the network transport
	#[error("Transport error: {0}")]
	Transport(String),

	/// HTTP protocol building error
	#[error("HTTP error: {0}")]
	Http(#[from] http::Error),

	/// I/O error
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	/// Internal error
	#[error("Internal error: {0}")]
	Internal(String),
}

impl Error {
	/// Wraps an arbitrary handler error so it is propagated verbatim.
	pub fn handler<E>(error: E) -> Self
	where
		E: Into<BoxError>,
	{
		Error::Handler(error.into())
	}

	/// Builds an unsupported-conversion error from two type names.
	pub fn unsupported_conversion(source_type: impl Into<String>, target_type: impl Into<String>) -> Self {
		Error::UnsupportedConversion {
			source_type: source_type.into(),
			target_type: target_type.into(),
		}
	}

	/// HTTP status a wrapping layer should use when rendering this error.
	///
	/// The dispatch core itself never renders errors; this mapping is used by the
	/// transport bridge when a failure reaches it with the response still open.
	///
	/// # Examples
	///
	/// ```
	/// use ripple_core::exception::Error;
	///
	/// assert_eq!(Error::UnsupportedHandler("h".into()).status_code(), 500);
	/// assert_eq!(Error::InvalidDemand(0).status_code(), 500);
	/// ```
	pub fn status_code(&self) -> u16 {
		match self {
			Error::Transport(_) => 502,
			_ => 500,
		}
	}

	/// Returns the handler's own error when this is a handler failure.
	pub fn as_handler_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
		match self {
			Error::Handler(inner) => Some(inner.as_ref()),
			_ => None,
		}
	}
}

/// Renders a panic payload captured by `catch_unwind` as text.
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
	if let Some(message) = payload.downcast_ref::<&'static str>() {
		(*message).to_string()
	} else if let Some(message) = payload.downcast_ref::<String>() {
		message.clone()
	} else {
		"unknown panic payload".to_string()
	}
}
