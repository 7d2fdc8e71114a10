//! Facade over the registered adapters.

use crate::capability::Capabilities;
use crate::converter::PublisherConverter;
use crate::descriptor::{ReturnValue, TypeDescriptor};
use ripple_core::exception::{Error, Result};
use ripple_core::stream::Publisher;
use std::any::Any;
use std::sync::OnceLock;

#[cfg(feature = "futures-adapter")]
use crate::adapters::FuturesConverter;
#[cfg(all(feature = "tokio-adapter", feature = "tokio-stream"))]
use crate::adapters::TokioConverter;

static GLOBAL: OnceLock<CompositionConverter> = OnceLock::new();

/// Adapters registered with a [`CompositionConverter`].
///
/// Converter methods are generic over the element type, so the registry is a
/// closed set rather than a list of trait objects.
#[derive(Debug, Clone, Copy)]
enum Adapter {
	#[cfg(feature = "futures-adapter")]
	Futures(FuturesConverter),
	#[cfg(all(feature = "tokio-adapter", feature = "tokio-stream"))]
	Tokio(TokioConverter),
}

macro_rules! with_adapter {
	($adapter:expr, $converter:ident => $body:expr) => {
		match *$adapter {
			#[cfg(feature = "futures-adapter")]
			Adapter::Futures($converter) => $body,
			#[cfg(all(feature = "tokio-adapter", feature = "tokio-stream"))]
			Adapter::Tokio($converter) => $body,
		}
	};
}

impl Adapter {
	fn name(&self) -> &'static str {
		with_adapter!(self, converter => converter.name())
	}

	fn can_convert<T: Send + 'static>(&self, source: TypeDescriptor, target: TypeDescriptor) -> bool {
		with_adapter!(self, converter => converter.can_convert::<T>(source, target))
	}

	fn convert<T: Send + 'static>(&self, source: ReturnValue, target: TypeDescriptor) -> Result<ReturnValue> {
		with_adapter!(self, converter => converter.convert::<T>(source, target))
	}
}

/// Converts handler return values between [`Publisher`] and the asynchronous
/// types of every detected library.
///
/// Adapters are consulted in a fixed order (`futures`, then `tokio`) and the
/// first one claiming a type pair performs the conversion.
///
/// # Examples
///
/// ```
/// use ripple_core::stream::Publisher;
/// use ripple_reactive::{Capabilities, CompositionConverter, ReturnValue};
///
/// let converter = CompositionConverter::new(Capabilities::all());
///
/// // A publisher needs no conversion.
/// let publisher = converter
///     .to_publisher::<u8>(ReturnValue::new(Publisher::just(1u8)))
///     .unwrap();
/// # drop(publisher);
/// ```
#[derive(Debug, Clone)]
pub struct CompositionConverter {
	adapters: Vec<Adapter>,
}

impl CompositionConverter {
	/// Registers the adapters enabled by `capabilities` with the default
	/// channel capacity.
	pub fn new(capabilities: Capabilities) -> Self {
		Self::with_channel_capacity(capabilities, crate::DEFAULT_CHANNEL_CAPACITY)
	}

	pub fn with_channel_capacity(capabilities: Capabilities, channel_capacity: usize) -> Self {
		let mut adapters = Vec::new();

		#[cfg(feature = "futures-adapter")]
		if capabilities.has_futures() {
			adapters.push(Adapter::Futures(FuturesConverter::new()));
		}

		#[cfg(all(feature = "tokio-adapter", feature = "tokio-stream"))]
		if capabilities.has_tokio() && capabilities.has_tokio_stream_bridge() {
			adapters.push(Adapter::Tokio(TokioConverter::new(channel_capacity)));
		}

		#[cfg(not(all(feature = "tokio-adapter", feature = "tokio-stream")))]
		let _ = channel_capacity;

		let converter = Self { adapters };
		tracing::debug!(adapters = ?converter.adapter_names(), "registered reactive adapters");
		converter
	}

	/// Process-wide converter built from [`Capabilities::global`] on first use.
	pub fn global() -> &'static Self {
		GLOBAL.get_or_init(|| Self::new(Capabilities::global()))
	}

	/// Pins the process-wide converter. Fails once it has been initialised.
	pub fn install(converter: Self) -> Result<()> {
		GLOBAL
			.set(converter)
			.map_err(|_| Error::Internal("composition converter is already initialised".to_string()))
	}

	/// Names of the registered adapters, in priority order.
	pub fn adapter_names(&self) -> Vec<&'static str> {
		self.adapters.iter().map(Adapter::name).collect()
	}

	/// Whether `source` can be turned into `target` for element type `T`.
	pub fn can_convert<T: Send + 'static>(&self, source: TypeDescriptor, target: TypeDescriptor) -> bool {
		source == target
			|| self
				.adapters
				.iter()
				.any(|adapter| adapter.can_convert::<T>(source, target))
	}

	/// Converts `source` into a value of type `target`.
	///
	/// An absent source is treated as an empty `Publisher<T>`. A source that
	/// already has the target type is returned unchanged.
	pub fn convert<T: Send + 'static>(&self, source: ReturnValue, target: TypeDescriptor) -> Result<ReturnValue> {
		let source = if source.is_absent() {
			ReturnValue::new(Publisher::<T>::empty())
		} else {
			source
		};
		let source_type = source.descriptor();
		if source_type == target {
			return Ok(source);
		}

		match self
			.adapters
			.iter()
			.find(|adapter| adapter.can_convert::<T>(source_type, target))
		{
			Some(adapter) => {
				tracing::trace!(adapter = adapter.name(), source = %source_type, target = %target, "converting");
				adapter.convert::<T>(source, target)
			}
			None => {
				tracing::warn!(source = %source_type, target = %target, "no adapter for conversion");
				Err(Error::unsupported_conversion(source_type.name(), target.name()))
			}
		}
	}

	/// Normalises any supported return value into a `Publisher<T>`.
	pub fn to_publisher<T: Send + 'static>(&self, source: ReturnValue) -> Result<Publisher<T>> {
		self.convert::<T>(source, TypeDescriptor::of::<Publisher<T>>())?
			.downcast::<Publisher<T>>()
			.map_err(|value| {
				Error::Conversion(format!("expected a publisher, adapter produced {}", value.descriptor()))
			})
	}

	/// Turns a publisher into the third-party type `R`.
	pub fn from_publisher<T, R>(&self, publisher: Publisher<T>) -> Result<R>
	where
		T: Send + 'static,
		R: Any + Send,
	{
		let target = TypeDescriptor::of::<R>();
		self.convert::<T>(ReturnValue::new(publisher), target)?
			.downcast::<R>()
			.map_err(|value| Error::Conversion(format!("expected {target}, adapter produced {}", value.descriptor())))
	}
}
