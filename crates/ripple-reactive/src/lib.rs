//! # Ripple Reactive
//!
//! Bridges between Ripple's [`Publisher`](ripple_core::stream::Publisher) and
//! the asynchronous types of third-party libraries.
//!
//! ## Modules
//!
//! - [`capability`]: which libraries can be bridged in this process
//! - [`descriptor`]: runtime type identity and type-erased return values
//! - [`converter`]: the per-library adapter contract
//! - [`adapters`]: built-in `futures` and `tokio` adapters
//! - [`composition`]: priority-ordered facade over the adapters
//!
//! ## Feature Flags
//!
//! - `futures-adapter` (default): `futures` streams, futures and channels
//! - `tokio-adapter` (default): tokio channels and tasks, requires `tokio-stream`
//! - `tokio-stream` (default): tokio channel-to-stream bridge

pub mod adapters;
pub mod capability;
pub mod composition;
pub mod converter;
pub mod descriptor;

pub use capability::Capabilities;
pub use composition::CompositionConverter;
pub use converter::PublisherConverter;
pub use descriptor::{ReturnValue, TypeDescriptor};

#[cfg(feature = "futures-adapter")]
pub use adapters::{FallibleFuture, FallibleStream};
#[cfg(all(feature = "tokio-adapter", feature = "tokio-stream"))]
pub use adapters::{ResultOneshot, ResultReceiver};

/// Default buffer size of channels fed from a publisher.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;
