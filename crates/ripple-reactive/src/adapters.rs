//! Built-in adapters, one per bridged library.

#[cfg(feature = "futures-adapter")]
mod futures;
#[cfg(all(feature = "tokio-adapter", feature = "tokio-stream"))]
mod tokio;

#[cfg(feature = "futures-adapter")]
pub use self::futures::{FallibleFuture, FallibleStream, FuturesConverter};
#[cfg(all(feature = "tokio-adapter", feature = "tokio-stream"))]
pub use self::tokio::{ResultOneshot, ResultReceiver, TokioConverter};
