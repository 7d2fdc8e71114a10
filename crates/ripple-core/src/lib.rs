//! # Ripple Core
//!
//! Foundation types shared by every Ripple crate.
//!
//! ## Modules
//!
//! - [`exception`]: the single failure channel used across dispatch
//! - [`stream`]: lazy publishers with explicit demand and cancellation
//!
//! ## Example
//!
//! ```
//! use ripple_core::stream::Publisher;
//!
//! # futures::executor::block_on(async {
//! let first = Publisher::from_iter(vec!["a", "b"]).next().await.unwrap();
//! assert_eq!(first, Some("a"));
//! # });
//! ```

pub mod exception;
pub mod stream;

pub use exception::{BoxError, Error, Result};
pub use stream::{BufferPublisher, DataBuffer, Publisher, Subscriber, Subscription};
