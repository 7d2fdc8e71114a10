//! # Ripple Test
//!
//! Utilities for testing code built on Ripple.
//!
//! - [`transport`]: a response transport that records into memory
//! - [`http`]: request construction helpers
//! - [`publisher`]: counting publishers and recording subscribers
//! - [`fixtures`]: rstest fixtures

pub mod fixtures;
pub mod http;
pub mod publisher;
pub mod transport;

pub use fixtures::{converter, memory_transport};
pub use self::http::{create_request, get};
pub use publisher::{ProducedCounter, RecordingSubscriber, Signal, counting_publisher};
pub use transport::{CapturedResponse, MemoryTransport};
