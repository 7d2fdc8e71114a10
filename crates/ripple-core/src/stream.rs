//! Neutral asynchronous stream contract.
//!
//! A [`Publisher`] produces zero or more values followed by at most one
//! terminal signal. Consumers either subscribe with a [`Subscriber`] and drive
//! delivery with explicit demand, or pull values through
//! [`Publisher::into_stream`].

mod publisher;
mod subscriber;
mod subscription;

pub use publisher::{Publisher, Subscribed};
pub use subscriber::Subscriber;
pub use subscription::{Subscription, UNBOUNDED};

/// Neutral byte buffer carried by request and response bodies.
pub type DataBuffer = bytes::Bytes;

/// Publisher of body chunks.
pub type BufferPublisher = Publisher<DataBuffer>;
