//! Capability probe and reactive-type adapters.

pub use ripple_reactive::*;
