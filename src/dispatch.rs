//! Dispatcher and its collaborator contracts.

pub use ripple_dispatch::*;
