//! Testing utilities.

#[cfg(feature = "test")]
pub use ripple_test::*;
