//! Error taxonomy and the neutral async stream contract.
//!
//! # Examples
//!
//! ```
//! use ripple::core::{Error, Publisher};
//!
//! let failed: Publisher<u32> = Publisher::error(Error::Internal("offline".to_string()));
//! let values = Publisher::from_iter(vec![1, 2, 3]).map(|n| n * 10);
//! # let _ = (failed, values);
//! ```

pub use ripple_core::*;
