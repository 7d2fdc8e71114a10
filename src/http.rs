//! Server and client exchange model.

pub use ripple_http::*;
