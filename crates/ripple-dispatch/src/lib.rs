//! # Ripple Dispatch
//!
//! Request dispatching for Ripple.
//!
//! ## Overview
//!
//! A [`DispatcherHandler`] processes one exchange in three steps:
//!
//! ```text
//! ServerHttpRequest → HandlerMapping → HandlerAdapter → HandlerResultHandler → ServerHttpResponse
//!                        (routing)        (invoking)         (resulting)
//! ```
//!
//! Each step consults its collaborators in order and uses the first that
//! matches. An adapter either returns a ready [`HandlerResult`] or a publisher
//! whose first value is the result; the dispatcher consumes at most one value
//! from it and cancels the rest.
//!
//! ## Reference collaborators
//!
//! - [`PathHandlerMapping`]: exact method and path table
//! - [`InvocableHandler`] with [`InvocableHandlerAdapter`]: closure handlers,
//!   asynchronous return values normalised through the
//!   [`CompositionConverter`](ripple_reactive::CompositionConverter)
//! - [`BytesResultHandler`] and [`StreamingResultHandler`]: body writers

pub mod adapter;
pub mod dispatcher;
pub mod handler;
pub mod mapping;
pub mod result;

pub use adapter::{HandlerAdapter, InvocableHandler, InvocableHandlerAdapter};
pub use dispatcher::{DispatchPhase, DispatcherHandler, DispatcherHandlerBuilder};
pub use handler::{HandlerOutcome, HandlerRef, HandlerResult};
pub use mapping::{HandlerMapping, MatchedPath, PathHandlerMapping};
pub use result::{BytesResultHandler, HandlerResultHandler, StreamingResultHandler};
