//! Integration tests for DispatcherHandler
//!
//! Covers the dispatch state machine end to end over an in-memory transport:
//! - routing misses and mapping order
//! - ready and deferred handler outcomes
//! - failure propagation and result handler selection

use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, StatusCode};
use ripple_core::exception::{Error, Result};
use ripple_core::stream::Publisher;
use ripple_dispatch::{
	BytesResultHandler, DispatcherHandler, HandlerAdapter, HandlerMapping, HandlerOutcome, HandlerRef,
	HandlerResult, HandlerResultHandler, InvocableHandler, InvocableHandlerAdapter, PathHandlerMapping,
	StreamingResultHandler,
};
use ripple_http::{ServerHttpRequest, ServerHttpResponse};
use ripple_reactive::{Capabilities, CompositionConverter, ReturnValue};
use ripple_test::{MemoryTransport, counting_publisher, get};
use rstest::{fixture, rstest};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Marker handler claimed by [`ScriptedAdapter`].
struct Scripted;

/// Adapter that counts how often it is consulted and returns a fixed outcome.
struct ScriptedAdapter {
	supports_calls: Arc<AtomicUsize>,
	handle_calls: Arc<AtomicUsize>,
	outcome: Box<dyn Fn(&HandlerRef) -> Result<HandlerOutcome> + Send + Sync>,
}

impl ScriptedAdapter {
	fn new(outcome: impl Fn(&HandlerRef) -> Result<HandlerOutcome> + Send + Sync + 'static) -> Self {
		Self {
			supports_calls: Arc::new(AtomicUsize::new(0)),
			handle_calls: Arc::new(AtomicUsize::new(0)),
			outcome: Box::new(outcome),
		}
	}
}

impl HandlerAdapter for ScriptedAdapter {
	fn supports(&self, handler: &HandlerRef) -> bool {
		self.supports_calls.fetch_add(1, Ordering::SeqCst);
		handler.is::<Scripted>()
	}

	fn handle(
		&self,
		_request: &ServerHttpRequest,
		_response: &mut ServerHttpResponse,
		handler: &HandlerRef,
	) -> Result<HandlerOutcome> {
		self.handle_calls.fetch_add(1, Ordering::SeqCst);
		(self.outcome)(handler)
	}
}

/// Result handler that records invocations and writes nothing.
#[derive(Clone, Default)]
struct CountingResultHandler {
	calls: Arc<AtomicUsize>,
}

#[async_trait]
impl HandlerResultHandler for CountingResultHandler {
	fn supports(&self, _result: &HandlerResult) -> bool {
		true
	}

	async fn handle_result(
		&self,
		_request: &ServerHttpRequest,
		_response: &mut ServerHttpResponse,
		_result: HandlerResult,
	) -> Result<()> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		Ok(())
	}
}

#[derive(Debug)]
struct HandlerFailure;

impl fmt::Display for HandlerFailure {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("E")
	}
}

impl std::error::Error for HandlerFailure {}

fn scripted_mapping(path: &str) -> PathHandlerMapping {
	PathHandlerMapping::new().route(Method::GET, path, HandlerRef::new("scripted", Scripted))
}

fn ready(handler: &HandlerRef, value: ReturnValue) -> Result<HandlerOutcome> {
	Ok(HandlerOutcome::Ready(HandlerResult::new(handler.clone(), value)))
}

#[fixture]
fn converter() -> CompositionConverter {
	CompositionConverter::new(Capabilities::all())
}

#[rstest]
#[tokio::test]
async fn test_missing_route_is_not_found_without_failure() {
	// Arrange
	let dispatcher = DispatcherHandler::builder()
		.mapping(scripted_mapping("/present"))
		.adapter(ScriptedAdapter::new(|h| ready(h, ReturnValue::new("unused"))))
		.result_handler(BytesResultHandler::new())
		.build();
	let (mut response, transport) = MemoryTransport::response();

	// Act
	let outcome = dispatcher.dispatch(&get("/missing"), &mut response).await;
	response.set_complete().await.unwrap();

	// Assert
	assert!(outcome.is_ok());
	let captured = transport.captured();
	assert_eq!(captured.status, Some(StatusCode::NOT_FOUND));
	assert!(captured.body().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_no_mappings_at_all_is_not_found() {
	let dispatcher = DispatcherHandler::builder().build();
	let (mut response, _) = MemoryTransport::response();

	dispatcher.dispatch(&get("/missing"), &mut response).await.unwrap();

	assert_eq!(response.status(), Some(StatusCode::NOT_FOUND));
}

#[rstest]
#[tokio::test]
async fn test_ready_result_is_written_by_result_handler() {
	// Arrange
	let dispatcher = DispatcherHandler::builder()
		.mapping(scripted_mapping("/ok"))
		.adapter(ScriptedAdapter::new(|h| ready(h, ReturnValue::new("ok"))))
		.result_handler(BytesResultHandler::new())
		.build();
	let (mut response, transport) = MemoryTransport::response();

	// Act
	dispatcher.dispatch(&get("/ok"), &mut response).await.unwrap();

	// Assert
	let captured = transport.captured();
	assert_eq!(captured.status, Some(StatusCode::OK));
	assert_eq!(captured.body_text(), "ok");
}

#[rstest]
#[tokio::test]
async fn test_only_the_first_supporting_adapter_is_consulted() {
	// Arrange
	let first = ScriptedAdapter::new(|h| ready(h, ReturnValue::new("first")));
	let second = ScriptedAdapter::new(|h| ready(h, ReturnValue::new("second")));
	let (second_supports, second_handles) = (second.supports_calls.clone(), second.handle_calls.clone());
	let first_handles = first.handle_calls.clone();
	let dispatcher = DispatcherHandler::builder()
		.mapping(scripted_mapping("/one"))
		.adapter(first)
		.adapter(second)
		.result_handler(BytesResultHandler::new())
		.build();
	let (mut response, transport) = MemoryTransport::response();

	// Act
	dispatcher.dispatch(&get("/one"), &mut response).await.unwrap();

	// Assert
	assert_eq!(first_handles.load(Ordering::SeqCst), 1);
	assert_eq!(second_supports.load(Ordering::SeqCst), 0);
	assert_eq!(second_handles.load(Ordering::SeqCst), 0);
	assert_eq!(transport.captured().body_text(), "first");
}

#[rstest]
#[tokio::test]
async fn test_deferred_result_consumes_a_single_value() {
	// Arrange
	let produced = Arc::new(parking_lot::Mutex::new(None));
	let produced_slot = produced.clone();
	let adapter = ScriptedAdapter::new(move |h| {
		let results = vec![
			HandlerResult::new(h.clone(), ReturnValue::new("one")),
			HandlerResult::new(h.clone(), ReturnValue::new("two")),
			HandlerResult::new(h.clone(), ReturnValue::new("three")),
		];
		let (publisher, counter) = counting_publisher(results);
		*produced_slot.lock() = Some(counter);
		Ok(HandlerOutcome::Deferred(publisher))
	});
	let result_handler = CountingResultHandler::default();
	let dispatcher = DispatcherHandler::builder()
		.mapping(scripted_mapping("/three"))
		.adapter(adapter)
		.result_handler(result_handler.clone())
		.build();
	let (mut response, _) = MemoryTransport::response();

	// Act
	dispatcher.dispatch(&get("/three"), &mut response).await.unwrap();

	// Assert
	let counter = produced.lock().clone().unwrap();
	assert_eq!(counter.get(), 1);
	assert_eq!(result_handler.calls.load(Ordering::SeqCst), 1);
}

#[rstest]
#[tokio::test]
async fn test_async_failure_reaches_caller_once_without_result_handler() {
	// Arrange
	let result_handler = CountingResultHandler::default();
	let dispatcher = DispatcherHandler::builder()
		.mapping(scripted_mapping("/fail"))
		.adapter(ScriptedAdapter::new(|_| {
			Ok(HandlerOutcome::Deferred(Publisher::error(Error::handler(HandlerFailure))))
		}))
		.result_handler(result_handler.clone())
		.build();
	let (mut response, transport) = MemoryTransport::response();

	// Act
	let outcome = dispatcher.dispatch(&get("/fail"), &mut response).await;

	// Assert
	let error = outcome.unwrap_err();
	assert!(error.as_handler_error().unwrap().is::<HandlerFailure>());
	assert_eq!(error.to_string(), "E");
	assert_eq!(result_handler.calls.load(Ordering::SeqCst), 0);
	assert!(!response.is_committed());
	assert!(!transport.captured().is_committed());
}

#[rstest]
#[tokio::test]
async fn test_empty_deferred_result_completes_without_result_handler() {
	let result_handler = CountingResultHandler::default();
	let dispatcher = DispatcherHandler::builder()
		.mapping(scripted_mapping("/empty"))
		.adapter(ScriptedAdapter::new(|_| Ok(HandlerOutcome::Deferred(Publisher::empty()))))
		.result_handler(result_handler.clone())
		.build();
	let (mut response, _) = MemoryTransport::response();

	let outcome = dispatcher.dispatch(&get("/empty"), &mut response).await;

	assert!(outcome.is_ok());
	assert_eq!(result_handler.calls.load(Ordering::SeqCst), 0);
}

#[rstest]
#[tokio::test]
async fn test_unsupported_handler_fails() {
	let dispatcher = DispatcherHandler::builder()
		.mapping(PathHandlerMapping::new().route(Method::GET, "/x", HandlerRef::new("plain-number", 5u8)))
		.adapter(ScriptedAdapter::new(|h| ready(h, ReturnValue::new("never"))))
		.build();
	let (mut response, _) = MemoryTransport::response();

	let outcome = dispatcher.dispatch(&get("/x"), &mut response).await;

	assert!(matches!(outcome, Err(Error::UnsupportedHandler(name)) if name == "plain-number"));
}

#[rstest]
#[tokio::test]
async fn test_unsupported_result_fails() {
	let dispatcher = DispatcherHandler::builder()
		.mapping(scripted_mapping("/n"))
		.adapter(ScriptedAdapter::new(|h| ready(h, ReturnValue::new(42u64))))
		.result_handler(BytesResultHandler::new())
		.build();
	let (mut response, _) = MemoryTransport::response();

	let outcome = dispatcher.dispatch(&get("/n"), &mut response).await;

	assert!(matches!(outcome, Err(Error::UnsupportedResult(name)) if name == "u64"));
}

#[rstest]
#[tokio::test]
async fn test_adapter_panic_is_a_failure_signal() {
	let dispatcher = DispatcherHandler::builder()
		.mapping(scripted_mapping("/panic"))
		.adapter(ScriptedAdapter::new(|_| panic!("adapter exploded")))
		.result_handler(BytesResultHandler::new())
		.build();
	let (mut response, _) = MemoryTransport::response();

	let outcome = dispatcher.dispatch(&get("/panic"), &mut response).await;

	assert!(matches!(outcome, Err(Error::HandlerPanicked(message)) if message == "adapter exploded"));
}

#[rstest]
#[tokio::test]
async fn test_lower_order_mapping_wins_regardless_of_registration() {
	// Arrange
	let late_but_first = PathHandlerMapping::new()
		.route(Method::GET, "/dup", InvocableHandler::new(|_| Ok("preferred")).into_ref("preferred"))
		.with_order(-1);
	let early = PathHandlerMapping::new()
		.route(Method::GET, "/dup", InvocableHandler::new(|_| Ok("fallback")).into_ref("fallback"));
	let dispatcher = DispatcherHandler::builder()
		.mapping(early)
		.mapping(late_but_first)
		.adapter(InvocableHandlerAdapter::new(converter()))
		.result_handler(BytesResultHandler::new())
		.build();
	let (mut response, transport) = MemoryTransport::response();

	// Act
	dispatcher.dispatch(&get("/dup"), &mut response).await.unwrap();

	// Assert
	assert_eq!(transport.captured().body_text(), "preferred");
}

#[rstest]
#[tokio::test]
async fn test_tokio_oneshot_handler_result(converter: CompositionConverter) {
	// Arrange
	let handler = InvocableHandler::deferred::<String, _, _>(|request| {
		let (sender, receiver) = tokio::sync::oneshot::channel();
		let greeting = format!("hello {}", request.path());
		tokio::spawn(async move {
			let _ = sender.send(greeting);
		});
		Ok(receiver)
	});
	let dispatcher = DispatcherHandler::builder()
		.mapping(PathHandlerMapping::new().route(Method::GET, "/greet", handler.into_ref("greet")))
		.adapter(InvocableHandlerAdapter::new(converter))
		.result_handler(BytesResultHandler::new())
		.build();
	let (mut response, transport) = MemoryTransport::response();

	// Act
	dispatcher.dispatch(&get("/greet"), &mut response).await.unwrap();

	// Assert
	assert_eq!(transport.captured().body_text(), "hello /greet");
}

#[rstest]
#[tokio::test]
async fn test_streaming_publisher_result(converter: CompositionConverter) {
	// Arrange
	let handler = InvocableHandler::new(|_| {
		Ok(Publisher::from_iter(vec![Bytes::from("chunk-1;"), Bytes::from("chunk-2")]))
	});
	let dispatcher = DispatcherHandler::builder()
		.mapping(PathHandlerMapping::new().route(Method::GET, "/stream", handler.into_ref("stream")))
		.adapter(InvocableHandlerAdapter::new(converter))
		.result_handler(BytesResultHandler::new())
		.result_handler(StreamingResultHandler::new())
		.build();
	let (mut response, transport) = MemoryTransport::response();

	// Act
	dispatcher.dispatch(&get("/stream"), &mut response).await.unwrap();

	// Assert
	let captured = transport.captured();
	assert_eq!(captured.chunks.len(), 2);
	assert_eq!(captured.body_text(), "chunk-1;chunk-2");
}

#[rstest]
#[tokio::test]
async fn test_synchronous_handler_error_is_propagated(converter: CompositionConverter) {
	let handler = InvocableHandler::new(|_| -> Result<&'static str> { Err(Error::handler(HandlerFailure)) });
	let dispatcher = DispatcherHandler::builder()
		.mapping(PathHandlerMapping::new().route(Method::GET, "/sync-fail", handler.into_ref("sync-fail")))
		.adapter(InvocableHandlerAdapter::new(converter))
		.result_handler(BytesResultHandler::new())
		.build();
	let (mut response, _) = MemoryTransport::response();

	let outcome = dispatcher.dispatch(&get("/sync-fail"), &mut response).await;

	assert_eq!(outcome.unwrap_err().to_string(), "E");
}
