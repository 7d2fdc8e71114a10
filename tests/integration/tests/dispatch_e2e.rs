//! End-to-end dispatch over a real TCP socket
//!
//! Covers:
//! - ready text results and routing misses
//! - deferred results from `futures` and tokio sources
//! - request bodies consumed by a deferred handler
//! - streamed publisher bodies
//! - failures and unsupported results rendered by the transport bridge
//! - graceful shutdown after traffic

use bytes::Bytes;
use futures::future::BoxFuture;
use http::header::CONTENT_TYPE;
use http::{Method, StatusCode};
use ripple_core::exception::{BoxError, Error};
use ripple_core::stream::Publisher;
use ripple_dispatch::InvocableHandler;
use ripple_integration_tests::{TestServer, dispatcher};
use ripple_reactive::{CompositionConverter, FallibleFuture};
use ripple_test::converter;
use rstest::rstest;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[rstest]
#[tokio::test]
async fn test_ready_text_result(converter: CompositionConverter) {
	// Arrange
	let hello = InvocableHandler::new(|_| Ok("Hello, Ripple!")).into_ref("hello");
	let server = TestServer::start(Arc::new(dispatcher(converter, vec![(Method::GET, "/", hello)]))).await;

	// Act
	let reply = server.get("/").await;

	// Assert
	assert_eq!(reply.status, StatusCode::OK);
	assert_eq!(reply.headers[CONTENT_TYPE], "text/plain; charset=utf-8");
	assert_eq!(reply.text(), "Hello, Ripple!");
}

#[rstest]
#[case(Method::GET, "/missing")]
#[case(Method::POST, "/")]
#[tokio::test]
async fn test_unmatched_request_is_not_found(
	converter: CompositionConverter,
	#[case] method: Method,
	#[case] path: &str,
) {
	// Arrange
	let hello = InvocableHandler::new(|_| Ok("hello")).into_ref("hello");
	let server = TestServer::start(Arc::new(dispatcher(converter, vec![(Method::GET, "/", hello)]))).await;

	// Act
	let reply = server.send(method, path, None).await;

	// Assert
	assert_eq!(reply.status, StatusCode::NOT_FOUND);
	assert!(reply.body.is_empty());
}

#[rstest]
#[tokio::test]
async fn test_deferred_future_result(converter: CompositionConverter) {
	// Arrange
	let later = InvocableHandler::deferred::<String, _, _>(|request| {
		let path = request.path().to_string();
		let future: BoxFuture<'static, String> = Box::pin(async move {
			tokio::task::yield_now().await;
			format!("resolved {path}")
		});
		Ok(future)
	})
	.into_ref("later");
	let server = TestServer::start(Arc::new(dispatcher(converter, vec![(Method::GET, "/later", later)]))).await;

	// Act
	let reply = server.get("/later").await;

	// Assert
	assert_eq!(reply.status, StatusCode::OK);
	assert_eq!(reply.text(), "resolved /later");
}

#[rstest]
#[tokio::test]
async fn test_deferred_tokio_channel_result(converter: CompositionConverter) {
	// Arrange
	let task = InvocableHandler::deferred::<String, _, _>(|_| {
		let (sender, receiver) = tokio::sync::oneshot::channel();
		tokio::spawn(async move {
			let _ = sender.send("from a task".to_string());
		});
		Ok(receiver)
	})
	.into_ref("task");
	let server = TestServer::start(Arc::new(dispatcher(converter, vec![(Method::GET, "/task", task)]))).await;

	// Act
	let reply = server.get("/task").await;

	// Assert
	assert_eq!(reply.status, StatusCode::OK);
	assert_eq!(reply.text(), "from a task");
}

#[rstest]
#[tokio::test]
async fn test_deferred_stream_consumes_first_value_only(converter: CompositionConverter) {
	// Arrange
	let produced = Arc::new(AtomicUsize::new(0));
	let counter = produced.clone();
	let first = InvocableHandler::deferred::<String, _, _>(move |_| {
		let counter = counter.clone();
		Ok(Publisher::from_iter((0..100).map(move |i| {
			counter.fetch_add(1, Ordering::SeqCst);
			format!("value-{i}")
		})))
	})
	.into_ref("first");
	let server = TestServer::start(Arc::new(dispatcher(converter, vec![(Method::GET, "/first", first)]))).await;

	// Act
	let reply = server.get("/first").await;

	// Assert
	assert_eq!(reply.text(), "value-0");
	assert_eq!(produced.load(Ordering::SeqCst), 1);
}

#[rstest]
#[tokio::test]
async fn test_request_body_is_echoed(converter: CompositionConverter) {
	// Arrange
	let echo = InvocableHandler::deferred::<Bytes, _, _>(|request| {
		let body = request.take_body().unwrap_or_else(Publisher::empty);
		let future: FallibleFuture<Bytes> = Box::pin(async move {
			let chunks = body.collect().await.map_err(|e| Box::new(e) as BoxError)?;
			Ok(Some(Bytes::from(chunks.concat())))
		});
		Ok(future)
	})
	.into_ref("echo");
	let server = TestServer::start(Arc::new(dispatcher(converter, vec![(Method::POST, "/echo", echo)]))).await;

	// Act
	let reply = server.send(Method::POST, "/echo", Some("ping pong")).await;

	// Assert
	assert_eq!(reply.status, StatusCode::OK);
	assert_eq!(reply.headers[CONTENT_TYPE], "application/octet-stream");
	assert_eq!(reply.text(), "ping pong");
}

#[rstest]
#[tokio::test]
async fn test_streamed_body(converter: CompositionConverter) {
	// Arrange
	let stream = InvocableHandler::new(|_| {
		Ok(Publisher::from_iter(
			(1..=3).map(|i| Bytes::from(format!("line {i}\n"))),
		))
	})
	.into_ref("stream");
	let server = TestServer::start(Arc::new(dispatcher(converter, vec![(Method::GET, "/stream", stream)]))).await;

	// Act
	let reply = server.get("/stream").await;

	// Assert
	assert_eq!(reply.status, StatusCode::OK);
	assert_eq!(reply.text(), "line 1\nline 2\nline 3\n");
}

#[rstest]
#[tokio::test]
async fn test_empty_deferred_result_completes_empty(converter: CompositionConverter) {
	// Arrange
	let nothing = InvocableHandler::deferred::<String, _, _>(|_| {
		let future: FallibleFuture<String> = Box::pin(async { Ok(None) });
		Ok(future)
	})
	.into_ref("nothing");
	let server = TestServer::start(Arc::new(dispatcher(converter, vec![(Method::GET, "/nothing", nothing)]))).await;

	// Act
	let reply = server.get("/nothing").await;

	// Assert
	assert_eq!(reply.status, StatusCode::OK);
	assert!(reply.body.is_empty());
}

#[rstest]
#[tokio::test]
async fn test_handler_failure_is_server_error(converter: CompositionConverter) {
	// Arrange
	let broken = InvocableHandler::new(|_| -> ripple_core::Result<&'static str> {
		Err(Error::handler(std::io::Error::other("database offline")))
	})
	.into_ref("broken");
	let late = InvocableHandler::deferred::<String, _, _>(|_| {
		let future: FallibleFuture<String> = Box::pin(async { Err("late failure".into()) });
		Ok(future)
	})
	.into_ref("late");
	let server = TestServer::start(Arc::new(dispatcher(
		converter,
		vec![(Method::GET, "/broken", broken), (Method::GET, "/late", late)],
	)))
	.await;

	// Act
	let immediate = server.get("/broken").await;
	let deferred = server.get("/late").await;

	// Assert
	assert_eq!(immediate.status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(deferred.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[rstest]
#[tokio::test]
async fn test_unsupported_result_is_server_error(converter: CompositionConverter) {
	// Arrange
	let number = InvocableHandler::new(|_| Ok(42_u32)).into_ref("number");
	let server = TestServer::start(Arc::new(dispatcher(converter, vec![(Method::GET, "/number", number)]))).await;

	// Act
	let reply = server.get("/number").await;

	// Assert
	assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[rstest]
#[tokio::test]
async fn test_shutdown_after_traffic(converter: CompositionConverter) {
	// Arrange
	let hello = InvocableHandler::new(|_| Ok("hello")).into_ref("hello");
	let server = TestServer::start(Arc::new(dispatcher(converter, vec![(Method::GET, "/", hello)]))).await;
	for _ in 0..3 {
		assert_eq!(server.get("/").await.status, StatusCode::OK);
	}

	// Act
	let result = server.shutdown().await;

	// Assert
	assert!(result.is_ok());
}
