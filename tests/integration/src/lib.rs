//! Integration test utilities for Ripple
//!
//! Starts a real [`HttpServer`] on an ephemeral port and talks to it with
//! [`HttpClient`].

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode, Uri};
use ripple_core::exception::Result;
use ripple_core::stream::Publisher;
use ripple_dispatch::{
	BytesResultHandler, DispatcherHandler, HandlerRef, InvocableHandlerAdapter, PathHandlerMapping,
	StreamingResultHandler,
};
use ripple_http::{ClientHttpRequest, HttpHandler};
use ripple_reactive::CompositionConverter;
use ripple_server::{HttpClient, HttpServer, ShutdownCoordinator};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Server bound to `127.0.0.1` on an ephemeral port.
pub struct TestServer {
	pub addr: SocketAddr,
	coordinator: ShutdownCoordinator,
	task: JoinHandle<Result<()>>,
}

impl TestServer {
	pub async fn start(handler: Arc<dyn HttpHandler>) -> Self {
		let listener = TcpListener::bind("127.0.0.1:0")
			.await
			.expect("Failed to bind test listener");
		let addr = listener.local_addr().expect("Failed to read local address");
		let coordinator = ShutdownCoordinator::new(Duration::from_secs(2));
		let task = tokio::spawn(HttpServer::new(handler).serve_listener(listener, coordinator.clone()));
		Self {
			addr,
			coordinator,
			task,
		}
	}

	pub fn uri(&self, path: &str) -> Uri {
		format!("http://{}{}", self.addr, path)
			.parse()
			.expect("Invalid test URI")
	}

	/// Sends a request and collects the whole response.
	pub async fn send(&self, method: Method, path: &str, body: Option<&str>) -> Reply {
		let mut request = ClientHttpRequest::new(method, self.uri(path));
		if let Some(body) = body {
			request
				.write_with(Publisher::just(Bytes::from(body.to_string())))
				.expect("Failed to attach request body");
		}
		let mut response = HttpClient::new()
			.execute(request)
			.await
			.expect("Request failed");
		Reply {
			status: response.status(),
			headers: response.headers().clone(),
			body: response.bytes().await.expect("Failed to read response body"),
		}
	}

	pub async fn get(&self, path: &str) -> Reply {
		self.send(Method::GET, path, None).await
	}

	/// Requests shutdown and waits for the server to drain.
	pub async fn shutdown(self) -> Result<()> {
		self.coordinator.shutdown();
		self.task.await.expect("Server task panicked")
	}
}

/// Fully collected response.
#[derive(Debug)]
pub struct Reply {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
}

impl Reply {
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}

/// Dispatcher over `routes` with the reference adapter and result handlers.
pub fn dispatcher(converter: CompositionConverter, routes: Vec<(Method, &str, HandlerRef)>) -> DispatcherHandler {
	let mapping = routes
		.into_iter()
		.fold(PathHandlerMapping::new(), |mapping, (method, path, handler)| {
			mapping.route(method, path, handler)
		});
	DispatcherHandler::builder()
		.mapping(mapping)
		.adapter(InvocableHandlerAdapter::new(converter))
		.result_handler(BytesResultHandler::new())
		.result_handler(StreamingResultHandler::new())
		.build()
}
