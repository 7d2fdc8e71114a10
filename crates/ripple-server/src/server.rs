use crate::body::incoming_publisher;
use crate::shutdown::ShutdownCoordinator;
use crate::transport::{HyperResponseTransport, ResponseBody};
use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::Service;
use hyper_util::rt::TokioIo;
use ripple_core::exception::{BoxError, Result};
use ripple_http::{HttpHandler, ServerHttpRequest, ServerHttpResponse};
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;

/// Drain timeout used when no coordinator is supplied
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP/1.1 server running an [`HttpHandler`] for every request.
pub struct HttpServer {
	handler: Arc<dyn HttpHandler>,
}

impl HttpServer {
	/// # Examples
	///
	/// ```
	/// use std::sync::Arc;
	/// use ripple_server::HttpServer;
	/// use ripple_http::{HttpHandler, ServerHttpRequest, ServerHttpResponse};
	///
	/// struct Hello;
	///
	/// #[async_trait::async_trait]
	/// impl HttpHandler for Hello {
	///     async fn handle(
	///         &self,
	///         _request: &ServerHttpRequest,
	///         response: &mut ServerHttpResponse,
	///     ) -> ripple_core::Result<()> {
	///         response.set_complete().await
	///     }
	/// }
	///
	/// let server = HttpServer::new(Arc::new(Hello));
	/// ```
	pub fn new(handler: Arc<dyn HttpHandler>) -> Self {
		Self { handler }
	}

	/// Serves on `addr` until the process exits.
	pub async fn listen(self, addr: SocketAddr) -> Result<()> {
		self.listen_with_shutdown(addr, ShutdownCoordinator::new(DEFAULT_SHUTDOWN_TIMEOUT))
			.await
	}

	/// Serves on `addr` until `coordinator` requests shutdown.
	pub async fn listen_with_shutdown(self, addr: SocketAddr, coordinator: ShutdownCoordinator) -> Result<()> {
		let listener = TcpListener::bind(addr).await?;
		self.serve_listener(listener, coordinator).await
	}

	/// Serves connections accepted from an already bound `listener`.
	///
	/// On shutdown the listener stops accepting, open connections finish their
	/// in-flight request, and connections still open after the coordinator's
	/// timeout are aborted.
	pub async fn serve_listener(self, listener: TcpListener, coordinator: ShutdownCoordinator) -> Result<()> {
		let local_addr = listener.local_addr()?;
		tracing::info!(%local_addr, "server listening");

		let mut connections = JoinSet::new();

		loop {
			tokio::select! {
				accepted = listener.accept() => {
					let (stream, remote_addr) = match accepted {
						Ok(pair) => pair,
						Err(error) => {
							tracing::warn!(%error, "failed to accept connection");
							continue;
						}
					};
					let handler = self.handler.clone();
					let coordinator = coordinator.clone();
					connections.spawn(async move {
						if let Err(error) = Self::handle_connection(stream, remote_addr, handler, coordinator).await {
							tracing::debug!(%remote_addr, %error, "connection closed with error");
						}
					});
				}
				Some(_) = connections.join_next(), if !connections.is_empty() => {}
				_ = coordinator.signalled() => {
					tracing::info!(open_connections = connections.len(), "stopping server");
					break;
				}
			}
		}

		drop(listener);
		let drained = tokio::time::timeout(coordinator.timeout(), async {
			while connections.join_next().await.is_some() {}
		})
		.await;
		if drained.is_err() {
			tracing::warn!(remaining = connections.len(), "aborting connections after shutdown timeout");
			connections.shutdown().await;
		}

		coordinator.notify_shutdown_complete();
		Ok(())
	}

	/// Serves HTTP/1.1 requests on a single connection.
	pub async fn handle_connection(
		stream: TcpStream,
		remote_addr: SocketAddr,
		handler: Arc<dyn HttpHandler>,
		coordinator: ShutdownCoordinator,
	) -> std::result::Result<(), hyper::Error> {
		let service = RequestService { handler, remote_addr };
		let connection = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
		tokio::pin!(connection);

		tokio::select! {
			result = connection.as_mut() => result,
			_ = coordinator.signalled() => {
				connection.as_mut().graceful_shutdown();
				connection.await
			}
		}
	}
}

/// hyper service bridging one request into an [`HttpHandler`].
pub struct RequestService {
	handler: Arc<dyn HttpHandler>,
	remote_addr: SocketAddr,
}

impl RequestService {
	pub fn new(handler: Arc<dyn HttpHandler>, remote_addr: SocketAddr) -> Self {
		Self { handler, remote_addr }
	}
}

impl Service<hyper::Request<Incoming>> for RequestService {
	type Response = hyper::Response<ResponseBody>;
	type Error = BoxError;
	type Future = Pin<Box<dyn Future<Output = std::result::Result<Self::Response, Self::Error>> + Send + 'static>>;

	fn call(&self, req: hyper::Request<Incoming>) -> Self::Future {
		let handler = self.handler.clone();
		let remote_addr = self.remote_addr;

		Box::pin(async move {
			let request = match into_server_request(req, remote_addr) {
				Ok(request) => request,
				Err(error) => {
					tracing::debug!(%remote_addr, %error, "rejecting malformed request");
					return Ok(plain_response(StatusCode::BAD_REQUEST));
				}
			};

			let (transport, head) = HyperResponseTransport::new();
			tokio::spawn(async move {
				let mut response = ServerHttpResponse::new(transport);
				let outcome = handler.handle(&request, &mut response).await;
				finish(&request, &mut response, outcome).await;
			});

			match head.await {
				Ok(response) => Ok(response),
				Err(_) => {
					tracing::error!(%remote_addr, "request task ended without producing a response");
					Ok(plain_response(StatusCode::INTERNAL_SERVER_ERROR))
				}
			}
		})
	}
}

fn into_server_request(req: hyper::Request<Incoming>, remote_addr: SocketAddr) -> Result<ServerHttpRequest> {
	let (parts, incoming) = req.into_parts();
	ServerHttpRequest::builder()
		.method(parts.method)
		.uri(parts.uri.to_string())
		.version(parts.version)
		.headers(parts.headers)
		.remote_addr(remote_addr)
		.body(incoming_publisher(incoming))
		.build()
}

/// Completes the response and renders failures the handler left unhandled.
async fn finish(request: &ServerHttpRequest, response: &mut ServerHttpResponse, outcome: Result<()>) {
	let error = match outcome {
		Ok(()) => {
			if let Err(error) = response.set_complete().await {
				tracing::debug!(path = request.path(), %error, "response not completed");
			}
			return;
		}
		Err(error) => error,
	};

	if response.is_committed() {
		tracing::error!(path = request.path(), %error, "request failed after the response was committed");
		return;
	}

	tracing::error!(method = %request.method(), path = request.path(), %error, "request failed");
	let status = StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
	response.set_status(status);
	if let Err(error) = response.set_complete().await {
		tracing::debug!(path = request.path(), %error, "error response not completed");
	}
}

fn plain_response(status: StatusCode) -> hyper::Response<ResponseBody> {
	let mut response = hyper::Response::new(
		Full::new(Bytes::new())
			.map_err(|never| match never {})
			.boxed(),
	);
	*response.status_mut() = status;
	response
}

/// Creates an [`HttpServer`] for `handler` and serves on `addr`.
///
/// # Examples
///
/// ```no_run
/// use std::net::SocketAddr;
/// use std::sync::Arc;
/// use ripple_server::serve;
/// # use ripple_http::{HttpHandler, ServerHttpRequest, ServerHttpResponse};
/// # struct Hello;
/// # #[async_trait::async_trait]
/// # impl HttpHandler for Hello {
/// #     async fn handle(&self, _: &ServerHttpRequest, response: &mut ServerHttpResponse) -> ripple_core::Result<()> {
/// #         response.set_complete().await
/// #     }
/// # }
///
/// # async fn example() -> ripple_core::Result<()> {
/// let addr: SocketAddr = "127.0.0.1:3000".parse().unwrap();
/// serve(addr, Arc::new(Hello)).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(addr: SocketAddr, handler: Arc<dyn HttpHandler>) -> Result<()> {
	HttpServer::new(handler).listen(addr).await
}

/// Like [`serve`], stopping when `coordinator` requests shutdown.
///
/// ```no_run
/// use std::net::SocketAddr;
/// use std::sync::Arc;
/// use std::time::Duration;
/// use ripple_server::{ShutdownCoordinator, serve_with_shutdown, shutdown_signal};
/// # use ripple_http::{HttpHandler, ServerHttpRequest, ServerHttpResponse};
/// # struct Hello;
/// # #[async_trait::async_trait]
/// # impl HttpHandler for Hello {
/// #     async fn handle(&self, _: &ServerHttpRequest, response: &mut ServerHttpResponse) -> ripple_core::Result<()> {
/// #         response.set_complete().await
/// #     }
/// # }
///
/// # async fn example() -> ripple_core::Result<()> {
/// let addr: SocketAddr = "127.0.0.1:3000".parse().unwrap();
/// let coordinator = ShutdownCoordinator::new(Duration::from_secs(30));
///
/// let trigger = coordinator.clone();
/// tokio::spawn(async move {
///     shutdown_signal().await;
///     trigger.shutdown();
/// });
/// serve_with_shutdown(addr, Arc::new(Hello), coordinator).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve_with_shutdown(
	addr: SocketAddr,
	handler: Arc<dyn HttpHandler>,
	coordinator: ShutdownCoordinator,
) -> Result<()> {
	HttpServer::new(handler)
		.listen_with_shutdown(addr, coordinator)
		.await
}
