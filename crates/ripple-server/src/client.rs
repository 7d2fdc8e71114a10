use crate::body::{incoming_publisher, publisher_body};
use http::header::{COOKIE, HOST};
use http::uri::{Authority, PathAndQuery};
use http::{HeaderValue, Uri};
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use ripple_core::exception::{Error, Result};
use ripple_core::stream::Publisher;
use ripple_http::{ClientHttpRequest, ClientHttpResponse};
use tokio::net::TcpStream;

/// Minimal HTTP/1.1 client executing [`ClientHttpRequest`]s over plain TCP.
///
/// Every request opens its own connection.
#[derive(Debug, Clone, Default)]
pub struct HttpClient {}

impl HttpClient {
	pub fn new() -> Self {
		Self {}
	}

	/// Sends `request` and returns the response with a streaming body.
	///
	/// Before-commit actions run first; headers and cookies are copied after
	/// them, then the body publisher is streamed to the server.
	pub async fn execute(&self, mut request: ClientHttpRequest) -> Result<ClientHttpResponse> {
		request.commit()?;

		if let Some(scheme) = request.uri().scheme_str()
			&& scheme != "http"
		{
			return Err(Error::Transport(format!("unsupported scheme '{}'", scheme)));
		}
		let authority = request
			.uri()
			.authority()
			.cloned()
			.ok_or_else(|| Error::Transport(format!("request URI '{}' has no authority", request.uri())))?;
		let port = authority.port_u16().unwrap_or(80);

		let stream = TcpStream::connect((connect_host(&authority), port)).await?;
		let (mut sender, connection) = http1::handshake(TokioIo::new(stream))
			.await
			.map_err(|e| Error::Transport(e.to_string()))?;
		tokio::spawn(async move {
			if let Err(error) = connection.await {
				tracing::debug!(%error, "client connection closed with error");
			}
		});

		let path = request
			.uri()
			.path_and_query()
			.cloned()
			.unwrap_or_else(|| PathAndQuery::from_static("/"));
		let body = request.take_body().unwrap_or_else(Publisher::empty);

		let mut outgoing = hyper::Request::new(publisher_body(body));
		*outgoing.method_mut() = request.method().clone();
		*outgoing.uri_mut() = Uri::from(path);
		*outgoing.headers_mut() = request.headers().clone();
		if !outgoing.headers().contains_key(HOST) {
			let host = HeaderValue::from_str(authority.as_str()).map_err(http::Error::from)?;
			outgoing.headers_mut().insert(HOST, host);
		}
		if !request.cookies().is_empty() {
			let cookies = HeaderValue::from_str(&request.cookies().to_header_value()).map_err(http::Error::from)?;
			outgoing.headers_mut().append(COOKIE, cookies);
		}

		tracing::debug!(method = %request.method(), uri = %request.uri(), "executing client request");
		let response = sender
			.send_request(outgoing)
			.await
			.map_err(|e| Error::Transport(e.to_string()))?;

		let (parts, incoming) = response.into_parts();
		Ok(ClientHttpResponse::new(parts.status, parts.headers, incoming_publisher(incoming)))
	}
}

/// Host to resolve for `authority`. IPv6 literals keep their brackets in the
/// URI and the `Host` header but not in the socket address.
fn connect_host(authority: &Authority) -> &str {
	let host = authority.host();
	host.strip_prefix('[')
		.and_then(|literal| literal.strip_suffix(']'))
		.unwrap_or(host)
}
