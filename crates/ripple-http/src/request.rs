//! Inbound server request.

use crate::cookie::{CookieMap, HttpCookie};
use crate::extensions::Extensions;
use bytes::Bytes;
use http::header::COOKIE;
use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri, Version};
use parking_lot::Mutex;
use ripple_core::exception::{Error, Result};
use ripple_core::stream::Publisher;
use std::net::SocketAddr;

/// Request received by the server, as seen by the dispatcher.
///
/// The body is a publisher of chunks that can be taken once.
pub struct ServerHttpRequest {
	method: Method,
	uri: Uri,
	version: Version,
	headers: HeaderMap,
	cookies: CookieMap<HttpCookie>,
	remote_addr: Option<SocketAddr>,
	extensions: Extensions,
	body: Mutex<Option<Publisher<Bytes>>>,
}

impl ServerHttpRequest {
	/// # Examples
	///
	/// ```
	/// use ripple_http::ServerHttpRequest;
	/// use http::Method;
	///
	/// let request = ServerHttpRequest::builder()
	///     .method(Method::POST)
	///     .uri("/orders?limit=5")
	///     .header("cookie", "theme=dark")
	///     .build()
	///     .unwrap();
	///
	/// assert_eq!(request.path(), "/orders");
	/// assert_eq!(request.query(), Some("limit=5"));
	/// assert_eq!(request.cookies().get_first("theme").unwrap().value(), "dark");
	/// ```
	pub fn builder() -> ServerHttpRequestBuilder {
		ServerHttpRequestBuilder::default()
	}

	pub fn method(&self) -> &Method {
		&self.method
	}

	pub fn uri(&self) -> &Uri {
		&self.uri
	}

	pub fn path(&self) -> &str {
		self.uri.path()
	}

	pub fn query(&self) -> Option<&str> {
		self.uri.query()
	}

	pub fn version(&self) -> Version {
		self.version
	}

	pub fn headers(&self) -> &HeaderMap {
		&self.headers
	}

	pub fn cookies(&self) -> &CookieMap<HttpCookie> {
		&self.cookies
	}

	pub fn remote_addr(&self) -> Option<SocketAddr> {
		self.remote_addr
	}

	pub fn extensions(&self) -> &Extensions {
		&self.extensions
	}

	/// Takes the body publisher. Subsequent calls return `None`.
	pub fn take_body(&self) -> Option<Publisher<Bytes>> {
		self.body.lock().take()
	}
}

impl std::fmt::Debug for ServerHttpRequest {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ServerHttpRequest")
			.field("method", &self.method)
			.field("uri", &self.uri)
			.field("version", &self.version)
			.field("headers", &self.headers)
			.field("remote_addr", &self.remote_addr)
			.finish_non_exhaustive()
	}
}

/// Builder for [`ServerHttpRequest`].
///
/// Cookies are parsed from the `Cookie` headers unless set explicitly.
pub struct ServerHttpRequestBuilder {
	method: Method,
	uri: Option<String>,
	version: Version,
	headers: HeaderMap,
	cookies: Option<CookieMap<HttpCookie>>,
	remote_addr: Option<SocketAddr>,
	body: Option<Publisher<Bytes>>,
	invalid_header: Option<Error>,
}

impl Default for ServerHttpRequestBuilder {
	fn default() -> Self {
		Self {
			method: Method::GET,
			uri: None,
			version: Version::HTTP_11,
			headers: HeaderMap::new(),
			cookies: None,
			remote_addr: None,
			body: None,
			invalid_header: None,
		}
	}
}

impl ServerHttpRequestBuilder {
	pub fn method(mut self, method: Method) -> Self {
		self.method = method;
		self
	}

	pub fn uri(mut self, uri: impl Into<String>) -> Self {
		self.uri = Some(uri.into());
		self
	}

	pub fn version(mut self, version: Version) -> Self {
		self.version = version;
		self
	}

	/// Replaces all headers.
	pub fn headers(mut self, headers: HeaderMap) -> Self {
		self.headers = headers;
		self
	}

	/// Appends one header. An invalid name or value fails [`build`](Self::build).
	pub fn header(mut self, name: &str, value: &str) -> Self {
		match (
			HeaderName::from_bytes(name.as_bytes()),
			HeaderValue::from_str(value),
		) {
			(Ok(name), Ok(value)) => {
				self.headers.append(name, value);
			}
			(Err(e), _) => self.invalid_header = Some(Error::Http(e.into())),
			(_, Err(e)) => self.invalid_header = Some(Error::Http(e.into())),
		}
		self
	}

	pub fn cookies(mut self, cookies: CookieMap<HttpCookie>) -> Self {
		self.cookies = Some(cookies);
		self
	}

	pub fn remote_addr(mut self, addr: SocketAddr) -> Self {
		self.remote_addr = Some(addr);
		self
	}

	pub fn body(mut self, body: Publisher<Bytes>) -> Self {
		self.body = Some(body);
		self
	}

	/// Convenience for a single-chunk body.
	pub fn body_bytes(self, body: impl Into<Bytes>) -> Self {
		self.body(Publisher::just(body.into()))
	}

	pub fn build(self) -> Result<ServerHttpRequest> {
		if let Some(error) = self.invalid_header {
			return Err(error);
		}
		let uri = match self.uri {
			Some(uri) => Uri::try_from(uri).map_err(http::Error::from)?,
			None => Uri::from_static("/"),
		};
		let cookies = self.cookies.unwrap_or_else(|| {
			CookieMap::parse_cookie_headers(
				self.headers
					.get_all(COOKIE)
					.iter()
					.filter_map(|value| value.to_str().ok()),
			)
		});
		Ok(ServerHttpRequest {
			method: self.method,
			uri,
			version: self.version,
			headers: self.headers,
			cookies,
			remote_addr: self.remote_addr,
			extensions: Extensions::new(),
			body: Mutex::new(Some(self.body.unwrap_or_else(Publisher::empty))),
		})
	}
}
