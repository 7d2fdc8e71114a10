//! Client-side exchange model. Execution belongs to a transport.

use crate::cookie::{CookieMap, HttpCookie, ResponseCookie};
use bytes::Bytes;
use http::header::SET_COOKIE;
use http::{HeaderMap, Method, StatusCode, Uri};
use ripple_core::exception::{Error, Result};
use ripple_core::stream::Publisher;

/// Action run when the request commits, while it is still mutable.
pub type ClientBeforeCommit = Box<dyn FnOnce(&mut ClientHttpRequest) -> Result<()> + Send>;

/// Outgoing request assembled before a transport executes it.
pub struct ClientHttpRequest {
	method: Method,
	uri: Uri,
	headers: HeaderMap,
	cookies: CookieMap<HttpCookie>,
	body: Option<Publisher<Bytes>>,
	before_commit: Vec<ClientBeforeCommit>,
	committed: bool,
}

impl ClientHttpRequest {
	/// # Examples
	///
	/// ```
	/// use ripple_http::ClientHttpRequest;
	/// use http::{Method, Uri};
	///
	/// let request = ClientHttpRequest::new(Method::GET, Uri::from_static("http://localhost/ping"));
	/// assert_eq!(request.uri().path(), "/ping");
	/// assert!(!request.is_committed());
	/// ```
	pub fn new(method: Method, uri: Uri) -> Self {
		Self {
			method,
			uri,
			headers: HeaderMap::new(),
			cookies: CookieMap::new(),
			body: None,
			before_commit: Vec::new(),
			committed: false,
		}
	}

	pub fn method(&self) -> &Method {
		&self.method
	}

	pub fn uri(&self) -> &Uri {
		&self.uri
	}

	pub fn headers(&self) -> &HeaderMap {
		&self.headers
	}

	/// Mutable headers, or `None` once committed.
	pub fn headers_mut(&mut self) -> Option<&mut HeaderMap> {
		(!self.committed).then_some(&mut self.headers)
	}

	pub fn cookies(&self) -> &CookieMap<HttpCookie> {
		&self.cookies
	}

	pub fn add_cookie(&mut self, cookie: HttpCookie) -> bool {
		if self.committed {
			return false;
		}
		self.cookies.add_cookie(cookie);
		true
	}

	pub fn before_commit<F>(&mut self, action: F) -> bool
	where
		F: FnOnce(&mut ClientHttpRequest) -> Result<()> + Send + 'static,
	{
		if self.committed {
			return false;
		}
		self.before_commit.push(Box::new(action));
		true
	}

	pub fn is_committed(&self) -> bool {
		self.committed
	}

	/// Stores `body` and commits. Completes immediately; the body is streamed
	/// when the request is executed.
	pub fn write_with(&mut self, body: Publisher<Bytes>) -> Result<()> {
		if self.body.is_some() {
			return Err(Error::ResponseCommitted);
		}
		self.commit()?;
		self.body = Some(body);
		Ok(())
	}

	/// Runs the before-commit actions once. Later calls do nothing.
	///
	/// A failing action stops the commit and leaves the request open with the
	/// actions that did not run still registered.
	pub fn commit(&mut self) -> Result<()> {
		if self.committed {
			return Ok(());
		}
		while !self.before_commit.is_empty() {
			let action = self.before_commit.remove(0);
			action(self)?;
		}
		self.committed = true;
		Ok(())
	}

	/// Takes the stored body, if any.
	pub fn take_body(&mut self) -> Option<Publisher<Bytes>> {
		self.body.take()
	}
}

impl std::fmt::Debug for ClientHttpRequest {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ClientHttpRequest")
			.field("method", &self.method)
			.field("uri", &self.uri)
			.field("headers", &self.headers)
			.field("committed", &self.committed)
			.finish_non_exhaustive()
	}
}

/// Response received by a client.
pub struct ClientHttpResponse {
	status: StatusCode,
	headers: HeaderMap,
	cookies: CookieMap<ResponseCookie>,
	body: Option<Publisher<Bytes>>,
}

impl ClientHttpResponse {
	/// Builds a response, parsing cookies from its `Set-Cookie` headers.
	pub fn new(status: StatusCode, headers: HeaderMap, body: Publisher<Bytes>) -> Self {
		let mut cookies: CookieMap<ResponseCookie> = CookieMap::new();
		for value in headers.get_all(SET_COOKIE) {
			match value.to_str().ok().and_then(ResponseCookie::parse) {
				Some(cookie) => cookies.add_cookie(cookie),
				None => tracing::debug!(?value, "skipping unparsable Set-Cookie header"),
			}
		}
		Self {
			status,
			headers,
			cookies,
			body: Some(body),
		}
	}

	pub fn status(&self) -> StatusCode {
		self.status
	}

	pub fn headers(&self) -> &HeaderMap {
		&self.headers
	}

	pub fn cookies(&self) -> &CookieMap<ResponseCookie> {
		&self.cookies
	}

	/// Takes the body publisher. Subsequent calls return `None`.
	pub fn take_body(&mut self) -> Option<Publisher<Bytes>> {
		self.body.take()
	}

	/// Collects the whole body into one buffer.
	pub async fn bytes(&mut self) -> Result<Bytes> {
		let Some(body) = self.take_body() else {
			return Ok(Bytes::new());
		};
		let chunks = body.collect().await?;
		Ok(Bytes::from(chunks.concat()))
	}
}

impl std::fmt::Debug for ClientHttpResponse {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ClientHttpResponse")
			.field("status", &self.status)
			.field("headers", &self.headers)
			.finish_non_exhaustive()
	}
}
