//! Outbound server response and its transport seam.

use crate::cookie::{CookieMap, ResponseCookie};
use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use ripple_core::exception::{Error, Result};
use ripple_core::stream::Publisher;

/// Connection between a [`ServerHttpResponse`] and the wire.
///
/// The head is written once, in the order status, headers, cookies, when the
/// response commits. The body follows as a publisher of chunks; the returned
/// future completes once the transport has accepted the last chunk.
#[async_trait]
pub trait ResponseTransport: Send {
	fn write_status(&mut self, status: StatusCode);

	fn write_headers(&mut self, headers: &HeaderMap);

	fn write_cookies(&mut self, cookies: &CookieMap<ResponseCookie>);

	async fn write_body(&mut self, body: Publisher<Bytes>) -> Result<()>;
}

/// Lifecycle of a response. The only transition is `Open` to `Committed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseState {
	Open,
	Committed,
}

/// Action run right before the response commits, while the head is still
/// mutable.
pub type BeforeCommit = Box<dyn FnOnce(&mut ServerHttpResponse) -> Result<()> + Send>;

/// Response under construction by the dispatcher and its collaborators.
///
/// Status, headers and cookies may change only while the response is open.
/// Mutators report whether the change was applied.
pub struct ServerHttpResponse {
	status: Option<StatusCode>,
	headers: HeaderMap,
	cookies: CookieMap<ResponseCookie>,
	before_commit: Vec<BeforeCommit>,
	state: ResponseState,
	body_written: bool,
	transport: Box<dyn ResponseTransport>,
}

impl ServerHttpResponse {
	pub fn new(transport: impl ResponseTransport + 'static) -> Self {
		Self {
			status: None,
			headers: HeaderMap::new(),
			cookies: CookieMap::new(),
			before_commit: Vec::new(),
			state: ResponseState::Open,
			body_written: false,
			transport: Box::new(transport),
		}
	}

	/// Status set so far; `None` means the default `200 OK`.
	pub fn status(&self) -> Option<StatusCode> {
		self.status
	}

	pub fn set_status(&mut self, status: StatusCode) -> bool {
		if self.is_committed() {
			tracing::debug!(%status, "ignoring status change on committed response");
			return false;
		}
		self.status = Some(status);
		true
	}

	pub fn headers(&self) -> &HeaderMap {
		&self.headers
	}

	/// Mutable headers, or `None` once committed.
	pub fn headers_mut(&mut self) -> Option<&mut HeaderMap> {
		if self.is_committed() {
			tracing::debug!("ignoring header access on committed response");
			return None;
		}
		Some(&mut self.headers)
	}

	/// Replaces the header `name`. Returns `false` once committed.
	pub fn insert_header(&mut self, name: HeaderName, value: HeaderValue) -> bool {
		match self.headers_mut() {
			Some(headers) => {
				headers.insert(name, value);
				true
			}
			None => false,
		}
	}

	pub fn cookies(&self) -> &CookieMap<ResponseCookie> {
		&self.cookies
	}

	pub fn add_cookie(&mut self, cookie: ResponseCookie) -> bool {
		if self.is_committed() {
			tracing::debug!(cookie = cookie.name(), "ignoring cookie on committed response");
			return false;
		}
		self.cookies.add_cookie(cookie);
		true
	}

	/// Registers an action to run when the response commits.
	pub fn before_commit<F>(&mut self, action: F) -> bool
	where
		F: FnOnce(&mut ServerHttpResponse) -> Result<()> + Send + 'static,
	{
		if self.is_committed() {
			return false;
		}
		self.before_commit.push(Box::new(action));
		true
	}

	pub fn state(&self) -> ResponseState {
		self.state
	}

	pub fn is_committed(&self) -> bool {
		self.state == ResponseState::Committed
	}

	/// Commits the response and streams `body` to the transport.
	///
	/// Fails with [`Error::ResponseCommitted`] if a body was already written.
	pub async fn write_with(&mut self, body: Publisher<Bytes>) -> Result<()> {
		if self.body_written {
			return Err(Error::ResponseCommitted);
		}
		self.commit()?;
		self.body_written = true;
		self.transport.write_body(body).await
	}

	/// Commits the response, ending it with an empty body if nothing was
	/// written yet.
	pub async fn set_complete(&mut self) -> Result<()> {
		if self.body_written {
			return Ok(());
		}
		self.write_with(Publisher::empty()).await
	}

	fn commit(&mut self) -> Result<()> {
		if self.is_committed() {
			return Ok(());
		}
		// A failing action stops the commit; actions not yet run stay registered.
		while !self.before_commit.is_empty() {
			let action = self.before_commit.remove(0);
			action(self)?;
		}
		self.state = ResponseState::Committed;

		let status = self.status.unwrap_or(StatusCode::OK);
		tracing::debug!(%status, "committing response");
		self.transport.write_status(status);
		self.transport.write_headers(&self.headers);
		self.transport.write_cookies(&self.cookies);
		Ok(())
	}
}

impl std::fmt::Debug for ServerHttpResponse {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ServerHttpResponse")
			.field("status", &self.status)
			.field("headers", &self.headers)
			.field("state", &self.state)
			.finish_non_exhaustive()
	}
}
