//! In-memory response transport.

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use parking_lot::Mutex;
use ripple_core::exception::Result;
use ripple_core::stream::Publisher;
use ripple_http::{CookieMap, ResponseCookie, ResponseTransport, ServerHttpResponse};
use std::sync::Arc;

/// Everything a [`MemoryTransport`] received.
#[derive(Debug, Clone, Default)]
pub struct CapturedResponse {
	pub status: Option<StatusCode>,
	pub headers: HeaderMap,
	pub cookies: Vec<ResponseCookie>,
	pub chunks: Vec<Bytes>,
	pub body_writes: usize,
}

impl CapturedResponse {
	/// Whether the head was written.
	pub fn is_committed(&self) -> bool {
		self.status.is_some()
	}

	pub fn body(&self) -> Bytes {
		Bytes::from(self.chunks.concat())
	}

	pub fn body_text(&self) -> String {
		String::from_utf8_lossy(&self.chunks.concat()).into_owned()
	}
}

/// Transport that records the response in memory.
///
/// Clones share the captured state, so a test keeps one clone and hands the
/// other to a [`ServerHttpResponse`].
///
/// # Examples
///
/// ```
/// use ripple_test::transport::MemoryTransport;
/// use http::StatusCode;
///
/// # futures::executor::block_on(async {
/// let (mut response, transport) = MemoryTransport::response();
/// response.set_status(StatusCode::ACCEPTED);
/// response.set_complete().await.unwrap();
///
/// assert_eq!(transport.captured().status, Some(StatusCode::ACCEPTED));
/// assert!(transport.captured().body().is_empty());
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
	captured: Arc<Mutex<CapturedResponse>>,
	fail_body: Option<String>,
}

impl MemoryTransport {
	pub fn new() -> Self {
		Self::default()
	}

	/// Transport whose body writes fail with a transport error.
	pub fn failing(message: impl Into<String>) -> Self {
		Self {
			fail_body: Some(message.into()),
			..Self::default()
		}
	}

	/// A fresh response wired to a new transport.
	pub fn response() -> (ServerHttpResponse, Self) {
		let transport = Self::new();
		(ServerHttpResponse::new(transport.clone()), transport)
	}

	/// Snapshot of what was written so far.
	pub fn captured(&self) -> CapturedResponse {
		self.captured.lock().clone()
	}
}

#[async_trait]
impl ResponseTransport for MemoryTransport {
	fn write_status(&mut self, status: StatusCode) {
		self.captured.lock().status = Some(status);
	}

	fn write_headers(&mut self, headers: &HeaderMap) {
		self.captured.lock().headers = headers.clone();
	}

	fn write_cookies(&mut self, cookies: &CookieMap<ResponseCookie>) {
		self.captured.lock().cookies = cookies.iter().cloned().collect();
	}

	async fn write_body(&mut self, body: Publisher<Bytes>) -> Result<()> {
		self.captured.lock().body_writes += 1;
		if let Some(message) = &self.fail_body {
			return Err(ripple_core::Error::Transport(message.clone()));
		}
		let mut chunks = body.into_stream();
		while let Some(chunk) = futures::StreamExt::next(&mut chunks).await {
			let chunk = chunk?;
			self.captured.lock().chunks.push(chunk);
		}
		Ok(())
	}
}
