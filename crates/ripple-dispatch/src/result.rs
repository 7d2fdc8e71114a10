//! Rendering handler results into the response.

use crate::handler::HandlerResult;
use async_trait::async_trait;
use bytes::Bytes;
use http::HeaderValue;
use http::header::CONTENT_TYPE;
use ripple_core::exception::{Error, Result};
use ripple_core::stream::Publisher;
use ripple_http::{ServerHttpRequest, ServerHttpResponse};

/// Writes one kind of handler result into the response.
///
/// Result handlers are consulted in ascending [`order`](Self::order); the
/// first one supporting the result handles it.
#[async_trait]
pub trait HandlerResultHandler: Send + Sync {
	fn supports(&self, result: &HandlerResult) -> bool;

	async fn handle_result(
		&self,
		request: &ServerHttpRequest,
		response: &mut ServerHttpResponse,
		result: HandlerResult,
	) -> Result<()>;

	fn order(&self) -> i32 {
		0
	}
}

/// Writes text and byte values as a single-chunk body.
///
/// Supports `String`, `&'static str`, `Bytes` and `Vec<u8>`. A missing
/// `Content-Type` is set to `text/plain; charset=utf-8` for text and
/// `application/octet-stream` for bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct BytesResultHandler {
	order: i32,
}

impl BytesResultHandler {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_order(mut self, order: i32) -> Self {
		self.order = order;
		self
	}
}

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const OCTET_STREAM: &str = "application/octet-stream";

#[async_trait]
impl HandlerResultHandler for BytesResultHandler {
	fn supports(&self, result: &HandlerResult) -> bool {
		let value = result.value();
		value.is::<String>() || value.is::<&'static str>() || value.is::<Bytes>() || value.is::<Vec<u8>>()
	}

	async fn handle_result(
		&self,
		_request: &ServerHttpRequest,
		response: &mut ServerHttpResponse,
		result: HandlerResult,
	) -> Result<()> {
		let value = result.into_value();
		let descriptor = value.descriptor();
		let (body, content_type) = match value.downcast::<String>() {
			Ok(text) => (Bytes::from(text), TEXT_PLAIN),
			Err(value) => match value.downcast::<&'static str>() {
				Ok(text) => (Bytes::from_static(text.as_bytes()), TEXT_PLAIN),
				Err(value) => match value.downcast::<Bytes>() {
					Ok(bytes) => (bytes, OCTET_STREAM),
					Err(value) => match value.downcast::<Vec<u8>>() {
						Ok(bytes) => (Bytes::from(bytes), OCTET_STREAM),
						Err(_) => return Err(Error::UnsupportedResult(descriptor.name().to_string())),
					},
				},
			},
		};

		if !response.headers().contains_key(CONTENT_TYPE) {
			response.insert_header(CONTENT_TYPE, HeaderValue::from_static(content_type));
		}
		response.write_with(Publisher::just(body)).await
	}

	fn order(&self) -> i32 {
		self.order
	}
}

/// Streams a `Publisher<Bytes>` result as the response body.
///
/// Chunks are pulled only as fast as the transport accepts them.
#[derive(Debug, Default, Clone, Copy)]
pub struct StreamingResultHandler {
	order: i32,
}

impl StreamingResultHandler {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_order(mut self, order: i32) -> Self {
		self.order = order;
		self
	}
}

#[async_trait]
impl HandlerResultHandler for StreamingResultHandler {
	fn supports(&self, result: &HandlerResult) -> bool {
		result.value().is::<Publisher<Bytes>>()
	}

	async fn handle_result(
		&self,
		_request: &ServerHttpRequest,
		response: &mut ServerHttpResponse,
		result: HandlerResult,
	) -> Result<()> {
		let body = result
			.into_value()
			.downcast::<Publisher<Bytes>>()
			.map_err(|value| Error::UnsupportedResult(value.descriptor().name().to_string()))?;
		response.write_with(body).await
	}

	fn order(&self) -> i32 {
		self.order
	}
}
