//! Response transport writing a [`ServerHttpResponse`] into hyper.
//!
//! [`ServerHttpResponse`]: ripple_http::ServerHttpResponse

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use http::header::SET_COOKIE;
use http::{HeaderMap, HeaderValue, StatusCode};
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, StreamBody};
use hyper::body::Frame;
use ripple_core::exception::{BoxError, Error, Result};
use ripple_core::stream::Publisher;
use ripple_http::{CookieMap, ResponseCookie, ResponseTransport};
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::ReceiverStream;

/// Body of a response produced by the server.
pub type ResponseBody = BoxBody<Bytes, BoxError>;

/// Chunks buffered between the body publisher and hyper. With a single slot
/// the next chunk is requested only once hyper took the previous one.
const BODY_CHANNEL_CAPACITY: usize = 1;

/// Transport handing the response head to hyper through a oneshot channel
/// and streaming the body chunk by chunk.
pub struct HyperResponseTransport {
	status: StatusCode,
	headers: HeaderMap,
	head: Option<oneshot::Sender<hyper::Response<ResponseBody>>>,
}

impl HyperResponseTransport {
	/// Returns the transport and the receiver the hyper service awaits.
	pub fn new() -> (Self, oneshot::Receiver<hyper::Response<ResponseBody>>) {
		let (head, receiver) = oneshot::channel();
		let transport = Self {
			status: StatusCode::OK,
			headers: HeaderMap::new(),
			head: Some(head),
		};
		(transport, receiver)
	}
}

#[async_trait]
impl ResponseTransport for HyperResponseTransport {
	fn write_status(&mut self, status: StatusCode) {
		self.status = status;
	}

	fn write_headers(&mut self, headers: &HeaderMap) {
		self.headers.extend(headers.clone());
	}

	fn write_cookies(&mut self, cookies: &CookieMap<ResponseCookie>) {
		for cookie in cookies.iter() {
			match HeaderValue::try_from(cookie.to_string()) {
				Ok(value) => {
					self.headers.append(SET_COOKIE, value);
				}
				Err(error) => {
					tracing::warn!(cookie = cookie.name(), %error, "dropping cookie with invalid header value");
				}
			}
		}
	}

	async fn write_body(&mut self, body: Publisher<Bytes>) -> Result<()> {
		let head = self.head.take().ok_or(Error::ResponseCommitted)?;
		let (sender, receiver) = mpsc::channel::<std::result::Result<Frame<Bytes>, BoxError>>(BODY_CHANNEL_CAPACITY);

		let mut response = hyper::Response::new(BodyExt::boxed(StreamBody::new(ReceiverStream::new(receiver))));
		*response.status_mut() = self.status;
		*response.headers_mut() = std::mem::take(&mut self.headers);
		head.send(response)
			.map_err(|_| Error::Transport("connection closed before the response head was sent".to_string()))?;

		let mut chunks = body.into_stream();
		while let Some(chunk) = chunks.next().await {
			match chunk {
				Ok(bytes) => {
					if sender.send(Ok(Frame::data(bytes))).await.is_err() {
						return Err(Error::Transport(
							"client went away while the response body was streaming".to_string(),
						));
					}
				}
				Err(error) => {
					// Aborts the connection so the client sees a truncated body.
					let _ = sender
						.send(Err(Box::new(Error::Transport(error.to_string())) as BoxError))
						.await;
					return Err(error);
				}
			}
		}
		Ok(())
	}
}

impl std::fmt::Debug for HyperResponseTransport {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("HyperResponseTransport")
			.field("status", &self.status)
			.field("headers", &self.headers)
			.field("head_sent", &self.head.is_none())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use http::header::CONTENT_TYPE;
	use ripple_http::ServerHttpResponse;
	use rstest::rstest;

	#[rstest]
	#[tokio::test]
	async fn test_head_and_body_reach_hyper() {
		// Arrange
		let (transport, head) = HyperResponseTransport::new();
		let mut response = ServerHttpResponse::new(transport);
		response.set_status(StatusCode::CREATED);
		response.insert_header(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
		response.add_cookie(ResponseCookie::new("session", "abc").with_path("/"));

		// Act
		let writer = tokio::spawn(async move {
			response
				.write_with(Publisher::from_iter(vec![
					Bytes::from_static(b"hello "),
					Bytes::from_static(b"world"),
				]))
				.await
		});
		let hyper_response = head.await.unwrap();

		// Assert
		assert_eq!(hyper_response.status(), StatusCode::CREATED);
		assert_eq!(hyper_response.headers()[CONTENT_TYPE], "text/plain");
		assert_eq!(hyper_response.headers()[SET_COOKIE], "session=abc; Path=/");
		let body = hyper_response.into_body().collect().await.unwrap().to_bytes();
		assert_eq!(body, Bytes::from_static(b"hello world"));
		assert!(writer.await.unwrap().is_ok());
	}

	#[rstest]
	#[tokio::test]
	async fn test_body_failure_aborts_stream() {
		// Arrange
		let (transport, head) = HyperResponseTransport::new();
		let mut response = ServerHttpResponse::new(transport);
		let body = Publisher::from_fallible_stream(futures::stream::iter(vec![
			Ok(Bytes::from_static(b"partial")),
			Err(Error::Internal("source failed".to_string())),
		]));

		// Act
		let writer = tokio::spawn(async move { response.write_with(body).await });
		let hyper_response = head.await.unwrap();
		let collected = hyper_response.into_body().collect().await;

		// Assert
		assert!(collected.is_err());
		assert!(matches!(writer.await.unwrap(), Err(Error::Internal(_))));
	}

	#[rstest]
	#[tokio::test]
	async fn test_dropped_receiver_is_transport_error() {
		// Arrange
		let (mut transport, head) = HyperResponseTransport::new();
		drop(head);

		// Act
		let result = transport.write_body(Publisher::empty()).await;

		// Assert
		assert!(matches!(result, Err(Error::Transport(_))));
	}

	#[rstest]
	#[tokio::test]
	async fn test_second_body_is_rejected() {
		let (mut transport, _head) = HyperResponseTransport::new();
		let _ = transport.write_body(Publisher::empty()).await;

		let result = transport.write_body(Publisher::empty()).await;

		assert!(matches!(result, Err(Error::ResponseCommitted)));
	}
}
