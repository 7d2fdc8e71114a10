//! Conversions between hyper bodies and byte publishers.

use bytes::Bytes;
use futures::{TryStreamExt, future};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, BodyStream, StreamBody};
use hyper::body::{Frame, Incoming};
use ripple_core::exception::{BoxError, Error};
use ripple_core::stream::Publisher;

/// Body of a request sent by [`HttpClient`](crate::HttpClient).
pub type RequestBody = UnsyncBoxBody<Bytes, BoxError>;

/// Data frames of an incoming body; trailers are dropped.
pub(crate) fn incoming_publisher(incoming: Incoming) -> Publisher<Bytes> {
	Publisher::from_fallible_stream(
		BodyStream::new(incoming)
			.try_filter_map(|frame| future::ready(Ok(frame.into_data().ok())))
			.map_err(|e| Error::Transport(e.to_string())),
	)
}

/// Streams `publisher` as an outgoing body, one chunk per poll.
pub(crate) fn publisher_body(publisher: Publisher<Bytes>) -> RequestBody {
	StreamBody::new(
		publisher
			.into_stream()
			.map_ok(Frame::data)
			.map_err(|e| Box::new(e) as BoxError),
	)
	.boxed_unsync()
}
