//! Request construction helpers.

use bytes::Bytes;
use http::Method;
use ripple_http::ServerHttpRequest;

/// Builds a request for tests.
///
/// # Panics
///
/// Panics on an invalid path or header.
///
/// # Examples
///
/// ```
/// use ripple_test::http::create_request;
/// use http::Method;
///
/// let request = create_request(Method::GET, "/ping", None, vec![("x-id", "1")]);
/// assert_eq!(request.path(), "/ping");
/// assert!(request.headers().contains_key("x-id"));
/// ```
pub fn create_request(
	method: Method,
	path: &str,
	body: Option<&str>,
	headers: Vec<(&str, &str)>,
) -> ServerHttpRequest {
	let mut builder = ServerHttpRequest::builder().method(method).uri(path);
	for (name, value) in headers {
		builder = builder.header(name, value);
	}
	if let Some(body) = body {
		builder = builder.body_bytes(Bytes::copy_from_slice(body.as_bytes()));
	}
	builder.build().expect("invalid test request")
}

/// `GET` request without body or headers.
pub fn get(path: &str) -> ServerHttpRequest {
	create_request(Method::GET, path, None, Vec::new())
}
