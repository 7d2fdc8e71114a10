//! Request and response cookies.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Cookie sent by a client: a name and a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpCookie {
	name: String,
	value: String,
}

impl HttpCookie {
	pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			value: value.into(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn value(&self) -> &str {
		&self.value
	}
}

impl fmt::Display for HttpCookie {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}={}", self.name, self.value)
	}
}

/// `SameSite` attribute of a response cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
	Strict,
	Lax,
	None,
}

impl SameSite {
	fn parse(value: &str) -> Option<Self> {
		if value.eq_ignore_ascii_case("strict") {
			Some(Self::Strict)
		} else if value.eq_ignore_ascii_case("lax") {
			Some(Self::Lax)
		} else if value.eq_ignore_ascii_case("none") {
			Some(Self::None)
		} else {
			Option::None
		}
	}
}

impl fmt::Display for SameSite {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Strict => "Strict",
			Self::Lax => "Lax",
			Self::None => "None",
		})
	}
}

/// Cookie set by a server, with the attributes of a `Set-Cookie` header.
///
/// # Examples
///
/// ```
/// use ripple_http::{ResponseCookie, SameSite};
/// use std::time::Duration;
///
/// let cookie = ResponseCookie::new("session", "abc")
///     .with_path("/")
///     .with_max_age(Duration::from_secs(60))
///     .with_http_only(true)
///     .with_same_site(SameSite::Lax);
///
/// assert_eq!(
///     cookie.to_string(),
///     "session=abc; Path=/; Max-Age=60; HttpOnly; SameSite=Lax"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseCookie {
	name: String,
	value: String,
	max_age: Option<Duration>,
	domain: Option<String>,
	path: Option<String>,
	secure: bool,
	http_only: bool,
	same_site: Option<SameSite>,
}

impl ResponseCookie {
	/// Session cookie without attributes.
	pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			value: value.into(),
			max_age: None,
			domain: None,
			path: None,
			secure: false,
			http_only: false,
			same_site: None,
		}
	}

	pub fn with_max_age(mut self, max_age: Duration) -> Self {
		self.max_age = Some(max_age);
		self
	}

	pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
		self.domain = Some(domain.into());
		self
	}

	pub fn with_path(mut self, path: impl Into<String>) -> Self {
		self.path = Some(path.into());
		self
	}

	pub fn with_secure(mut self, secure: bool) -> Self {
		self.secure = secure;
		self
	}

	pub fn with_http_only(mut self, http_only: bool) -> Self {
		self.http_only = http_only;
		self
	}

	pub fn with_same_site(mut self, same_site: SameSite) -> Self {
		self.same_site = Some(same_site);
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn value(&self) -> &str {
		&self.value
	}

	/// `None` for a session cookie.
	pub fn max_age(&self) -> Option<Duration> {
		self.max_age
	}

	pub fn domain(&self) -> Option<&str> {
		self.domain.as_deref()
	}

	pub fn path(&self) -> Option<&str> {
		self.path.as_deref()
	}

	pub fn is_secure(&self) -> bool {
		self.secure
	}

	pub fn is_http_only(&self) -> bool {
		self.http_only
	}

	pub fn same_site(&self) -> Option<SameSite> {
		self.same_site
	}

	/// Parses a `Set-Cookie` header value.
	///
	/// Unknown attributes are skipped. A negative `Max-Age` yields a session
	/// cookie.
	pub fn parse(header: &str) -> Option<Self> {
		let mut parts = header.split(';');
		let (name, value) = split_pair(parts.next()?)?;
		let mut cookie = Self::new(name, value);
		for attribute in parts {
			let attribute = attribute.trim();
			let (key, value) = match attribute.split_once('=') {
				Some((key, value)) => (key.trim(), value.trim()),
				None => (attribute, ""),
			};
			if key.eq_ignore_ascii_case("max-age") {
				cookie.max_age = value.parse::<u64>().ok().map(Duration::from_secs);
			} else if key.eq_ignore_ascii_case("domain") {
				cookie.domain = Some(value.to_string());
			} else if key.eq_ignore_ascii_case("path") {
				cookie.path = Some(value.to_string());
			} else if key.eq_ignore_ascii_case("secure") {
				cookie.secure = true;
			} else if key.eq_ignore_ascii_case("httponly") {
				cookie.http_only = true;
			} else if key.eq_ignore_ascii_case("samesite") {
				cookie.same_site = SameSite::parse(value);
			}
		}
		Some(cookie)
	}
}

impl fmt::Display for ResponseCookie {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}={}", self.name, self.value)?;
		if let Some(path) = &self.path {
			write!(f, "; Path={path}")?;
		}
		if let Some(domain) = &self.domain {
			write!(f, "; Domain={domain}")?;
		}
		if let Some(max_age) = self.max_age {
			write!(f, "; Max-Age={}", max_age.as_secs())?;
		}
		if self.secure {
			f.write_str("; Secure")?;
		}
		if self.http_only {
			f.write_str("; HttpOnly")?;
		}
		if let Some(same_site) = self.same_site {
			write!(f, "; SameSite={same_site}")?;
		}
		Ok(())
	}
}

/// Cookies grouped by name, each name holding one or more cookies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieMap<C> {
	entries: BTreeMap<String, Vec<C>>,
}

impl<C> Default for CookieMap<C> {
	fn default() -> Self {
		Self {
			entries: BTreeMap::new(),
		}
	}
}

impl<C> CookieMap<C> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends `cookie` under `name`.
	pub fn add(&mut self, name: impl Into<String>, cookie: C) {
		self.entries.entry(name.into()).or_default().push(cookie);
	}

	/// First cookie stored under `name`.
	pub fn get_first(&self, name: &str) -> Option<&C> {
		self.entries.get(name).and_then(|cookies| cookies.first())
	}

	pub fn get_all(&self, name: &str) -> &[C] {
		self.entries.get(name).map(Vec::as_slice).unwrap_or(&[])
	}

	pub fn contains(&self, name: &str) -> bool {
		self.entries.contains_key(name)
	}

	pub fn remove(&mut self, name: &str) -> Option<Vec<C>> {
		self.entries.remove(name)
	}

	/// Number of distinct names.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Every cookie, grouped by name in name order.
	pub fn iter(&self) -> impl Iterator<Item = &C> {
		self.entries.values().flatten()
	}
}

impl CookieMap<HttpCookie> {
	pub fn add_cookie(&mut self, cookie: HttpCookie) {
		self.add(cookie.name.clone(), cookie);
	}

	/// Parses every `Cookie` header value.
	///
	/// # Examples
	///
	/// ```
	/// use ripple_http::CookieMap;
	///
	/// let cookies = CookieMap::parse_cookie_headers(["a=1; b=2", "a=3"]);
	/// assert_eq!(cookies.get_all("a").len(), 2);
	/// assert_eq!(cookies.get_first("b").unwrap().value(), "2");
	/// ```
	pub fn parse_cookie_headers<'a>(headers: impl IntoIterator<Item = &'a str>) -> Self {
		let mut cookies = Self::new();
		for header in headers {
			for pair in header.split(';') {
				if let Some((name, value)) = split_pair(pair) {
					cookies.add_cookie(HttpCookie::new(name, value));
				}
			}
		}
		cookies
	}

	/// Renders the map as a single `Cookie` header value.
	pub fn to_header_value(&self) -> String {
		self.iter()
			.map(ToString::to_string)
			.collect::<Vec<_>>()
			.join("; ")
	}
}

impl CookieMap<ResponseCookie> {
	pub fn add_cookie(&mut self, cookie: ResponseCookie) {
		self.add(cookie.name.clone(), cookie);
	}
}

fn split_pair(pair: &str) -> Option<(&str, &str)> {
	let (name, value) = pair.trim().split_once('=')?;
	let name = name.trim();
	if name.is_empty() {
		return None;
	}
	Some((name, value.trim()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_parse_cookie_headers_skips_malformed_pairs() {
		let cookies = CookieMap::parse_cookie_headers(["theme=dark; broken; =x;  lang = en "]);

		assert_eq!(cookies.len(), 2);
		assert_eq!(cookies.get_first("theme").unwrap().value(), "dark");
		assert_eq!(cookies.get_first("lang").unwrap().value(), "en");
	}

	#[rstest]
	fn test_cookie_header_value_round_trip() {
		let cookies = CookieMap::parse_cookie_headers(["a=1; b=2"]);

		assert_eq!(cookies.to_header_value(), "a=1; b=2");
	}

	#[rstest]
	fn test_response_cookie_renders_every_attribute() {
		// Arrange
		let cookie = ResponseCookie::new("id", "42")
			.with_path("/app")
			.with_domain("example.com")
			.with_max_age(Duration::from_secs(3600))
			.with_secure(true)
			.with_http_only(true)
			.with_same_site(SameSite::Strict);

		// Act
		let rendered = cookie.to_string();

		// Assert
		assert_eq!(
			rendered,
			"id=42; Path=/app; Domain=example.com; Max-Age=3600; Secure; HttpOnly; SameSite=Strict"
		);
	}

	#[rstest]
	#[case("id=42; Max-Age=-1", None)]
	#[case("id=42; max-age=10", Some(Duration::from_secs(10)))]
	#[case("id=42", None)]
	fn test_parse_max_age(#[case] header: &str, #[case] expected: Option<Duration>) {
		let cookie = ResponseCookie::parse(header).unwrap();

		assert_eq!(cookie.max_age(), expected);
	}

	#[rstest]
	fn test_parse_set_cookie_attributes() {
		let cookie =
			ResponseCookie::parse("sid=abc; Path=/; Domain=example.com; Secure; HttpOnly; SameSite=lax")
				.unwrap();

		assert_eq!(cookie.name(), "sid");
		assert_eq!(cookie.value(), "abc");
		assert_eq!(cookie.path(), Some("/"));
		assert_eq!(cookie.domain(), Some("example.com"));
		assert!(cookie.is_secure());
		assert!(cookie.is_http_only());
		assert_eq!(cookie.same_site(), Some(SameSite::Lax));
	}

	#[rstest]
	fn test_parse_rejects_nameless_cookie() {
		assert!(ResponseCookie::parse("=value").is_none());
	}
}
