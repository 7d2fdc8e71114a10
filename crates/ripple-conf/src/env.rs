//! Prefixed environment variable lookups.

use crate::error::EnvError;
use std::env::{self, VarError};
use std::str::FromStr;

/// Prefix shared by every Ripple environment variable
pub const ENV_PREFIX: &str = "RIPPLE_";

/// Environment variable reader with prefix support
#[derive(Debug, Clone)]
pub struct Env {
	prefix: String,
}

impl Env {
	/// Reader for `RIPPLE_`-prefixed variables.
	pub fn new() -> Self {
		Self::with_prefix(ENV_PREFIX)
	}

	/// Reader for variables starting with `prefix`.
	///
	/// # Examples
	///
	/// ```
	/// use ripple_conf::env::Env;
	///
	/// let env = Env::with_prefix("APP_");
	/// assert_eq!(env.key("PORT"), "APP_PORT");
	/// ```
	pub fn with_prefix(prefix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
		}
	}

	/// Full variable name for `key`.
	pub fn key(&self, key: &str) -> String {
		format!("{}{}", self.prefix, key)
	}

	/// Raw string value, `None` when the variable is unset.
	pub fn str(&self, key: &str) -> Result<Option<String>, EnvError> {
		let full_key = self.key(key);
		match env::var(&full_key) {
			Ok(value) => Ok(Some(value)),
			Err(VarError::NotPresent) => Ok(None),
			Err(VarError::NotUnicode(_)) => Err(EnvError::NotUnicode(full_key)),
		}
	}

	/// Value parsed with [`FromStr`].
	pub fn parse<T>(&self, key: &str) -> Result<Option<T>, EnvError>
	where
		T: FromStr,
		T::Err: std::fmt::Display,
	{
		let Some(value) = self.str(key)? else {
			return Ok(None);
		};
		value
			.trim()
			.parse::<T>()
			.map(Some)
			.map_err(|e| EnvError::ParseError {
				key: self.key(key),
				value_len: value.len(),
				error: e.to_string(),
			})
	}

	/// Boolean value. Accepts `true/false`, `yes/no`, `on/off` and `1/0`.
	pub fn bool(&self, key: &str) -> Result<Option<bool>, EnvError> {
		let Some(value) = self.str(key)? else {
			return Ok(None);
		};
		parse_bool(&value)
			.map(Some)
			.map_err(|error| EnvError::ParseError {
				key: self.key(key),
				value_len: value.len(),
				error,
			})
	}

	/// Comma-separated list; blank entries are skipped.
	pub fn list(&self, key: &str) -> Result<Option<Vec<String>>, EnvError> {
		Ok(self.str(key)?.map(|value| parse_list(&value)))
	}
}

impl Default for Env {
	fn default() -> Self {
		Self::new()
	}
}

/// Parses the boolean spellings accepted in environment variables.
pub fn parse_bool(value: &str) -> Result<bool, String> {
	match value.trim().to_ascii_lowercase().as_str() {
		"true" | "yes" | "on" | "1" => Ok(true),
		"false" | "no" | "off" | "0" => Ok(false),
		other => Err(format!("'{}' is not a boolean", other)),
	}
}

/// Splits a comma-separated value into trimmed, non-empty entries.
pub fn parse_list(value: &str) -> Vec<String> {
	value
		.split(',')
		.map(str::trim)
		.filter(|entry| !entry.is_empty())
		.map(str::to_string)
		.collect()
}
