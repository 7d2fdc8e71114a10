//! Settings model, loading and validation.

use crate::env::Env;
use crate::error::{Result, SettingsError};
use ripple_reactive::{Capabilities, CompositionConverter, DEFAULT_CHANNEL_CAPACITY};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;

/// Adapter names accepted in `reactive.disabled_adapters`
pub const ADAPTER_NAMES: &[&str] = &["futures", "tokio", "tokio-stream"];

/// Top-level settings of a Ripple server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
	pub server: ServerSettings,
	pub reactive: ReactiveSettings,
	pub logging: LoggingSettings,
}

/// Listener settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSettings {
	pub host: String,
	pub port: u16,
	/// Seconds to wait for open connections after a shutdown signal
	pub shutdown_timeout_secs: u64,
}

impl Default for ServerSettings {
	fn default() -> Self {
		Self {
			host: "127.0.0.1".to_string(),
			port: 8080,
			shutdown_timeout_secs: 30,
		}
	}
}

impl ServerSettings {
	/// Socket address to bind.
	pub fn addr(&self) -> Result<SocketAddr> {
		let ip = self
			.host
			.parse::<IpAddr>()
			.map_err(|e| SettingsError::invalid("server.host", e.to_string()))?;
		Ok(SocketAddr::new(ip, self.port))
	}

	pub fn shutdown_timeout(&self) -> std::time::Duration {
		std::time::Duration::from_secs(self.shutdown_timeout_secs)
	}
}

/// Reactive adapter settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReactiveSettings {
	/// Buffer size of channels fed from a publisher
	pub channel_capacity: usize,
	/// Adapters to switch off even when detected
	pub disabled_adapters: Vec<String>,
}

impl Default for ReactiveSettings {
	fn default() -> Self {
		Self {
			channel_capacity: DEFAULT_CHANNEL_CAPACITY,
			disabled_adapters: Vec::new(),
		}
	}
}

impl ReactiveSettings {
	/// `detected` with every disabled adapter cleared.
	///
	/// # Examples
	///
	/// ```
	/// use ripple_conf::ReactiveSettings;
	/// use ripple_reactive::Capabilities;
	///
	/// let settings = ReactiveSettings {
	///     disabled_adapters: vec!["tokio".to_string()],
	///     ..Default::default()
	/// };
	/// let capabilities = settings.capabilities(Capabilities::all());
	/// assert!(capabilities.has_futures());
	/// assert!(!capabilities.has_tokio());
	/// ```
	pub fn capabilities(&self, detected: Capabilities) -> Capabilities {
		self.disabled_adapters
			.iter()
			.fold(detected, |caps, name| caps.without(name))
	}

	/// Converter over the adapters detected in this process and not disabled.
	pub fn converter(&self) -> CompositionConverter {
		CompositionConverter::with_channel_capacity(
			self.capabilities(Capabilities::detect()),
			self.channel_capacity,
		)
	}
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
	/// `tracing` filter directives, e.g. `info,ripple_dispatch=debug`
	pub filter: String,
	/// Emit JSON lines instead of human readable output
	pub json: bool,
}

impl Default for LoggingSettings {
	fn default() -> Self {
		Self {
			filter: "info".to_string(),
			json: false,
		}
	}
}

impl Settings {
	/// Parses settings from TOML text. Missing fields keep their defaults.
	///
	/// # Examples
	///
	/// ```
	/// use ripple_conf::Settings;
	///
	/// let settings = Settings::from_toml_str("[server]\nport = 9000\n").unwrap();
	/// assert_eq!(settings.server.port, 9000);
	/// assert_eq!(settings.server.host, "127.0.0.1");
	/// ```
	pub fn from_toml_str(content: &str) -> Result<Self> {
		Ok(toml::from_str(content)?)
	}

	/// Reads settings from a TOML file. A missing file yields the defaults.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		match fs::read_to_string(path) {
			Ok(content) => Self::from_toml_str(&content),
			Err(e) if e.kind() == io::ErrorKind::NotFound => {
				tracing::debug!(path = %path.display(), "settings file not found, using defaults");
				Ok(Self::default())
			}
			Err(source) => Err(SettingsError::Io {
				path: path.to_path_buf(),
				source,
			}),
		}
	}

	/// Loads `path`, applies `RIPPLE_` environment overrides and validates.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let mut settings = Self::from_file(path)?;
		settings.apply_env(&Env::new())?;
		settings.validate()?;
		Ok(settings)
	}

	/// Defaults with `RIPPLE_` environment overrides, validated.
	pub fn from_env() -> Result<Self> {
		let mut settings = Self::default();
		settings.apply_env(&Env::new())?;
		settings.validate()?;
		Ok(settings)
	}

	/// Overrides fields from environment variables.
	///
	/// | Variable | Field |
	/// |---|---|
	/// | `HOST` | `server.host` |
	/// | `PORT` | `server.port` |
	/// | `SHUTDOWN_TIMEOUT` | `server.shutdown_timeout_secs` |
	/// | `CHANNEL_CAPACITY` | `reactive.channel_capacity` |
	/// | `DISABLED_ADAPTERS` | `reactive.disabled_adapters` (comma-separated) |
	/// | `LOG` | `logging.filter` |
	/// | `LOG_JSON` | `logging.json` |
	pub fn apply_env(&mut self, env: &Env) -> Result<()> {
		if let Some(host) = env.str("HOST")? {
			self.server.host = host;
		}
		if let Some(port) = env.parse("PORT")? {
			self.server.port = port;
		}
		if let Some(timeout) = env.parse("SHUTDOWN_TIMEOUT")? {
			self.server.shutdown_timeout_secs = timeout;
		}
		if let Some(capacity) = env.parse("CHANNEL_CAPACITY")? {
			self.reactive.channel_capacity = capacity;
		}
		if let Some(disabled) = env.list("DISABLED_ADAPTERS")? {
			self.reactive.disabled_adapters = disabled;
		}
		if let Some(filter) = env.str("LOG")? {
			self.logging.filter = filter;
		}
		if let Some(json) = env.bool("LOG_JSON")? {
			self.logging.json = json;
		}
		Ok(())
	}

	/// Checks cross-field constraints. All violations are reported together.
	pub fn validate(&self) -> Result<()> {
		let mut errors = Vec::new();

		if let Err(e) = self.server.addr() {
			errors.push(e);
		}
		if self.reactive.channel_capacity == 0 {
			errors.push(SettingsError::invalid(
				"reactive.channel_capacity",
				"must be at least 1",
			));
		}
		for name in &self.reactive.disabled_adapters {
			if !ADAPTER_NAMES.contains(&name.as_str()) {
				errors.push(SettingsError::invalid(
					"reactive.disabled_adapters",
					format!("unknown adapter '{}', expected one of {:?}", name, ADAPTER_NAMES),
				));
			}
		}
		if self.logging.filter.trim().is_empty() {
			errors.push(SettingsError::invalid("logging.filter", "must not be empty"));
		}

		match errors.len() {
			0 => Ok(()),
			1 => Err(errors.remove(0)),
			_ => Err(SettingsError::Multiple(errors)),
		}
	}
}
