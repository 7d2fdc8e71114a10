use std::path::PathBuf;

/// Result type for settings operations
pub type Result<T> = std::result::Result<T, SettingsError>;

/// Environment variable errors
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
	#[error("Failed to parse environment variable '{key}' (value length: {value_len}): {error}")]
	ParseError {
		key: String,
		/// Length of the original value, the raw value is never echoed
		value_len: usize,
		error: String,
	},

	#[error("Environment variable '{0}' is not valid unicode")]
	NotUnicode(String),
}

/// Errors raised while loading or validating settings
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("Failed to read settings file {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("Environment error: {0}")]
	Env(#[from] EnvError),

	#[error("Invalid value for '{key}': {message}")]
	InvalidValue { key: String, message: String },

	#[error("Multiple settings errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
	Multiple(Vec<SettingsError>),
}

impl SettingsError {
	pub(crate) fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
		SettingsError::InvalidValue {
			key: key.into(),
			message: message.into(),
		}
	}
}
