//! # Ripple Conf
//!
//! Settings for a Ripple server, read from a TOML file and overridden by
//! `RIPPLE_`-prefixed environment variables.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [reactive]
//! channel_capacity = 32
//! disabled_adapters = ["tokio"]
//!
//! [logging]
//! filter = "info,ripple_dispatch=debug"
//! json = true
//! ```
//!
//! ```no_run
//! use ripple_conf::Settings;
//!
//! let settings = Settings::load("ripple.toml").unwrap();
//! println!("listening on {}", settings.server.addr().unwrap());
//! ```

pub mod env;
pub mod error;
pub mod settings;

pub use env::{ENV_PREFIX, Env};
pub use error::{EnvError, Result, SettingsError};
pub use settings::{LoggingSettings, ReactiveSettings, ServerSettings, Settings};
