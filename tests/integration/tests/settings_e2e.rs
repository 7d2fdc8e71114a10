//! Settings driving a running server
//!
//! Covers:
//! - disabled reactive adapters taking effect in dispatch
//! - logging initialisation from parsed settings

use futures::future::BoxFuture;
use http::{Method, StatusCode};
use ripple::conf::Settings;
use ripple_dispatch::InvocableHandler;
use ripple_integration_tests::{TestServer, dispatcher};
use rstest::rstest;
use serial_test::serial;
use std::sync::Arc;

const SETTINGS: &str = r#"
[server]
host = "127.0.0.1"
port = 0

[reactive]
channel_capacity = 2
disabled_adapters = ["tokio"]

[logging]
filter = "warn,ripple_dispatch=debug"
json = true
"#;

fn routes() -> Vec<(Method, &'static str, ripple_dispatch::HandlerRef)> {
	let from_future = InvocableHandler::deferred::<String, _, _>(|_| {
		let future: BoxFuture<'static, String> = Box::pin(async { "futures".to_string() });
		Ok(future)
	})
	.into_ref("from-future");
	let from_channel = InvocableHandler::deferred::<String, _, _>(|_| {
		let (sender, receiver) = tokio::sync::oneshot::channel();
		let _ = sender.send("tokio".to_string());
		Ok(receiver)
	})
	.into_ref("from-channel");
	vec![
		(Method::GET, "/future", from_future),
		(Method::GET, "/channel", from_channel),
	]
}

#[rstest]
#[tokio::test]
async fn test_disabled_adapter_is_not_consulted() {
	// Arrange
	let settings = Settings::from_toml_str(SETTINGS).unwrap();
	settings.validate().unwrap();
	let converter = settings.reactive.converter();
	let server = TestServer::start(Arc::new(dispatcher(converter, routes()))).await;

	// Act
	let future_reply = server.get("/future").await;
	let channel_reply = server.get("/channel").await;

	// Assert
	assert_eq!(future_reply.status, StatusCode::OK);
	assert_eq!(future_reply.text(), "futures");
	assert_eq!(channel_reply.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[rstest]
#[tokio::test]
async fn test_default_settings_enable_every_detected_adapter() {
	// Arrange
	let converter = Settings::default().reactive.converter();
	let server = TestServer::start(Arc::new(dispatcher(converter, routes()))).await;

	// Act
	let channel_reply = server.get("/channel").await;

	// Assert
	assert_eq!(channel_reply.status, StatusCode::OK);
	assert_eq!(channel_reply.text(), "tokio");
}

#[rstest]
#[serial(logging)]
fn test_logging_initialises_from_settings() {
	// Arrange
	let settings = Settings::from_toml_str(SETTINGS).unwrap();

	// Act
	let first = ripple::logging::init(&settings.logging);
	let second = ripple::logging::init(&settings.logging);

	// Assert
	assert!(first.is_ok());
	assert!(!second.unwrap());
}
