//! The dispatcher: routing, invocation and result handling for one exchange.

use crate::adapter::HandlerAdapter;
use crate::handler::{HandlerOutcome, HandlerResult};
use crate::mapping::HandlerMapping;
use crate::result::HandlerResultHandler;
use async_trait::async_trait;
use futures::channel::oneshot;
use http::StatusCode;
use ripple_core::exception::{Error, Result, panic_message};
use ripple_core::stream::{Publisher, Subscriber, Subscription};
use ripple_http::{HttpHandler, ServerHttpRequest, ServerHttpResponse};
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

/// Step of a single dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPhase {
	Routing,
	Invoking,
	Resulting,
	Done,
	Failed,
}

impl fmt::Display for DispatchPhase {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Routing => "routing",
			Self::Invoking => "invoking",
			Self::Resulting => "resulting",
			Self::Done => "done",
			Self::Failed => "failed",
		})
	}
}

/// Routes each exchange to a handler, invokes it through the first supporting
/// adapter and renders the result with the first supporting result handler.
///
/// A request no mapping claims gets `404 Not Found` and completes
/// successfully. Every other failure is returned once, unrendered.
///
/// # Examples
///
/// ```
/// use ripple_dispatch::{
///     BytesResultHandler, DispatcherHandler, InvocableHandler, InvocableHandlerAdapter,
///     PathHandlerMapping,
/// };
/// use ripple_reactive::{Capabilities, CompositionConverter};
/// use http::Method;
///
/// let dispatcher = DispatcherHandler::builder()
///     .mapping(PathHandlerMapping::new().route(
///         Method::GET,
///         "/hello",
///         InvocableHandler::new(|_request| Ok("hello")).into_ref("hello"),
///     ))
///     .adapter(InvocableHandlerAdapter::new(CompositionConverter::new(Capabilities::all())))
///     .result_handler(BytesResultHandler::new())
///     .build();
///
/// assert_eq!(dispatcher.adapter_count(), 1);
/// ```
pub struct DispatcherHandler {
	mappings: Vec<Arc<dyn HandlerMapping>>,
	adapters: Vec<Arc<dyn HandlerAdapter>>,
	result_handlers: Vec<Arc<dyn HandlerResultHandler>>,
}

impl DispatcherHandler {
	pub fn builder() -> DispatcherHandlerBuilder {
		DispatcherHandlerBuilder::default()
	}

	pub fn mapping_count(&self) -> usize {
		self.mappings.len()
	}

	pub fn adapter_count(&self) -> usize {
		self.adapters.len()
	}

	pub fn result_handler_count(&self) -> usize {
		self.result_handlers.len()
	}

	/// Runs one dispatch to completion.
	pub async fn dispatch(&self, request: &ServerHttpRequest, response: &mut ServerHttpResponse) -> Result<()> {
		let mut phase = DispatchPhase::Routing;
		let outcome = self.run(request, response, &mut phase).await;
		match &outcome {
			Ok(()) => tracing::debug!(
				method = %request.method(),
				path = request.path(),
				phase = %DispatchPhase::Done,
				"dispatch complete"
			),
			Err(error) => tracing::debug!(
				method = %request.method(),
				path = request.path(),
				phase = %DispatchPhase::Failed,
				failed_in = %phase,
				%error,
				"dispatch failed"
			),
		}
		outcome
	}

	async fn run(
		&self,
		request: &ServerHttpRequest,
		response: &mut ServerHttpResponse,
		phase: &mut DispatchPhase,
	) -> Result<()> {
		let Some(handler) = self
			.mappings
			.iter()
			.find_map(|mapping| mapping.get_handler(request))
		else {
			tracing::debug!(path = request.path(), "no handler mapping matched");
			response.set_status(StatusCode::NOT_FOUND);
			return Ok(());
		};

		*phase = DispatchPhase::Invoking;
		tracing::trace!(handler = handler.name(), phase = %phase, "handler resolved");
		let adapter = self
			.adapters
			.iter()
			.find(|adapter| adapter.supports(&handler))
			.ok_or_else(|| Error::UnsupportedHandler(handler.name().to_string()))?;
		let outcome = catch_unwind(AssertUnwindSafe(|| adapter.handle(request, response, &handler)))
			.map_err(|payload| Error::HandlerPanicked(panic_message(payload.as_ref())))??;

		let result = match outcome {
			HandlerOutcome::Ready(result) => result,
			HandlerOutcome::Deferred(results) => match first_value(results).await? {
				Some(result) => result,
				None => {
					tracing::debug!(handler = handler.name(), "asynchronous result completed empty");
					return Ok(());
				}
			},
		};

		*phase = DispatchPhase::Resulting;
		tracing::trace!(value = %result.value().descriptor(), phase = %phase, "handling result");
		let result_handler = self
			.result_handlers
			.iter()
			.find(|result_handler| result_handler.supports(&result))
			.ok_or_else(|| Error::UnsupportedResult(result.value().descriptor().name().to_string()))?;
		result_handler.handle_result(request, response, result).await
	}
}

#[async_trait]
impl HttpHandler for DispatcherHandler {
	async fn handle(&self, request: &ServerHttpRequest, response: &mut ServerHttpResponse) -> Result<()> {
		self.dispatch(request, response).await
	}
}

impl fmt::Debug for DispatcherHandler {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DispatcherHandler")
			.field("mappings", &self.mappings.len())
			.field("adapters", &self.adapters.len())
			.field("result_handlers", &self.result_handlers.len())
			.finish()
	}
}

/// Builder for [`DispatcherHandler`].
///
/// Each list is sorted by `order()` at build time; registration order breaks
/// ties.
#[derive(Default)]
pub struct DispatcherHandlerBuilder {
	mappings: Vec<Arc<dyn HandlerMapping>>,
	adapters: Vec<Arc<dyn HandlerAdapter>>,
	result_handlers: Vec<Arc<dyn HandlerResultHandler>>,
}

impl DispatcherHandlerBuilder {
	pub fn mapping(self, mapping: impl HandlerMapping + 'static) -> Self {
		self.mapping_arc(Arc::new(mapping))
	}

	pub fn mapping_arc(mut self, mapping: Arc<dyn HandlerMapping>) -> Self {
		self.mappings.push(mapping);
		self
	}

	pub fn adapter(self, adapter: impl HandlerAdapter + 'static) -> Self {
		self.adapter_arc(Arc::new(adapter))
	}

	pub fn adapter_arc(mut self, adapter: Arc<dyn HandlerAdapter>) -> Self {
		self.adapters.push(adapter);
		self
	}

	pub fn result_handler(self, result_handler: impl HandlerResultHandler + 'static) -> Self {
		self.result_handler_arc(Arc::new(result_handler))
	}

	pub fn result_handler_arc(mut self, result_handler: Arc<dyn HandlerResultHandler>) -> Self {
		self.result_handlers.push(result_handler);
		self
	}

	pub fn build(mut self) -> DispatcherHandler {
		self.mappings.sort_by_key(|mapping| mapping.order());
		self.adapters.sort_by_key(|adapter| adapter.order());
		self.result_handlers.sort_by_key(|result_handler| result_handler.order());
		DispatcherHandler {
			mappings: self.mappings,
			adapters: self.adapters,
			result_handlers: self.result_handlers,
		}
	}
}

/// Consumes at most one value, cancelling the publisher once it arrives.
struct FirstValueSubscriber {
	subscription: Option<Subscription>,
	sender: Option<oneshot::Sender<Result<Option<HandlerResult>>>>,
}

impl FirstValueSubscriber {
	fn deliver(&mut self, signal: Result<Option<HandlerResult>>) {
		if let Some(sender) = self.sender.take() {
			let _ = sender.send(signal);
		}
	}
}

impl Subscriber<HandlerResult> for FirstValueSubscriber {
	fn on_subscribe(&mut self, subscription: Subscription) {
		subscription.request(1);
		self.subscription = Some(subscription);
	}

	fn on_next(&mut self, item: HandlerResult) {
		if let Some(subscription) = &self.subscription {
			subscription.cancel();
		}
		self.deliver(Ok(Some(item)));
	}

	fn on_error(&mut self, error: Error) {
		self.deliver(Err(error));
	}

	fn on_complete(&mut self) {
		self.deliver(Ok(None));
	}
}

async fn first_value(results: Publisher<HandlerResult>) -> Result<Option<HandlerResult>> {
	let (sender, receiver) = oneshot::channel();
	results
		.subscribe(FirstValueSubscriber {
			subscription: None,
			sender: Some(sender),
		})
		.await;
	receiver
		.await
		.map_err(|_| Error::Internal("handler result stream ended without a signal".to_string()))?
}
