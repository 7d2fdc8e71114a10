use crate::request::ServerHttpRequest;
use crate::response::ServerHttpResponse;
use async_trait::async_trait;
use ripple_core::exception::Result;
use std::sync::Arc;

/// Processes one request/response exchange.
///
/// This is the contract between a transport and whatever handles requests,
/// typically a dispatcher. An `Err` means the exchange failed; rendering it is
/// left to the caller.
#[async_trait]
pub trait HttpHandler: Send + Sync {
	async fn handle(&self, request: &ServerHttpRequest, response: &mut ServerHttpResponse) -> Result<()>;
}

#[async_trait]
impl<H> HttpHandler for Arc<H>
where
	H: HttpHandler + ?Sized,
{
	async fn handle(&self, request: &ServerHttpRequest, response: &mut ServerHttpResponse) -> Result<()> {
		(**self).handle(request, response).await
	}
}
