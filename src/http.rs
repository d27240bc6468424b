//! Transport shared by the token exchange and the Drive client.
//!
//! One pooled [`ReqwestClient`] serves the whole process. The token exchange goes through
//! [`TokenTransport`], an `oauth2` [`AsyncHttpClient`] that also remembers the token endpoint's
//! status code, so a failed exchange can be logged with the status that caused it.

// std
use std::ops::Deref;
// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
use reqwest::redirect::Policy;
// self
use crate::{_prelude::*, error::ConfigError};

/// Last status code seen by a [`TokenTransport`]; shared between the transport and the caller.
#[derive(Clone, Debug, Default)]
pub struct StatusSlot(Arc<Mutex<Option<u16>>>);
impl StatusSlot {
	/// Records `status`, replacing any earlier value.
	pub fn record(&self, status: u16) {
		*self.0.lock() = Some(status);
	}

	/// Takes the recorded status, leaving the slot empty.
	pub fn take(&self) -> Option<u16> {
		self.0.lock().take()
	}
}

/// Pooled HTTP client that never follows redirects.
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Builds the default client.
	pub fn new() -> Result<Self, ConfigError> {
		Ok(Self(ReqwestClient::builder().redirect(Policy::none()).build()?))
	}

	/// Wraps an existing client as-is.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Returns a token-endpoint transport reporting into `status`.
	pub fn token_transport(&self, status: StatusSlot) -> TokenTransport {
		TokenTransport { client: self.0.clone(), status }
	}
}
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

/// `oauth2` transport over the shared client; see [`ReqwestHttpClient::token_transport`].
#[derive(Clone, Debug)]
pub struct TokenTransport {
	client: ReqwestClient,
	status: StatusSlot,
}
impl TokenTransport {
	async fn execute(
		client: ReqwestClient,
		status: StatusSlot,
		request: HttpRequest,
	) -> Result<HttpResponse, HttpClientError<ReqwestError>> {
		status.take();

		let request: reqwest::Request = request.try_into().map_err(Box::new)?;
		let response = client.execute(request).await.map_err(Box::new)?;
		let code = response.status();
		let headers = response.headers().clone();

		status.record(code.as_u16());

		let body = response.bytes().await.map_err(Box::new)?;
		let mut converted = HttpResponse::new(body.to_vec());

		*converted.status_mut() = code;
		*converted.headers_mut() = headers;

		Ok(converted)
	}
}
impl<'c> AsyncHttpClient<'c> for TokenTransport {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		Box::pin(Self::execute(self.client.clone(), self.status.clone(), request))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn status_slot_is_consumed_on_take() {
		let slot = StatusSlot::default();
		let shared = slot.clone();

		shared.record(400);

		assert_eq!(slot.take(), Some(400));
		assert_eq!(slot.take(), None);
	}
}
