//! Per-request assembly of authenticated Drive clients.

// self
use crate::{
	_prelude::*,
	auth::UserId,
	http::ReqwestHttpClient,
	provider::{DriveClient, ProviderEndpoints},
	session::{self, Session},
	store::CredentialStore,
};

/// Builds a fresh [`DriveClient`] from stored credentials on every call.
///
/// Clients are never cached, so a re-handshake takes effect on the very next request.
#[derive(Clone)]
pub struct ClientFactory {
	store: Arc<dyn CredentialStore>,
	http_client: ReqwestHttpClient,
	endpoints: ProviderEndpoints,
}
impl ClientFactory {
	/// Creates a factory over `store` sharing one pooled transport.
	pub fn new(
		store: Arc<dyn CredentialStore>,
		http_client: ReqwestHttpClient,
		endpoints: ProviderEndpoints,
	) -> Self {
		Self { store, http_client, endpoints }
	}

	/// Returns a client for `user`, or an unauthenticated error when nothing is stored.
	pub async fn build(&self, user: &UserId) -> Result<DriveClient> {
		let credentials = self
			.store
			.get(user)
			.await?
			.ok_or_else(|| Error::unauthenticated("no stored credentials for user"))?;

		Ok(DriveClient::new(self.http_client.clone(), self.endpoints.clone(), credentials))
	}

	/// Resolves the session's user and builds a client for it.
	pub async fn for_session(&self, session: &Session) -> Result<DriveClient> {
		let user = session::require_user(session).await?;

		self.build(&user).await
	}
}
impl Debug for ClientFactory {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientFactory").field("endpoints", &self.endpoints).finish_non_exhaustive()
	}
}
