//! Callback handshake and session synchronization.

// self
use crate::{
	_prelude::*,
	auth::UserId,
	oauth::OAuthClient,
	obs::{self, FlowKind},
	session::{self, Session},
	store::CredentialStore,
};

/// Error reported to the opener window when the exchange fails.
pub const HANDSHAKE_FAILED: &str = "Authentication failed.";

/// Result of a completed callback, rendered into the popup page either way.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandshakeOutcome {
	/// Tokens were stored and the session now carries `user_id`.
	Success {
		/// Key of the newly stored credentials.
		user_id: UserId,
	},
	/// The exchange failed; nothing was stored and the session is unchanged.
	Failure {
		/// Generic, client-safe error text.
		error: &'static str,
	},
}
impl HandshakeOutcome {
	/// Returns `true` for [`HandshakeOutcome::Success`].
	pub fn is_success(&self) -> bool {
		matches!(self, Self::Success { .. })
	}
}

/// Completes handshakes and binds users to sessions.
#[derive(Clone)]
pub struct SessionBinder {
	oauth: Arc<OAuthClient>,
	store: Arc<dyn CredentialStore>,
}
impl SessionBinder {
	/// Creates a binder writing into `store`.
	pub fn new(oauth: Arc<OAuthClient>, store: Arc<dyn CredentialStore>) -> Self {
		Self { oauth, store }
	}

	/// Consent URL for the configured provider and scopes.
	pub fn authorize_url(&self) -> Url {
		self.oauth.authorize_url()
	}

	/// Exchanges `code`, stores the resulting credentials, and binds the user to `session`.
	///
	/// A missing or empty `code` is rejected before any provider call. Exchange and storage
	/// failures are logged and folded into [`HandshakeOutcome::Failure`].
	pub async fn complete_handshake(
		&self,
		session: &Session,
		code: Option<&str>,
	) -> Result<HandshakeOutcome> {
		let code =
			code.filter(|value| !value.is_empty()).ok_or(Error::MissingInput { field: "code" })?;
		let exchange = async {
			let grant = self.oauth.exchange_code(code).await?;

			self.store.set(grant.user_id.clone(), grant.credentials).await?;

			Ok::<_, Error>(grant.user_id)
		};

		match obs::observe(FlowKind::Handshake, "complete_handshake", exchange).await {
			Ok(user_id) => {
				session::bind_user(session, &user_id).await?;
				tracing::info!(user = ?user_id, "Handshake completed.");

				Ok(HandshakeOutcome::Success { user_id })
			},
			Err(e) => {
				tracing::error!(error = %e, "Token exchange failed.");

				Ok(HandshakeOutcome::Failure { error: HANDSHAKE_FAILED })
			},
		}
	}

	/// Binds a client-supplied user id to `session` without checking the credential store.
	///
	/// Subsequent proxied calls answer 401 if no credentials exist for that id.
	pub async fn sync_session(&self, session: &Session, user_id: Option<&str>) -> Result<UserId> {
		let user_id = user_id
			.and_then(|value| UserId::new(value).ok())
			.ok_or(Error::MissingInput { field: "userId" })?;
		let bind = async {
			session::bind_user(session, &user_id).await?;
			tracing::debug!(user = ?user_id, "Session synchronized.");

			Ok::<_, Error>(())
		};

		obs::FlowSpan::new(FlowKind::SessionSync, "sync_session").wrap(bind).await?;

		Ok(user_id)
	}
}
impl Debug for SessionBinder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionBinder").field("oauth", &self.oauth).finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use httpmock::prelude::*;
	// self
	use super::*;
	use crate::{
		_preludet::test_session,
		http::ReqwestHttpClient,
		provider::ProviderDescriptor,
		store::MemoryStore,
	};

	fn binder(server: &MockServer, store: Arc<MemoryStore>) -> SessionBinder {
		let descriptor = ProviderDescriptor::builder()
			.authorization_endpoint(Url::parse(&server.url("/auth")).expect("URL should parse."))
			.token_endpoint(Url::parse(&server.url("/token")).expect("URL should parse."))
			.drive_api_base(Url::parse(&server.url("/drive/v3")).expect("URL should parse."))
			.drive_upload_base(Url::parse(&server.url("/upload/drive/v3")).expect("URL should parse."))
			.scopes(["openid"])
			.build()
			.expect("Descriptor fixture should build.");
		let redirect =
			Url::parse("http://localhost/api/auth/callback").expect("Redirect should parse.");
		let oauth = OAuthClient::from_descriptor(
			&descriptor,
			"client",
			"secret",
			&redirect,
			ReqwestHttpClient::with_client(ReqwestClient::new()),
		)
		.expect("OAuth client should build.");

		SessionBinder::new(Arc::new(oauth), store)
	}

	#[tokio::test]
	async fn missing_code_is_rejected_without_provider_call() {
		let server = MockServer::start_async().await;
		let mock = server.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200);
		})
		.await;
		let binder = binder(&server, Arc::new(MemoryStore::default()));
		let session = test_session();

		for code in [None, Some("")] {
			let err = binder
				.complete_handshake(&session, code)
				.await
				.expect_err("Missing code must be rejected.");

			assert!(matches!(err, Error::MissingInput { field: "code" }));
		}

		mock.assert_calls_async(0).await;
		assert!(session.id().is_none());
		assert_eq!(session::current_user(&session).await.expect("Lookup should succeed."), None);
	}

	#[tokio::test]
	async fn failed_exchange_leaves_store_and_session_untouched() {
		let server = MockServer::start_async().await;
		let mock = server.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\"}");
		})
		.await;
		let store = Arc::new(MemoryStore::default());
		let binder = binder(&server, store.clone());
		let session = test_session();
		let outcome = binder
			.complete_handshake(&session, Some("bad-code"))
			.await
			.expect("Exchange failures fold into an outcome.");

		mock.assert_calls_async(1).await;
		assert_eq!(outcome, HandshakeOutcome::Failure { error: HANDSHAKE_FAILED });
		assert!(store.is_empty());
		assert_eq!(session::current_user(&session).await.expect("Lookup should succeed."), None);
	}

	#[tokio::test]
	async fn successful_exchange_stores_and_binds() {
		let server = MockServer::start_async().await;
		let _mock = server.mock_async(|when, then| {
			when.method(POST).path("/token").body_includes("code=good-code");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"at-1\",\"refresh_token\":\"rt-1\",\"token_type\":\"Bearer\",\"expires_in\":3599,\"id_token\":\"idtok.user.one\"}",
			);
		})
		.await;
		let store = Arc::new(MemoryStore::default());
		let binder = binder(&server, store.clone());
		let session = test_session();
		let outcome = binder
			.complete_handshake(&session, Some("good-code"))
			.await
			.expect("Exchange should complete.");
		let user_id = UserId::new("idtok.user.one").expect("User fixture should be valid.");

		assert_eq!(outcome, HandshakeOutcome::Success { user_id: user_id.clone() });
		assert_eq!(
			session::current_user(&session).await.expect("Lookup should succeed."),
			Some(user_id.clone())
		);

		let stored = store.credentials(&user_id).expect("Credentials should be stored.");

		assert_eq!(stored.access_token.expose(), "at-1");
		assert!(stored.has_refresh_token());
	}

	#[tokio::test]
	async fn sync_requires_non_empty_user_id() {
		let server = MockServer::start_async().await;
		let binder = binder(&server, Arc::new(MemoryStore::default()));
		let session = test_session();

		assert!(binder.sync_session(&session, None).await.is_err());
		assert!(binder.sync_session(&session, Some("")).await.is_err());
		assert_eq!(session::current_user(&session).await.expect("Lookup should succeed."), None);

		let user =
			binder.sync_session(&session, Some("unknown-user")).await.expect("Sync should bind.");

		assert_eq!(
			session::current_user(&session).await.expect("Lookup should succeed."),
			Some(user)
		);
	}
}
