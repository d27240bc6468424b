//! Session-bound OAuth 2.0 gateway: completes the provider handshake, keeps the issued tokens
//! server-side keyed by user, and proxies Drive file operations on behalf of browser sessions.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
pub mod session;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and fixtures for tests; enabled via `cfg(test)` or the `test` crate
	//! feature.

	pub use crate::_prelude::*;

	// std
	use std::net::SocketAddr;
	// crates.io
	use tokio::net::TcpListener;
	// self
	use crate::{
		api::{self, AppState},
		config::AppConfig,
		session::{Session, SessionTable},
		store::{CredentialStore, MemoryStore},
	};

	/// Session secret used by every test fixture.
	pub const TEST_SESSION_SECRET: &str = "test-session-secret-with-enough-entropy";

	/// Builds a configuration whose provider endpoints all live under `provider_base`.
	///
	/// `provider_base` is typically an `httpmock` server URL such as `http://127.0.0.1:4321`.
	pub fn test_config(provider_base: &str) -> AppConfig {
		let base = provider_base.trim_end_matches('/');
		let vars = HashMap::from([
			("SESSION_SECRET", TEST_SESSION_SECRET.to_owned()),
			("GOOGLE_CLIENT_ID", "client-it".to_owned()),
			("GOOGLE_CLIENT_SECRET", "secret-it".to_owned()),
			("GOOGLE_REDIRECT_URI", "http://localhost:3000/api/auth/callback".to_owned()),
			("GOOGLE_DRIVE_SCOPE", "https://www.googleapis.com/auth/drive".to_owned()),
			("GOOGLE_OPEN_ID_SCOPE", "openid".to_owned()),
			("GOOGLE_EMAIL_SCOPE", "email".to_owned()),
			("GOOGLE_AUTH_URL", format!("{base}/o/oauth2/v2/auth")),
			("GOOGLE_TOKEN_URL", format!("{base}/token")),
			("GOOGLE_DRIVE_API_URL", format!("{base}/drive/v3")),
			("GOOGLE_DRIVE_UPLOAD_URL", format!("{base}/upload/drive/v3")),
		]);

		AppConfig::from_lookup(|key| vars.get(key).cloned())
			.expect("Test configuration should be valid.")
	}

	/// Running application bound to an ephemeral local port.
	#[derive(Debug)]
	pub struct TestApp {
		/// Socket address the router listens on.
		pub addr: SocketAddr,
		/// Credential store shared with the running router.
		pub store: Arc<MemoryStore>,
		/// Session table shared with the running router.
		pub sessions: SessionTable,
		/// HTTP client with a cookie jar so session cookies persist across calls.
		pub client: ReqwestClient,
	}
	impl TestApp {
		/// Serves the router for `config` and returns a cookie-aware client bound to it.
		pub async fn spawn(config: AppConfig) -> Self {
			let store = Arc::new(MemoryStore::default());
			let credentials: Arc<dyn CredentialStore> = store.clone();
			let state =
				AppState::new(config, credentials).expect("Application state should build.");
			let sessions = state.sessions.clone();
			let router = api::router(state);
			let listener =
				TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind an ephemeral port.");
			let addr = listener.local_addr().expect("Listener should expose its address.");

			tokio::spawn(async move {
				axum::serve(listener, router).await.expect("Test server should keep serving.");
			});

			Self { addr, store, sessions, client: test_reqwest_client() }
		}

		/// Builds an absolute URL for `path` on the running server.
		pub fn url(&self, path: &str) -> String {
			format!("http://{}{path}", self.addr)
		}
	}

	/// Anonymous session over a private table, as handlers see it before any user is bound.
	pub fn test_session() -> Session {
		Session::new(None, Arc::new(SessionTable::default()), None)
	}

	/// Builds a reqwest client that keeps cookies between requests.
	pub fn test_reqwest_client() -> ReqwestClient {
		ReqwestClient::builder()
			.cookie_store(true)
			.build()
			.expect("Failed to build cookie-aware Reqwest client for tests.")
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
use color_eyre as _;
#[cfg(test)] use httpmock as _;
