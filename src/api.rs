//! HTTP surface: routes under `/api`, shared state, CORS, and request tracing.

pub mod auth;
pub mod error;
pub mod files;
pub mod popup;

pub use error::*;

// crates.io
use axum::{
	Router,
	extract::{DefaultBodyLimit, FromRef},
	http::{HeaderValue, Method, header::CONTENT_TYPE},
	routing::{get, post},
};
use tower_http::{
	cors::{AllowHeaders, CorsLayer},
	trace::TraceLayer,
};
use tower_sessions::cookie::Key;
// self
use crate::{
	_prelude::*,
	config::AppConfig,
	error::ConfigError,
	flows::{ClientFactory, SessionBinder},
	http::ReqwestHttpClient,
	oauth::OAuthClient,
	session::{self, SessionTable},
	store::CredentialStore,
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
	/// Handshake and session-sync orchestration.
	pub binder: SessionBinder,
	/// Per-request Drive client assembly.
	pub clients: ClientFactory,
	/// Server-side session table.
	pub sessions: SessionTable,
	cookie_key: Key,
	cors_origin: HeaderValue,
}
impl AppState {
	/// Wires the gateway from `config`, storing credentials in `credentials`.
	pub fn new(config: AppConfig, credentials: Arc<dyn CredentialStore>) -> Result<Self> {
		let http_client = ReqwestHttpClient::new()?;
		let oauth = OAuthClient::from_descriptor(
			&config.descriptor,
			&config.client_id,
			config.client_secret.expose(),
			&config.redirect_uri,
			http_client.clone(),
		)?;
		let cors_origin = HeaderValue::from_str(&config.cors_origin).map_err(|e| {
			ConfigError::InvalidVar { name: "CORS_ORIGIN", reason: e.to_string() }
		})?;

		Ok(Self {
			binder: SessionBinder::new(Arc::new(oauth), credentials.clone()),
			clients: ClientFactory::new(
				credentials,
				http_client,
				config.descriptor.endpoints.clone(),
			),
			sessions: SessionTable::default(),
			cookie_key: session::derive_key(config.session_secret.expose()),
			cors_origin,
		})
	}
}
impl Debug for AppState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AppState")
			.field("binder", &self.binder)
			.field("clients", &self.clients)
			.field("cors_origin", &self.cors_origin)
			.finish_non_exhaustive()
	}
}
impl FromRef<AppState> for SessionBinder {
	fn from_ref(state: &AppState) -> Self {
		state.binder.clone()
	}
}
impl FromRef<AppState> for ClientFactory {
	fn from_ref(state: &AppState) -> Self {
		state.clients.clone()
	}
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
	let cors = CorsLayer::new()
		.allow_origin(state.cors_origin.clone())
		.allow_credentials(true)
		.allow_methods([Method::GET, Method::POST, Method::OPTIONS])
		.allow_headers(AllowHeaders::list([CONTENT_TYPE]));
	let api = Router::new()
		.route("/auth", get(auth::authorize))
		.route("/auth/callback", get(auth::callback))
		.route("/auth/sync-session", post(auth::sync_session))
		.route("/files", get(files::list_files))
		.route("/files/{file_id}", get(files::download))
		.route("/folder/{folder_id}", get(files::list_folder))
		.route(
			"/upload",
			post(files::upload).layer(DefaultBodyLimit::max(files::UPLOAD_BODY_LIMIT)),
		);

	Router::new()
		.nest("/api", api)
		.layer(session::layer(state.sessions.clone(), state.cookie_key.clone()))
		.layer(cors)
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}
