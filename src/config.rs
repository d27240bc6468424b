//! Environment-driven application configuration.

// std
use std::path::PathBuf;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::ConfigError,
	provider::ProviderDescriptor,
};

/// Address bound when `HOST` is unset.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Port bound when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 3000;
/// Browser origin allowed by CORS when `CORS_ORIGIN` is unset.
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:4200";

const SCOPE_VARS: [&str; 3] = ["GOOGLE_DRIVE_SCOPE", "GOOGLE_OPEN_ID_SCOPE", "GOOGLE_EMAIL_SCOPE"];

/// Loads an optional `.env` file into the process environment, returning its path if found.
///
/// Variables already present in the environment take precedence.
pub fn load_dotenv() -> Option<PathBuf> {
	dotenvy::dotenv().ok()
}

/// Fully validated runtime configuration.
#[derive(Clone, Debug)]
pub struct AppConfig {
	/// Secret the session cookie signing key is derived from.
	pub session_secret: TokenSecret,
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: TokenSecret,
	/// Callback URL registered with the provider.
	pub redirect_uri: Url,
	/// Provider endpoints and requested scopes.
	pub descriptor: ProviderDescriptor,
	/// Listen host.
	pub host: String,
	/// Listen port.
	pub port: u16,
	/// Single browser origin allowed to call the API with credentials.
	pub cors_origin: String,
}
impl AppConfig {
	/// Reads the configuration from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Reads the configuration through `lookup`; empty values count as unset.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let var = |name: &str| {
			lookup(name).map(|value| value.trim().to_owned()).filter(|value| !value.is_empty())
		};
		let required = |name: &'static str| var(name).ok_or(ConfigError::MissingVar { name });
		let session_secret = TokenSecret::new(required("SESSION_SECRET")?);
		let client_id = required("GOOGLE_CLIENT_ID")?;
		let client_secret = TokenSecret::new(required("GOOGLE_CLIENT_SECRET")?);
		let redirect_uri = parse_url("GOOGLE_REDIRECT_URI", &required("GOOGLE_REDIRECT_URI")?)?;
		let mut builder =
			ProviderDescriptor::google().scopes(SCOPE_VARS.iter().filter_map(|name| var(*name)));

		if let Some(value) = var("GOOGLE_AUTH_URL") {
			builder = builder.authorization_endpoint(parse_url("GOOGLE_AUTH_URL", &value)?);
		}
		if let Some(value) = var("GOOGLE_TOKEN_URL") {
			builder = builder.token_endpoint(parse_url("GOOGLE_TOKEN_URL", &value)?);
		}
		if let Some(value) = var("GOOGLE_DRIVE_API_URL") {
			builder = builder.drive_api_base(parse_url("GOOGLE_DRIVE_API_URL", &value)?);
		}
		if let Some(value) = var("GOOGLE_DRIVE_UPLOAD_URL") {
			builder = builder.drive_upload_base(parse_url("GOOGLE_DRIVE_UPLOAD_URL", &value)?);
		}

		let descriptor = builder.build()?;
		let host = var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned());
		let port = match var("PORT") {
			Some(value) => value
				.parse()
				.map_err(|e| ConfigError::InvalidVar { name: "PORT", reason: format!("{e}") })?,
			None => DEFAULT_PORT,
		};
		let cors_origin = var("CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_owned());

		Ok(Self {
			session_secret,
			client_id,
			client_secret,
			redirect_uri,
			descriptor,
			host,
			port,
			cors_origin,
		})
	}

	/// `host:port` string suitable for binding a listener.
	pub fn listen_addr(&self) -> String {
		format!("{}:{}", self.host, self.port)
	}
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
	Url::parse(value).map_err(|e| ConfigError::InvalidVar { name, reason: e.to_string() })
}
