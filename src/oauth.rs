//! OAuth client facade: authorize-URL construction and the authorization-code exchange.

pub use oauth2;

// crates.io
use oauth2::{
	AuthUrl, AuthorizationCode, Client, ClientId, ClientSecret, CsrfToken, EndpointNotSet,
	EndpointSet, ExtraTokenFields, HttpClientError, RedirectUrl, RequestTokenError, Scope,
	StandardRevocableToken, StandardTokenResponse, TokenResponse, TokenUrl,
	basic::{
		BasicErrorResponse, BasicRequestTokenError, BasicRevocationErrorResponse,
		BasicTokenIntrospectionResponse, BasicTokenType,
	},
};
// self
use crate::{
	_prelude::*,
	auth::{Credentials, UserId},
	error::{ConfigError, TransportError, UpstreamError},
	http::{ReqwestHttpClient, StatusSlot},
	provider::ProviderDescriptor,
};

type GrantResponse = StandardTokenResponse<IdTokenFields, BasicTokenType>;
type ConfiguredClient = Client<
	BasicErrorResponse,
	GrantResponse,
	BasicTokenIntrospectionResponse,
	StandardRevocableToken,
	BasicRevocationErrorResponse,
	EndpointSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointSet,
>;

/// OpenID Connect extension carried by the token endpoint response.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct IdTokenFields {
	/// Raw identity token, kept as an opaque string and never decoded.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id_token: Option<String>,
}
impl ExtraTokenFields for IdTokenFields {}

/// Tokens obtained from a successful authorization-code exchange.
#[derive(Clone, Debug)]
pub struct TokenGrant {
	/// User key derived from the identity token string.
	pub user_id: UserId,
	/// Access and refresh tokens to store for that user.
	pub credentials: Credentials,
}

/// Confidential OAuth client configured from a [`ProviderDescriptor`].
pub struct OAuthClient {
	oauth_client: ConfiguredClient,
	http_client: ReqwestHttpClient,
	scopes: Vec<String>,
}
impl OAuthClient {
	/// Builds the client from the descriptor and the registered client credentials.
	pub fn from_descriptor(
		descriptor: &ProviderDescriptor,
		client_id: &str,
		client_secret: &str,
		redirect_uri: &Url,
		http_client: ReqwestHttpClient,
	) -> Result<Self> {
		let auth_url = AuthUrl::new(descriptor.endpoints.authorization.to_string())
			.map_err(|source| ConfigError::InvalidDescriptor { source })?;
		let token_url = TokenUrl::new(descriptor.endpoints.token.to_string())
			.map_err(|source| ConfigError::InvalidDescriptor { source })?;
		let redirect_url = RedirectUrl::new(redirect_uri.to_string())
			.map_err(|source| ConfigError::InvalidDescriptor { source })?;
		let oauth_client = Client::new(ClientId::new(client_id.to_owned()))
			.set_client_secret(ClientSecret::new(client_secret.to_owned()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url)
			.set_redirect_uri(redirect_url);

		Ok(Self { oauth_client, http_client, scopes: descriptor.scopes.clone() })
	}

	/// Builds the URL the browser visits to grant offline access for the configured scopes.
	///
	/// The generated `state` is not persisted and is not checked on the callback.
	pub fn authorize_url(&self) -> Url {
		let mut request = self
			.oauth_client
			.authorize_url(CsrfToken::new_random)
			.add_extra_param("access_type", "offline");

		for scope in &self.scopes {
			request = request.add_scope(Scope::new(scope.clone()));
		}

		let (url, _state) = request.url();

		url
	}

	/// Exchanges `code` for tokens in one round trip to the token endpoint.
	///
	/// The identity token string becomes the [`UserId`] as-is; its signature and claims are
	/// not checked.
	pub async fn exchange_code(&self, code: &str) -> Result<TokenGrant> {
		let status = StatusSlot::default();
		let transport = self.http_client.token_transport(status.clone());
		let response = self
			.oauth_client
			.exchange_code(AuthorizationCode::new(code.to_owned()))
			.request_async(&transport)
			.await
			.map_err(|err| map_request_error(status.take(), err))?;

		map_grant_response(response)
	}
}
impl Debug for OAuthClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuthClient")
			.field("client_id", &self.oauth_client.client_id().as_str())
			.field("scopes", &self.scopes)
			.finish()
	}
}

fn map_grant_response(response: GrantResponse) -> Result<TokenGrant> {
	let id_token = response
		.extra_fields()
		.id_token
		.as_deref()
		.filter(|token| !token.is_empty())
		.ok_or(UpstreamError::MissingIdToken)?;
	let user_id = UserId::new(id_token).map_err(|_| UpstreamError::MissingIdToken)?;
	let credentials = Credentials::new(
		response.access_token().secret().to_owned(),
		response.refresh_token().map(|token| token.secret().to_owned()),
	);

	Ok(TokenGrant { user_id, credentials })
}

fn map_request_error(
	status: Option<u16>,
	err: BasicRequestTokenError<HttpClientError<ReqwestError>>,
) -> Error {
	match err {
		RequestTokenError::ServerResponse(response) => {
			let reason = match response.error_description() {
				Some(description) => format!("{}: {description}", response.error().as_ref()),
				None => response.error().as_ref().to_owned(),
			};

			Error::InvalidGrant { reason }
		},
		RequestTokenError::Request(error) => map_transport_error(status, error),
		RequestTokenError::Parse(error, _body) =>
			UpstreamError::MalformedResponse { operation: "token.exchange", source: error }.into(),
		RequestTokenError::Other(message) =>
			UpstreamError::TokenEndpoint { message, status }.into(),
	}
}

fn map_transport_error(status: Option<u16>, err: HttpClientError<ReqwestError>) -> Error {
	match err {
		HttpClientError::Reqwest(inner) => (*inner).into(),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) => UpstreamError::TokenEndpoint { message, status }.into(),
		_ => UpstreamError::TokenEndpoint {
			message: "HTTP client error occurred while calling the token endpoint".into(),
			status,
		}
		.into(),
	}
}
