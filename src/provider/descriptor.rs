//! Provider descriptor data structures shared by the handshake and the Drive client.

/// Builder API for assembling provider descriptors.
pub mod builder;

pub use builder::*;

// self
use crate::_prelude::*;

/// Google's OAuth 2.0 authorization endpoint.
pub const GOOGLE_AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
/// Google's OAuth 2.0 token endpoint.
pub const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
/// Drive v3 REST base.
pub const GOOGLE_DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";
/// Drive v3 media upload base.
pub const GOOGLE_DRIVE_UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Authorization endpoint the browser is sent to.
	pub authorization: Url,
	/// Token endpoint used for the code exchange.
	pub token: Url,
	/// Drive REST base (`{base}/files`, `{base}/files/{id}`).
	pub drive_api: Url,
	/// Drive upload base (`{base}/files?uploadType=multipart`).
	pub drive_upload: Url,
}

/// Immutable provider descriptor consumed by flows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// Scopes requested on the authorization URL, in configuration order.
	pub scopes: Vec<String>,
}
impl ProviderDescriptor {
	/// Creates a new builder.
	pub fn builder() -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new()
	}

	/// Builder preloaded with Google's public endpoints.
	///
	/// An endpoint that fails to parse stays unset and is reported by
	/// [`ProviderDescriptorBuilder::build`].
	pub fn google() -> ProviderDescriptorBuilder {
		let mut builder = ProviderDescriptorBuilder::new();

		if let Ok(url) = Url::parse(GOOGLE_AUTHORIZATION_ENDPOINT) {
			builder = builder.authorization_endpoint(url);
		}
		if let Ok(url) = Url::parse(GOOGLE_TOKEN_ENDPOINT) {
			builder = builder.token_endpoint(url);
		}
		if let Ok(url) = Url::parse(GOOGLE_DRIVE_API_BASE) {
			builder = builder.drive_api_base(url);
		}
		if let Ok(url) = Url::parse(GOOGLE_DRIVE_UPLOAD_BASE) {
			builder = builder.drive_upload_base(url);
		}

		builder
	}
}
