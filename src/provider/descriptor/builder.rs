// self
use crate::{
	_prelude::*,
	provider::{ProviderDescriptor, ProviderEndpoints},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ProviderDescriptorError {
	/// Authorization endpoint is required to start the handshake.
	#[error("Missing authorization endpoint.")]
	MissingAuthorizationEndpoint,
	/// Token endpoint is mandatory for the code exchange.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// Drive REST base is mandatory for file operations.
	#[error("Missing Drive API base URL.")]
	MissingDriveApiBase,
	/// Drive upload base is mandatory for uploads.
	#[error("Missing Drive upload base URL.")]
	MissingDriveUploadBase,
	/// Endpoints must be HTTP(S) URLs that can carry path segments.
	#[error("The {endpoint} endpoint must be an http(s) URL: {url}.")]
	UnsupportedEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug, Default)]
pub struct ProviderDescriptorBuilder {
	/// Authorization endpoint.
	pub authorization_endpoint: Option<Url>,
	/// Token endpoint used for code exchanges.
	pub token_endpoint: Option<Url>,
	/// Drive REST base.
	pub drive_api_base: Option<Url>,
	/// Drive upload base.
	pub drive_upload_base: Option<Url>,
	/// Requested scopes.
	pub scopes: Vec<String>,
}
impl ProviderDescriptorBuilder {
	/// Creates an empty builder.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the Drive REST base.
	pub fn drive_api_base(mut self, url: Url) -> Self {
		self.drive_api_base = Some(url);

		self
	}

	/// Sets the Drive upload base.
	pub fn drive_upload_base(mut self, url: Url) -> Self {
		self.drive_upload_base = Some(url);

		self
	}

	/// Appends scopes, skipping blank entries.
	pub fn scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		for scope in scopes.into_iter().map(Into::into) {
			let scope = scope.trim();

			if !scope.is_empty() && !self.scopes.iter().any(|existing| existing == scope) {
				self.scopes.push(scope.to_owned());
			}
		}

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let authorization = self
			.authorization_endpoint
			.ok_or(ProviderDescriptorError::MissingAuthorizationEndpoint)?;
		let token = self.token_endpoint.ok_or(ProviderDescriptorError::MissingTokenEndpoint)?;
		let drive_api = self.drive_api_base.ok_or(ProviderDescriptorError::MissingDriveApiBase)?;
		let drive_upload =
			self.drive_upload_base.ok_or(ProviderDescriptorError::MissingDriveUploadBase)?;
		let descriptor = ProviderDescriptor {
			endpoints: ProviderEndpoints { authorization, token, drive_api, drive_upload },
			scopes: self.scopes,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ProviderDescriptor {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), ProviderDescriptorError> {
		validate_endpoint("authorization", &self.endpoints.authorization)?;
		validate_endpoint("token", &self.endpoints.token)?;
		validate_endpoint("drive_api", &self.endpoints.drive_api)?;
		validate_endpoint("drive_upload", &self.endpoints.drive_upload)?;

		Ok(())
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ProviderDescriptorError> {
	if matches!(url.scheme(), "https" | "http") && !url.cannot_be_a_base() {
		Ok(())
	} else {
		Err(ProviderDescriptorError::UnsupportedEndpoint { endpoint: name, url: url.to_string() })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse descriptor fixture URL.")
	}

	#[test]
	fn google_defaults_build_with_scopes() {
		let descriptor = ProviderDescriptor::google()
			.scopes(["https://www.googleapis.com/auth/drive", "", "openid", " openid ", "email"])
			.build()
			.expect("Google defaults should build.");

		assert_eq!(
			descriptor.endpoints.token.as_str(),
			"https://oauth2.googleapis.com/token"
		);
		assert_eq!(descriptor.scopes, ["https://www.googleapis.com/auth/drive", "openid", "email"]);
	}

	#[test]
	fn missing_endpoints_are_reported() {
		let err = ProviderDescriptor::builder()
			.authorization_endpoint(url("https://example.com/auth"))
			.build()
			.expect_err("Builder should reject a missing token endpoint.");

		assert_eq!(err, ProviderDescriptorError::MissingTokenEndpoint);
	}

	#[test]
	fn non_http_endpoints_are_rejected() {
		let err = ProviderDescriptor::google()
			.drive_api_base(url("mailto:drive@example.com"))
			.build()
			.expect_err("Builder should reject non-http endpoints.");

		assert!(matches!(
			err,
			ProviderDescriptorError::UnsupportedEndpoint { endpoint: "drive_api", .. }
		));
	}
}
