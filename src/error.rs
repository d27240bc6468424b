//! Gateway-level error types shared across flows, providers, stores, and the HTTP layer.

// self
use crate::_prelude::*;

/// Gateway-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gateway error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Provider answered with an error or an unreadable payload.
	#[error(transparent)]
	Upstream(#[from] UpstreamError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Session could not be read from or written to the session table.
	#[error("Session access failed.")]
	Session(
		#[from]
		#[source]
		tower_sessions::session::Error,
	),

	/// No user is bound to the session, or the bound user has no stored credentials.
	#[error("Request is not authenticated: {reason}.")]
	Unauthenticated {
		/// Human-readable reason, never shown to clients.
		reason: String,
	},
	/// A required request input was absent or empty.
	#[error("Missing required input `{field}`.")]
	MissingInput {
		/// Name of the absent field.
		field: &'static str,
	},
	/// Provider rejected the authorization grant.
	#[error("Provider rejected the grant: {reason}.")]
	InvalidGrant {
		/// Provider-supplied reason string.
		reason: String,
	},
}
impl Error {
	/// Shorthand for [`Error::Unauthenticated`].
	pub fn unauthenticated(reason: impl Into<String>) -> Self {
		Self::Unauthenticated { reason: reason.into() }
	}

	/// Returns `true` when the error means the caller has no usable identity.
	pub fn is_unauthenticated(&self) -> bool {
		matches!(self, Self::Unauthenticated { .. })
	}
}

/// Configuration and validation failures raised while assembling the gateway.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required environment variable is absent or empty.
	#[error("Environment variable `{name}` is required.")]
	MissingVar {
		/// Variable name.
		name: &'static str,
	},
	/// An environment variable holds a value that cannot be parsed.
	#[error("Environment variable `{name}` is invalid: {reason}.")]
	InvalidVar {
		/// Variable name.
		name: &'static str,
		/// Parsing failure summary.
		reason: String,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Provider descriptor contains an invalid URL.
	#[error("Descriptor contains an invalid URL.")]
	InvalidDescriptor {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// Provider descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] crate::provider::ProviderDescriptorError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures reported by (or decoded from) the provider.
#[derive(Debug, ThisError)]
pub enum UpstreamError {
	/// Provider returned a non-success status.
	#[error("Provider returned HTTP {status} for {operation}: {message}.")]
	Status {
		/// Operation label (e.g. `files.list`).
		operation: &'static str,
		/// HTTP status code.
		status: u16,
		/// Body preview or provider message.
		message: String,
	},
	/// Provider responded with JSON that does not match the expected shape.
	#[error("Provider returned malformed JSON for {operation}.")]
	MalformedResponse {
		/// Operation label.
		operation: &'static str,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Token endpoint answered without an identity token.
	#[error("Token endpoint response is missing id_token.")]
	MissingIdToken,
	/// Token endpoint returned an unexpected response.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	TokenEndpoint {
		/// Summary of the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
impl From<ReqwestError> for Error {
	fn from(e: ReqwestError) -> Self {
		if e.is_builder() {
			ConfigError::from(e).into()
		} else {
			TransportError::from(e).into()
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn unauthenticated_helper_is_detectable() {
		let err = Error::unauthenticated("no stored credentials");

		assert!(err.is_unauthenticated());
		assert!(err.to_string().contains("no stored credentials"));
		assert!(!Error::MissingInput { field: "code" }.is_unauthenticated());
	}

	#[test]
	fn upstream_status_message_names_operation() {
		let err: Error =
			UpstreamError::Status { operation: "files.list", status: 403, message: "denied".into() }
				.into();

		assert_eq!(err.to_string(), "Provider returned HTTP 403 for files.list: denied.");
	}
}
