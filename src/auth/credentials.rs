//! Provider credentials stored per user after a successful handshake.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Bearer credentials issued by the provider for one user.
///
/// Records are written once per successful handshake and replaced wholesale on the next one;
/// there is no merge and no refresh.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
	/// Access token presented as the bearer credential on every provider call.
	pub access_token: TokenSecret,
	/// Refresh token, if the provider issued one. Stored but never exercised.
	pub refresh_token: Option<TokenSecret>,
	/// Instant the handshake completed.
	pub issued_at: OffsetDateTime,
}
impl Credentials {
	/// Builds a record stamped with the current clock.
	pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			refresh_token: refresh_token.filter(|value| !value.is_empty()).map(TokenSecret::new),
			issued_at: OffsetDateTime::now_utc(),
		}
	}

	/// Returns `true` when a refresh token was issued alongside the access token.
	pub fn has_refresh_token(&self) -> bool {
		self.refresh_token.is_some()
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("issued_at", &self.issued_at)
			.finish()
	}
}
