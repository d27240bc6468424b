//! Browser sessions on `tower-sessions`: a signed `sid` cookie keyed into a [`SessionTable`].
//!
//! [`layer`] wraps the router. Handlers extract [`Session`] and go through [`current_user`],
//! [`require_user`], and [`bind_user`]. A session is only persisted, and the cookie only issued,
//! once a user is bound to it; requests that never bind a user leave no trace.

pub mod store;

pub use store::*;
pub use tower_sessions::Session;

// crates.io
use sha2::{Digest, Sha512};
use tower_sessions::{
	Expiry, SessionManagerLayer,
	cookie::{Key, SameSite},
	service::SignedCookie,
};
// self
use crate::{_prelude::*, auth::UserId};

/// Name of the cookie carrying the session identifier.
pub const SESSION_COOKIE_NAME: &str = "sid";
/// Session key the bound user is stored under.
pub const SESSION_USER_KEY: &str = "user_id";
/// Idle lifetime of a session; also the cookie's `Max-Age`.
pub const SESSION_TTL: Duration = Duration::hours(24);

/// Session middleware type installed by [`layer`].
pub type SessionLayer = SessionManagerLayer<SessionTable, SignedCookie>;

/// Derives the cookie signing key from the configured session secret.
pub fn derive_key(secret: &str) -> Key {
	let digest = Sha512::digest(secret.as_bytes());

	Key::from(digest.as_slice())
}

/// Builds the session middleware over `table`, signing cookies with `key`.
///
/// The cookie is HttpOnly, not Secure, scoped to `/`, and lives for [`SESSION_TTL`].
pub fn layer(table: SessionTable, key: Key) -> SessionLayer {
	SessionManagerLayer::new(table)
		.with_name(SESSION_COOKIE_NAME)
		.with_http_only(true)
		.with_secure(false)
		.with_same_site(SameSite::Lax)
		.with_path("/")
		.with_expiry(Expiry::OnInactivity(SESSION_TTL))
		.with_signed(key)
}

/// User bound to `session`, if any.
pub async fn current_user(session: &Session) -> Result<Option<UserId>> {
	Ok(session.get::<UserId>(SESSION_USER_KEY).await?)
}

/// Returns the bound user or an unauthenticated error.
pub async fn require_user(session: &Session) -> Result<UserId> {
	current_user(session).await?.ok_or_else(|| Error::unauthenticated("session has no bound user"))
}

/// Binds `user_id` to `session`, replacing any previous binding.
pub async fn bind_user(session: &Session, user_id: &UserId) -> Result<()> {
	session.insert(SESSION_USER_KEY, user_id).await?;

	Ok(())
}
