//! Handshake endpoints.

// crates.io
use axum::{
	Json,
	body::Bytes,
	extract::{Query, State},
	response::Html,
};
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	api::{ApiError, popup},
	flows::{HANDSHAKE_FAILED, SessionBinder},
	obs::FlowKind,
	session::Session,
};

/// Body of `GET /api/auth`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeResponse {
	/// Consent URL to open in a popup.
	pub auth_url: String,
}

/// Query of `GET /api/auth/callback`.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
	/// Authorization code issued by the provider.
	pub code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SyncRequest {
	#[serde(default)]
	user_id: Option<Value>,
}
impl SyncRequest {
	// Truthy scalars are keys; numbers and `true` are keyed by their JSON text.
	fn user_key(&self) -> Option<String> {
		match self.user_id.as_ref()? {
			Value::String(value) => Some(value.clone()),
			Value::Number(number) if number.as_f64() != Some(0.0) => Some(number.to_string()),
			Value::Bool(true) => Some("true".to_owned()),
			_ => None,
		}
	}
}

/// Body of a successful `POST /api/auth/sync-session`.
#[derive(Debug, Serialize)]
pub struct SyncResponse {
	/// Always `true`.
	pub success: bool,
	/// Confirmation text.
	pub message: &'static str,
}

/// `GET /api/auth`: returns the consent URL.
pub async fn authorize(State(binder): State<SessionBinder>) -> Json<AuthorizeResponse> {
	Json(AuthorizeResponse { auth_url: binder.authorize_url().into() })
}

/// `GET /api/auth/callback`: completes the handshake and answers with the popup page.
pub async fn callback(
	State(binder): State<SessionBinder>,
	session: Session,
	Query(params): Query<CallbackParams>,
) -> Result<Html<String>, ApiError> {
	let outcome = binder
		.complete_handshake(&session, params.code.as_deref())
		.await
		.map_err(|e| match e {
			Error::MissingInput { .. } => ApiError::BadRequest("Authorization code is required."),
			e => ApiError::from_flow(FlowKind::Handshake, e, HANDSHAKE_FAILED),
		})?;

	Ok(Html(popup::render(&outcome)))
}

/// `POST /api/auth/sync-session`: binds a client-supplied user id to the session.
///
/// The body is parsed leniently. A 400 is returned unless it is a JSON object whose `userId` is
/// a non-empty string, a non-zero number, or `true`.
pub async fn sync_session(
	State(binder): State<SessionBinder>,
	session: Session,
	body: Bytes,
) -> Result<Json<SyncResponse>, ApiError> {
	let request: SyncRequest = serde_json::from_slice(&body).unwrap_or_default();

	binder.sync_session(&session, request.user_key().as_deref()).await.map_err(|e| match e {
		Error::MissingInput { .. } => ApiError::BadRequest("User ID is required."),
		e => ApiError::from_flow(FlowKind::SessionSync, e, "Failed to synchronize session."),
	})?;

	Ok(Json(SyncResponse { success: true, message: "Session synchronized." }))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn key(body: &str) -> Option<String> {
		serde_json::from_str::<SyncRequest>(body).unwrap_or_default().user_key()
	}

	#[test]
	fn sync_request_accepts_truthy_scalars() {
		assert_eq!(key("{\"userId\":\"idtok.a.sig\"}").as_deref(), Some("idtok.a.sig"));
		assert_eq!(key("{\"userId\":42}").as_deref(), Some("42"));
		assert_eq!(key("{\"userId\":1.5}").as_deref(), Some("1.5"));
		assert_eq!(key("{\"userId\":true}").as_deref(), Some("true"));
	}

	#[test]
	fn sync_request_rejects_falsy_or_structured_values() {
		for body in [
			"{}",
			"{\"userId\":null}",
			"{\"userId\":0}",
			"{\"userId\":false}",
			"{\"userId\":[1]}",
			"{\"userId\":{\"id\":1}}",
			"not json",
		] {
			assert_eq!(key(body), None, "{body} should not yield a user key");
		}

		assert_eq!(key("{\"userId\":\"\"}").as_deref(), Some(""));
	}
}
