//! HTTP error responses with a JSON `{ "error": ... }` body.

// crates.io
use axum::{
	Json,
	http::StatusCode,
	response::{IntoResponse, Response},
};
// self
use crate::{_prelude::*, obs::FlowKind};

/// Message returned for every unauthenticated request.
pub const UNAUTHORIZED: &str = "Unauthorized";

/// Client-facing failure; internal detail is logged, never serialized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiError {
	/// 400 with a fixed message.
	BadRequest(&'static str),
	/// 401 `Unauthorized`.
	Unauthorized,
	/// 413 with a fixed message.
	PayloadTooLarge(&'static str),
	/// 500 with a fixed, operation-specific message.
	Internal(&'static str),
}
impl ApiError {
	/// Maps a flow failure: unauthenticated becomes 401, everything else the 500 `fallback`.
	pub fn from_flow(kind: FlowKind, err: Error, fallback: &'static str) -> Self {
		match err {
			Error::Unauthenticated { reason } => {
				tracing::debug!(flow = %kind, reason = %reason, "Rejected unauthenticated request.");

				Self::Unauthorized
			},
			err => {
				tracing::error!(flow = %kind, error = %err, "Provider request failed.");

				Self::Internal(fallback)
			},
		}
	}

	/// Status code of the response.
	pub fn status(&self) -> StatusCode {
		match self {
			Self::BadRequest(_) => StatusCode::BAD_REQUEST,
			Self::Unauthorized => StatusCode::UNAUTHORIZED,
			Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
			Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// Client-facing message.
	pub fn message(&self) -> &'static str {
		match self {
			Self::BadRequest(message) | Self::PayloadTooLarge(message) | Self::Internal(message) =>
				*message,
			Self::Unauthorized => UNAUTHORIZED,
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		(self.status(), Json(ErrorBody { error: self.message() })).into_response()
	}
}

#[derive(Serialize)]
struct ErrorBody {
	error: &'static str,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::UpstreamError;

	#[test]
	fn unauthenticated_maps_to_401() {
		let err = ApiError::from_flow(
			FlowKind::ListFiles,
			Error::unauthenticated("no session"),
			"Error fetching files.",
		);

		assert_eq!(err, ApiError::Unauthorized);
		assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
		assert_eq!(err.message(), "Unauthorized");
	}

	#[test]
	fn provider_failures_hide_detail_behind_fallback() {
		let upstream =
			UpstreamError::Status { operation: "files.list", status: 403, message: "quota".into() };
		let err = ApiError::from_flow(FlowKind::ListFiles, upstream.into(), "Error fetching files.");

		assert_eq!(err, ApiError::Internal("Error fetching files."));
		assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
	}
}
