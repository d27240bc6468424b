//! Proxied Drive operations; every handler requires a session bound to a stored user.

// crates.io
use axum::{
	Json,
	body::{Body, Bytes},
	extract::{
		Multipart, Path, State,
		multipart::{MultipartError, MultipartRejection},
	},
	http::{
		HeaderValue, StatusCode,
		header::{CONTENT_DISPOSITION, CONTENT_TYPE},
	},
	response::{IntoResponse, Response},
};
// self
use crate::{
	_prelude::*,
	api::ApiError,
	flows::ClientFactory,
	obs::{self, FlowKind},
	provider::{FileSummary, OCTET_STREAM, UploadMedia},
	session::{self, Session},
};

/// Largest accepted upload, in bytes.
pub const UPLOAD_LIMIT: usize = 10 * 1024 * 1024;
/// Request body cap for the upload route; leaves room for multipart framing.
pub const UPLOAD_BODY_LIMIT: usize = UPLOAD_LIMIT + 64 * 1024;

const UPLOAD_FIELD: &str = "file";
const INVALID_FILE: &str = "Invalid file data.";
const FILE_TOO_LARGE: &str = "File exceeds the 10 MiB upload limit.";

/// Body of a successful `POST /api/upload`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
	/// Always `true`.
	pub success: bool,
	/// Identifier of the created file.
	pub file_id: String,
	/// Name the provider stored.
	pub file_name: String,
}

/// `GET /api/files`: filtered top-level listing.
pub async fn list_files(
	State(clients): State<ClientFactory>,
	session: Session,
) -> Result<Json<Vec<FileSummary>>, ApiError> {
	let kind = FlowKind::ListFiles;
	let files = obs::observe(kind, "list_files", async {
		clients.for_session(&session).await?.list_files().await
	})
	.await
	.map_err(|e| ApiError::from_flow(kind, e, "Error fetching files."))?;

	Ok(Json(files))
}

/// `GET /api/folder/{folder_id}`: direct children of one folder.
pub async fn list_folder(
	State(clients): State<ClientFactory>,
	session: Session,
	Path(folder_id): Path<String>,
) -> Result<Json<Vec<FileSummary>>, ApiError> {
	if folder_id.trim().is_empty() {
		return Err(ApiError::BadRequest("Folder ID is required."));
	}

	let kind = FlowKind::ListFolder;
	let files = obs::observe(kind, "list_folder", async {
		clients.for_session(&session).await?.list_folder(&folder_id).await
	})
	.await
	.map_err(|e| ApiError::from_flow(kind, e, "Failed to retrieve folder contents."))?;

	Ok(Json(files))
}

/// `GET /api/files/{file_id}`: streams the file content as an attachment.
pub async fn download(
	State(clients): State<ClientFactory>,
	session: Session,
	Path(file_id): Path<String>,
) -> Result<Response, ApiError> {
	let kind = FlowKind::Download;
	let (metadata, content) = obs::observe(kind, "download", async {
		let client = clients.for_session(&session).await?;
		let metadata = client.file_metadata(&file_id).await?;
		let content = client.download(&file_id).await?;

		Ok::<_, Error>((metadata, content))
	})
	.await
	.map_err(|e| ApiError::from_flow(kind, e, "Error fetching the file."))?;
	let content_type = metadata
		.mime_type
		.as_deref()
		.filter(|value| !value.is_empty())
		.and_then(|value| HeaderValue::from_str(value).ok())
		.unwrap_or_else(|| HeaderValue::from_static(OCTET_STREAM));
	let headers = [(CONTENT_TYPE, content_type), (CONTENT_DISPOSITION, attachment(&metadata.name))];

	Ok((headers, Body::from_stream(content)).into_response())
}

/// `POST /api/upload`: uploads the multipart field `file`.
///
/// The session is checked before the body is read, and the body is read chunk by chunk so an
/// oversized file is rejected as soon as it crosses [`UPLOAD_LIMIT`].
pub async fn upload(
	State(clients): State<ClientFactory>,
	session: Session,
	multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
	let kind = FlowKind::Upload;
	let user = session::require_user(&session)
		.await
		.map_err(|e| ApiError::from_flow(kind, e, INVALID_FILE))?;
	let media = read_upload(multipart.map_err(|_| ApiError::BadRequest(INVALID_FILE))?).await?;
	let created = obs::observe(kind, "upload", async {
		clients.build(&user).await?.create_file(media).await
	})
	.await
	.map_err(|e| ApiError::from_flow(kind, e, "Failed to upload file."))?;

	Ok(Json(UploadResponse { success: true, file_id: created.id, file_name: created.name }))
}

async fn read_upload(mut multipart: Multipart) -> Result<UploadMedia, ApiError> {
	let mut media = None;

	while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
		if field.name() != Some(UPLOAD_FIELD) {
			continue;
		}
		if media.is_some() {
			return Err(ApiError::BadRequest(INVALID_FILE));
		}

		let name = field
			.file_name()
			.filter(|name| !name.is_empty())
			.map(str::to_owned)
			.ok_or(ApiError::BadRequest(INVALID_FILE))?;
		let mime_type = field.content_type().unwrap_or(OCTET_STREAM).to_owned();
		let mut bytes = Vec::new();

		while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
			if bytes.len() + chunk.len() > UPLOAD_LIMIT {
				return Err(ApiError::PayloadTooLarge(FILE_TOO_LARGE));
			}

			bytes.extend_from_slice(&chunk);
		}

		media = Some(UploadMedia { name, mime_type, bytes: Bytes::from(bytes) });
	}

	media.ok_or(ApiError::BadRequest(INVALID_FILE))
}

fn multipart_error(err: MultipartError) -> ApiError {
	if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
		ApiError::PayloadTooLarge(FILE_TOO_LARGE)
	} else {
		tracing::debug!(error = %err, "Rejected malformed multipart body.");

		ApiError::BadRequest(INVALID_FILE)
	}
}

/// `attachment; filename="..."` with quotes and backslashes escaped and control characters
/// dropped.
fn attachment(name: &str) -> HeaderValue {
	let mut escaped = String::with_capacity(name.len());

	for c in name.chars().filter(|c| !c.is_control()) {
		if matches!(c, '"' | '\\') {
			escaped.push('\\');
		}

		escaped.push(c);
	}

	HeaderValue::from_bytes(format!("attachment; filename=\"{escaped}\"").as_bytes())
		.unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}
