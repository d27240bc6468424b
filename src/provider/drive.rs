//! Authenticated Drive v3 REST client.
//!
//! A [`DriveClient`] is assembled per request by the client factory from stored credentials;
//! it is never cached or shared between users. Every call presents the access token as a
//! bearer credential and reports provider failures as [`UpstreamError`].

// crates.io
use axum::body::Bytes;
use futures::{Stream, StreamExt, stream};
use rand::{Rng, distr::Alphanumeric};
use reqwest::{Body, Response, header::CONTENT_TYPE};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::Credentials,
	error::UpstreamError,
	http::ReqwestHttpClient,
	provider::ProviderEndpoints,
};

/// Query restricting listings to folders, PDFs, and the three Google office document types.
pub const FILES_QUERY: &str = "mimeType = 'application/vnd.google-apps.folder' \
	or mimeType = 'application/pdf' \
	or mimeType = 'application/vnd.google-apps.document' \
	or mimeType = 'application/vnd.google-apps.spreadsheet' \
	or mimeType = 'application/vnd.google-apps.presentation'";
/// Page size used by the top-level file listing.
pub const FILES_PAGE_SIZE: u32 = 20;
/// Partial-response field mask for the top-level file listing.
pub const FILES_FIELDS: &str = "files(id, name, size, modifiedTime, mimeType)";
/// Page size used by folder listings.
pub const FOLDER_PAGE_SIZE: u32 = 10;
/// Partial-response field mask for folder listings.
pub const FOLDER_FIELDS: &str = "files(id, name, mimeType, modifiedTime)";
/// Fallback content type for media without a declared type.
pub const OCTET_STREAM: &str = "application/octet-stream";

const METADATA_FIELDS: &str = "name,mimeType";
const BOUNDARY_LEN: usize = 32;
const ERROR_PREVIEW_LEN: usize = 512;

/// Listing entry as returned by the provider's partial response.
///
/// `size` is only requested by the top-level listing and is absent for folders and native
/// Google documents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
	/// Provider file identifier.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Byte size as a decimal string.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub size: Option<String>,
	/// RFC 3339 modification time.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub modified_time: Option<String>,
	/// MIME type.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub mime_type: Option<String>,
}

/// Name and type of a single file, fetched ahead of a download.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
	/// Display name.
	pub name: String,
	/// MIME type, when the provider reports one.
	#[serde(default)]
	pub mime_type: Option<String>,
}

/// File created by an upload.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CreatedFile {
	/// Provider file identifier.
	pub id: String,
	/// Stored name.
	pub name: String,
}

/// In-memory upload payload handed to [`DriveClient::create_file`].
#[derive(Clone, Debug)]
pub struct UploadMedia {
	/// Original filename supplied by the browser.
	pub name: String,
	/// Declared content type.
	pub mime_type: String,
	/// File bytes.
	pub bytes: Bytes,
}

#[derive(Deserialize)]
struct FileList {
	#[serde(default)]
	files: Vec<FileSummary>,
}

/// Drive client bound to one user's credentials.
#[derive(Clone)]
pub struct DriveClient {
	http_client: ReqwestHttpClient,
	endpoints: ProviderEndpoints,
	credentials: Credentials,
}
impl DriveClient {
	/// Binds `credentials` to the shared transport and endpoint set.
	pub fn new(
		http_client: ReqwestHttpClient,
		endpoints: ProviderEndpoints,
		credentials: Credentials,
	) -> Self {
		Self { http_client, endpoints, credentials }
	}

	/// Credentials this client presents.
	pub fn credentials(&self) -> &Credentials {
		&self.credentials
	}

	/// Lists folders, PDFs, and office documents: fixed filter, first page of 20.
	pub async fn list_files(&self) -> Result<Vec<FileSummary>> {
		self.list("files.list", FILES_QUERY, FILES_PAGE_SIZE, FILES_FIELDS).await
	}

	/// Lists the direct children of `folder_id`: first page of 10.
	pub async fn list_folder(&self, folder_id: &str) -> Result<Vec<FileSummary>> {
		let query = parents_query(folder_id);

		self.list("files.list.folder", &query, FOLDER_PAGE_SIZE, FOLDER_FIELDS).await
	}

	/// Fetches the name and type of `file_id`.
	pub async fn file_metadata(&self, file_id: &str) -> Result<FileMetadata> {
		let mut url = self.file_url(file_id);

		url.query_pairs_mut().append_pair("fields", METADATA_FIELDS);

		let response = self.send("files.get", self.http_client.get(url)).await?;

		decode_json("files.get", response).await
	}

	/// Opens the content of `file_id` as a byte stream; nothing is buffered.
	pub async fn download(
		&self,
		file_id: &str,
	) -> Result<impl Stream<Item = Result<Bytes, ReqwestError>> + Send + use<>> {
		let mut url = self.file_url(file_id);

		url.query_pairs_mut().append_pair("alt", "media");

		let response = self.send("files.get.media", self.http_client.get(url)).await?;

		Ok(response.bytes_stream())
	}

	/// Creates a file from `media` with a `multipart/related` upload.
	pub async fn create_file(&self, media: UploadMedia) -> Result<CreatedFile> {
		let mut url = self.endpoint(&self.endpoints.drive_upload, &["files"]);

		url.query_pairs_mut().append_pair("uploadType", "multipart");

		let boundary = boundary();
		let request = self
			.http_client
			.post(url)
			.header(CONTENT_TYPE, format!("multipart/related; boundary={boundary}"))
			.body(related_body(&boundary, &media));
		let response = self.send("files.create", request).await?;

		decode_json("files.create", response).await
	}

	async fn list(
		&self,
		operation: &'static str,
		query: &str,
		page_size: u32,
		fields: &str,
	) -> Result<Vec<FileSummary>> {
		let mut url = self.endpoint(&self.endpoints.drive_api, &["files"]);

		url.query_pairs_mut()
			.append_pair("q", query)
			.append_pair("pageSize", &page_size.to_string())
			.append_pair("fields", fields);

		let response = self.send(operation, self.http_client.get(url)).await?;
		let list: FileList = decode_json(operation, response).await?;

		Ok(list.files)
	}

	async fn send(
		&self,
		operation: &'static str,
		request: reqwest::RequestBuilder,
	) -> Result<Response> {
		let response = request.bearer_auth(self.credentials.access_token.expose()).send().await?;
		let status = response.status();

		if status.is_success() {
			return Ok(response);
		}

		let body = response.text().await.unwrap_or_default();

		Err(UpstreamError::Status {
			operation,
			status: status.as_u16(),
			message: truncate(body.trim(), ERROR_PREVIEW_LEN),
		}
		.into())
	}

	fn file_url(&self, file_id: &str) -> Url {
		self.endpoint(&self.endpoints.drive_api, &["files", file_id])
	}

	fn endpoint(&self, base: &Url, segments: &[&str]) -> Url {
		let mut url = base.clone();

		// Descriptor validation guarantees the base can carry path segments.
		if let Ok(mut path) = url.path_segments_mut() {
			path.pop_if_empty().extend(segments);
		}

		url
	}
}
impl Debug for DriveClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DriveClient")
			.field("endpoints", &self.endpoints)
			.field("credentials", &self.credentials)
			.finish()
	}
}

/// Builds the `'<id>' in parents` clause, escaping quotes and backslashes inside the id.
pub fn parents_query(folder_id: &str) -> String {
	let escaped = folder_id.replace('\\', "\\\\").replace('\'', "\\'");

	format!("'{escaped}' in parents")
}

async fn decode_json<T>(operation: &'static str, response: Response) -> Result<T>
where
	T: DeserializeOwned,
{
	let bytes = response.bytes().await?;
	let mut de = serde_json::Deserializer::from_slice(&bytes);

	serde_path_to_error::deserialize(&mut de)
		.map_err(|source| UpstreamError::MalformedResponse { operation, source }.into())
}

fn related_body(boundary: &str, media: &UploadMedia) -> Body {
	let metadata = serde_json::json!({ "name": media.name, "mimeType": media.mime_type });
	let head = format!(
		"--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n\
		 --{boundary}\r\nContent-Type: {}\r\n\r\n",
		media.mime_type
	);
	let tail = format!("\r\n--{boundary}--\r\n");
	let parts = [Bytes::from(head), media.bytes.clone(), Bytes::from(tail)];

	Body::wrap_stream(stream::iter(parts).map(Ok::<_, std::io::Error>))
}

fn boundary() -> String {
	let token: String =
		rand::rng().sample_iter(Alphanumeric).take(BOUNDARY_LEN).map(char::from).collect();

	format!("drive_proxy_{token}")
}

fn truncate(value: &str, max: usize) -> String {
	match value.char_indices().nth(max) {
		Some((idx, _)) => format!("{}…", &value[..idx]),
		None => value.to_owned(),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn parents_query_escapes_quotes() {
		assert_eq!(parents_query("abc123"), "'abc123' in parents");
		assert_eq!(parents_query("a'b\\c"), "'a\\'b\\\\c' in parents");
	}

	#[test]
	fn files_query_has_five_mime_clauses() {
		assert_eq!(FILES_QUERY.matches("mimeType = ").count(), 5);
		assert_eq!(FILES_QUERY.matches(" or ").count(), 4);
		assert!(!FILES_QUERY.contains("  "));
	}

	#[test]
	fn summaries_round_trip_provider_field_names() {
		let summary: FileSummary = serde_json::from_str(
			"{\"id\":\"1\",\"name\":\"a.pdf\",\"size\":\"42\",\"modifiedTime\":\"2024-01-01T00:00:00.000Z\",\"mimeType\":\"application/pdf\"}",
		)
		.expect("Summary fixture should parse.");

		assert_eq!(summary.size.as_deref(), Some("42"));

		let folder = FileSummary { size: None, ..summary };
		let json = serde_json::to_value(&folder).expect("Summary should serialize.");

		assert!(json.get("size").is_none());
		assert_eq!(json["modifiedTime"], "2024-01-01T00:00:00.000Z");
	}

	#[test]
	fn endpoint_appends_escaped_segments() {
		let endpoints = crate::provider::ProviderDescriptor::google()
			.build()
			.expect("Google defaults should build.")
			.endpoints;
		let client = DriveClient::new(
			ReqwestHttpClient::with_client(ReqwestClient::new()),
			endpoints,
			Credentials::new("access", None),
		);

		assert_eq!(
			client.file_url("id with/slash").as_str(),
			"https://www.googleapis.com/drive/v3/files/id%20with%2Fslash"
		);
	}
}
