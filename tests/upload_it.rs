#![cfg(feature = "test")]

// crates.io
use httpmock::prelude::*;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
// self
use drive_proxy::{
	_preludet::*,
	api::files::UPLOAD_LIMIT,
	auth::{Credentials, UserId},
	store::CredentialStore,
};

const USER: &str = "idtok.dave.sig";

async fn signed_in(server: &MockServer) -> TestApp {
	let app = TestApp::spawn(test_config(&server.base_url())).await;

	app.store
		.set(UserId::new(USER).expect("User should be valid."), Credentials::new("at-dave", None))
		.await
		.expect("Seeding credentials should succeed.");
	app.client
		.post(app.url("/api/auth/sync-session"))
		.json(&serde_json::json!({ "userId": USER }))
		.send()
		.await
		.expect("Sync request should complete.");

	app
}

fn file_form(name: &str, bytes: Vec<u8>, mime: &str) -> Form {
	let part = Part::bytes(bytes)
		.file_name(name.to_owned())
		.mime_str(mime)
		.expect("Fixture MIME type should parse.");

	Form::new().part("file", part)
}

async fn upload_mock(server: &MockServer) -> httpmock::Mock<'_> {
	server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/upload/drive/v3/files")
				.query_param("uploadType", "multipart")
				.header("authorization", "Bearer at-dave")
				.body_includes("\"name\":\"notes.txt\"");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"kind\":\"drive#file\",\"id\":\"new-1\",\"name\":\"notes.txt\",\"mimeType\":\"text/plain\"}");
		})
		.await
}

#[tokio::test]
async fn upload_creates_file_and_echoes_identity() {
	let server = MockServer::start_async().await;
	let mock = upload_mock(&server).await;
	let app = signed_in(&server).await;
	let response = app
		.client
		.post(app.url("/api/upload"))
		.multipart(file_form("notes.txt", b"hello drive".to_vec(), "text/plain"))
		.send()
		.await
		.expect("Upload should complete.");

	assert_eq!(response.status(), 200);

	let body: Value = response.json().await.expect("Upload body should be JSON.");

	assert_eq!(
		body,
		serde_json::json!({ "success": true, "fileId": "new-1", "fileName": "notes.txt" })
	);
	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn upload_accepts_exactly_the_limit() {
	let server = MockServer::start_async().await;
	let mock = upload_mock(&server).await;
	let app = signed_in(&server).await;
	let response = app
		.client
		.post(app.url("/api/upload"))
		.multipart(file_form("notes.txt", vec![b'a'; UPLOAD_LIMIT], "text/plain"))
		.send()
		.await
		.expect("Upload should complete.");

	assert_eq!(response.status(), 200);
	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn upload_rejects_one_byte_over_the_limit() {
	let server = MockServer::start_async().await;
	let mock = upload_mock(&server).await;
	let app = signed_in(&server).await;
	let response = app
		.client
		.post(app.url("/api/upload"))
		.multipart(file_form("notes.txt", vec![b'a'; UPLOAD_LIMIT + 1], "text/plain"))
		.send()
		.await
		.expect("Upload should complete.");

	assert_eq!(response.status(), 413);
	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn upload_requires_a_file_field() {
	let server = MockServer::start_async().await;
	let mock = upload_mock(&server).await;
	let app = signed_in(&server).await;
	let response = app
		.client
		.post(app.url("/api/upload"))
		.multipart(Form::new().text("note", "no file here"))
		.send()
		.await
		.expect("Upload should complete.");

	assert_eq!(response.status(), 400);

	let body: Value = response.json().await.expect("Error body should be JSON.");

	assert_eq!(body["error"], "Invalid file data.");
	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn upload_without_session_is_unauthorized() {
	let server = MockServer::start_async().await;
	let mock = upload_mock(&server).await;
	let app = TestApp::spawn(test_config(&server.base_url())).await;
	let response = app
		.client
		.post(app.url("/api/upload"))
		.multipart(file_form("notes.txt", b"tiny".to_vec(), "text/plain"))
		.send()
		.await
		.expect("Upload should complete.");

	assert_eq!(response.status(), 401);
	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn upload_provider_failure_is_generic() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/upload/drive/v3/files");
			then.status(500).body("backend exploded");
		})
		.await;
	let app = signed_in(&server).await;
	let response = app
		.client
		.post(app.url("/api/upload"))
		.multipart(file_form("notes.txt", b"data".to_vec(), "text/plain"))
		.send()
		.await
		.expect("Upload should complete.");

	assert_eq!(response.status(), 500);

	let body: Value = response.json().await.expect("Error body should be JSON.");

	assert_eq!(body["error"], "Failed to upload file.");
}
