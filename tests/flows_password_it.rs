#![cfg(feature = "reqwest")]

mod common;

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use common::*;
use okru::{error::Error, grant::Grant, signature::SignatureCircuit};

#[tokio::test]
async fn password_login_stores_session_key_and_secret() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/fb.do")
				.query_param("method", "auth.login")
				.query_param("application_key", APP_KEY)
				.query_param("user_name", "user@example.com")
				.query_param("password", "hunter2")
				.query_param("verification_supported", "1")
				.query_param("verification_supported_v", "1")
				.query_param("format", "json");
			then.status(200)
				.header("content-type", "application/json")
				.body(
					"{\"uid\":\"42\",\"session_key\":\"session-key\",\"session_secret_key\":\"session-secret\"}",
				);
		})
		.await;
	let mut session =
		reqwest_session(&server, credentials(), Grant::password("user@example.com", "hunter2"));

	session.authorize().await.expect("Password grant should succeed.");
	mock.assert_async().await;

	assert_eq!(session.credentials.session_key().map(|t| t.expose()), Some("session-key"));
	assert_eq!(
		session.credentials.session_secret_key.as_ref().map(|t| t.expose()),
		Some("session-secret")
	);
	assert_eq!(session.sig_circuit(), SignatureCircuit::ClientServer);
}

#[tokio::test]
async fn password_login_errors_are_api_errors() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/fb.do").query_param("method", "auth.login");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"error_code\":401,\"error_msg\":\"AUTH_LOGIN : INVALID_CREDENTIAL\",\"error_data\":null}");
		})
		.await;

	let mut session = reqwest_session(&server, credentials(), Grant::password("user", "wrong"));
	let err = session.authorize().await.expect_err("Rejected login must fail.");

	assert!(matches!(err, Error::Api(_)));
	assert_eq!(err.api_error().map(|api| api.code.clone()), Some(json!(401)));
	assert!(session.credentials.access_token.is_none());
}

#[tokio::test]
async fn password_login_requires_session_fields() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/fb.do").query_param("user_name", "empty");
			then.status(200).header("content-type", "application/json").body("{}");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/fb.do").query_param("user_name", "partial");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"session_key\":\"session-key\"}");
		})
		.await;

	let mut empty = reqwest_session(&server, credentials(), Grant::password("empty", "x"));
	let err = empty.authorize().await.expect_err("Empty login response must fail.");

	assert_eq!(
		err.oauth_error().map(|oauth| oauth.error_description()),
		Some("got empty authorization response")
	);

	let mut partial = reqwest_session(&server, credentials(), Grant::password("partial", "x"));
	let err = partial.authorize().await.expect_err("Partial login response must fail.");

	assert_eq!(
		err.oauth_error().map(|oauth| oauth.error_description()),
		Some("session_secret_key is missing in the response.")
	);
}
