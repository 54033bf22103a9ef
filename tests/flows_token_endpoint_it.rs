#![cfg(feature = "reqwest")]

mod common;

// crates.io
use httpmock::prelude::*;
// self
use common::*;
use okru::{
	error::{Error, OAuthError},
	grant::Grant,
	signature::SignatureCircuit,
};

const REDIRECT_URI: &str = "https://app.example.com/callback";

#[tokio::test]
async fn authorization_code_exchange_populates_tokens() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/token.do")
				.header("content-type", "application/x-www-form-urlencoded")
				.form_urlencoded_tuple("code", "valid-code")
				.form_urlencoded_tuple("client_id", APP_ID)
				.form_urlencoded_tuple("client_secret", APP_SECRET_KEY)
				.form_urlencoded_tuple("redirect_uri", REDIRECT_URI)
				.form_urlencoded_tuple("grant_type", "authorization_code");
			then.status(200)
				.header("content-type", "application/json")
				.body(
					"{\"access_token\":\"access-code\",\"refresh_token\":\"refresh-code\",\"token_type\":\"session\",\"expires_in\":1800}",
				);
		})
		.await;
	let mut session = reqwest_session(
		&server,
		credentials().with_app_secret_key(APP_SECRET_KEY),
		Grant::authorization_code("valid-code", REDIRECT_URI),
	);

	session.authorize().await.expect("Authorization code exchange should succeed.");
	mock.assert_async().await;

	assert_eq!(session.credentials.access_token.as_ref().map(|t| t.expose()), Some("access-code"));
	assert_eq!(session.token.refresh_token.as_ref().map(|t| t.expose()), Some("refresh-code"));
	assert_eq!(session.token.token_type.as_deref(), Some("session"));
	assert_eq!(session.token.expires_in, Some(1800));
	assert!(!session.token.is_expired());
	assert_eq!(session.sig_circuit(), SignatureCircuit::ServerServer);
}

#[tokio::test]
async fn missing_refresh_token_is_named() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token.do");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"access-only\"}");
		})
		.await;

	let mut session = reqwest_session(
		&server,
		credentials().with_app_secret_key(APP_SECRET_KEY),
		Grant::authorization_code("valid-code", REDIRECT_URI),
	);
	let err = session.authorize().await.expect_err("Missing refresh token must fail.");

	assert_eq!(
		err.oauth_error().map(OAuthError::error_description),
		Some("refresh_token is missing in the response.")
	);
	assert!(session.credentials.access_token.is_none());
}

#[tokio::test]
async fn provider_errors_and_empty_bodies_are_oauth_errors() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token.do").form_urlencoded_tuple("code", "stale");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\",\"error_description\":\"expired code\"}");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token.do").form_urlencoded_tuple("code", "empty");
			then.status(200).header("content-type", "application/json").body("{}");
		})
		.await;

	let credentials = credentials().with_app_secret_key(APP_SECRET_KEY);
	let mut stale =
		reqwest_session(&server, credentials.clone(), Grant::authorization_code("stale", REDIRECT_URI));
	let err = stale.authorize().await.expect_err("Provider errors must fail.");

	assert!(matches!(err, Error::OAuth(OAuthError::InvalidGrant)));

	let mut empty =
		reqwest_session(&server, credentials, Grant::authorization_code("empty", REDIRECT_URI));
	let err = empty.authorize().await.expect_err("Empty responses must fail.");

	assert_eq!(
		err.oauth_error().map(OAuthError::error_description),
		Some("got empty authorization response")
	);
}

#[tokio::test]
async fn refresh_keeps_the_exchanged_token_unless_rotated() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/token.do")
				.form_urlencoded_tuple("refresh_token", "refresh-old")
				.form_urlencoded_tuple("client_id", APP_ID)
				.form_urlencoded_tuple("client_secret", APP_SECRET_KEY)
				.form_urlencoded_tuple("grant_type", "refresh_token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"access-refreshed\",\"expires_in\":\"1800\"}");
		})
		.await;
	let mut session = reqwest_session(
		&server,
		credentials().with_app_secret_key(APP_SECRET_KEY),
		Grant::refresh_token("refresh-old"),
	);

	session.authorize().await.expect("Refresh should succeed.");
	mock.assert_async().await;

	assert_eq!(
		session.credentials.access_token.as_ref().map(|t| t.expose()),
		Some("access-refreshed")
	);
	assert_eq!(session.token.refresh_token.as_ref().map(|t| t.expose()), Some("refresh-old"));
	assert_eq!(session.token.expires_in, Some(1800));
}
