//! Demonstrates a public call, a refresh-token grant, and a signed facade call against a mock
//! OK API served by `httpmock`.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use okru::{
	auth::Credentials,
	endpoint::Endpoints,
	grant::Grant,
	session::{PublicSession, TokenSession},
	signature::Params,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let endpoints = Endpoints::with_base_url(&server.base_url())?;
	let widget_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/fb.do/widget/info");
			then.status(200).header("content-type", "application/json").body("{\"widget\":\"ok\"}");
		})
		.await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token.do");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"session\",\"expires_in\":1800}",
			);
		})
		.await;
	let user_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/fb.do").query_param("method", "users.getCurrentUser");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"uid\":\"42\",\"name\":\"Demo User\"}");
		})
		.await;
	let public = PublicSession::reqwest()?.with_endpoints(endpoints.clone());
	let widget = public.public_request(&["widget", "info"], Params::new()).await?;

	println!("Public payload: {widget}.");

	let credentials =
		Credentials::new("512000000000", "CBADEMO").with_app_secret_key("demo-app-secret");
	let session = TokenSession::reqwest(credentials, Grant::refresh_token("demo-refresh"))?
		.with_endpoints(endpoints)
		.connect()
		.await?;
	let user = session.api().call("users.getCurrentUser", Params::new()).await?;

	println!("Signed with the {} circuit: {user}.", session.sig_circuit());

	session.close();
	widget_mock.assert_async().await;
	token_mock.assert_async().await;
	user_mock.assert_async().await;

	Ok(())
}
