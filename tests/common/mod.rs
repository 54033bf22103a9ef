//! Fakes and fixtures shared by the integration tests.

#![allow(dead_code)]

// std
use std::{collections::VecDeque, sync::Arc};
// crates.io
use httpmock::MockServer;
use parking_lot::Mutex;
// self
use okru::{
	auth::Credentials,
	endpoint::Endpoints,
	grant::Grant,
	http::{HttpRequest, HttpResponse, HttpTransport, TransportFuture},
	session::{ReqwestTokenSession, TokenSession},
	url::Url,
};

pub const APP_ID: &str = "512000000000";
pub const APP_KEY: &str = "CBAOOOOOOOOOOOOOO";
pub const APP_SECRET_KEY: &str = "app-secret-key";

/// Transport that answers from a fixed script and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
	script: Mutex<VecDeque<HttpResponse>>,
	requests: Mutex<Vec<HttpRequest>>,
}
impl ScriptedTransport {
	pub fn new(script: impl IntoIterator<Item = HttpResponse>) -> Arc<Self> {
		Arc::new(Self { script: Mutex::new(script.into_iter().collect()), requests: Default::default() })
	}

	pub fn requests(&self) -> Vec<HttpRequest> {
		self.requests.lock().clone()
	}

	pub fn remaining(&self) -> usize {
		self.script.lock().len()
	}
}
impl HttpTransport for ScriptedTransport {
	fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
		let next = self.script.lock().pop_front();
		let target = request.target_url();

		self.requests.lock().push(request);

		Box::pin(async move {
			Ok(next.unwrap_or_else(|| panic!("Script exhausted before request to {target}.")))
		})
	}
}

pub fn url(value: &str) -> Url {
	Url::parse(value).expect("Failed to parse test URL.")
}

/// HTML page served at `page_url` with status 200.
pub fn page(page_url: &str, body: &str) -> HttpResponse {
	HttpResponse::new(200, url(page_url), body).with_content_type("text/html; charset=utf-8")
}

/// Page reached through one redirect to `location`.
pub fn redirected(location: &str) -> HttpResponse {
	page(location, "").with_history(vec![url(location)])
}

pub fn json(status: u16, body: &str) -> HttpResponse {
	HttpResponse::new(status, url("https://api.ok.ru/fb.do"), body)
		.with_content_type("application/json;charset=utf-8")
}

pub fn credentials() -> Credentials {
	Credentials::new(APP_ID, APP_KEY)
}

pub fn scripted_session(
	transport: &Arc<ScriptedTransport>,
	credentials: Credentials,
	grant: Grant,
) -> TokenSession<ScriptedTransport> {
	TokenSession::new(transport.clone(), credentials, grant)
		.expect("Production endpoints should parse.")
}

pub fn mock_endpoints(server: &MockServer) -> Endpoints {
	Endpoints::with_base_url(&server.base_url()).expect("Mock base URL should parse.")
}

pub fn reqwest_session(
	server: &MockServer,
	credentials: Credentials,
	grant: Grant,
) -> ReqwestTokenSession {
	TokenSession::reqwest(credentials, grant)
		.expect("Reqwest transport should build.")
		.with_endpoints(mock_endpoints(server))
}
