//! Transport primitives for API calls and OAuth dialogs.
//!
//! Sessions talk to the network only through [`HttpTransport`]. A transport receives an
//! [`HttpRequest`] and resolves to an [`HttpResponse`] that carries the post-redirect URL
//! and every `Location` it followed on the way, because the implicit grant reads its token
//! from the fragment of the last redirect. [`ReqwestTransport`] follows redirects by hand
//! for that reason and keeps cookies across hops so the login dialog's session survives.

#[cfg(feature = "reqwest")]
use reqwest::{
	StatusCode,
	header::{CONTENT_TYPE, LOCATION},
	redirect::Policy,
};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, ProtocolError, TransportError},
};

/// Future returned by [`HttpTransport::send`].
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpResponse>> + 'a + Send>>;

/// Abstraction over HTTP stacks able to run API calls and browser-style dialogs.
///
/// Implementations must follow redirects themselves, recording each resolved target in
/// [`HttpResponse::history`], and must keep cookies between requests issued through the
/// same instance.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes `request`, following redirects.
	fn send(&self, request: HttpRequest) -> TransportFuture<'_>;
}

/// HTTP methods used by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
	/// `GET` with parameters in the query string.
	Get,
	/// `POST` with a form-encoded body.
	Post,
}
impl HttpMethod {
	/// Returns the method token.
	pub const fn as_str(self) -> &'static str {
		match self {
			HttpMethod::Get => "GET",
			HttpMethod::Post => "POST",
		}
	}
}
impl Display for HttpMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outbound request description handed to an [`HttpTransport`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
	/// HTTP method.
	pub method: HttpMethod,
	/// Target URL, without the extra query pairs.
	pub url: Url,
	/// Query pairs appended to `url`.
	pub query: Vec<(String, String)>,
	/// Form-encoded body pairs (POST only).
	pub form: Vec<(String, String)>,
}
impl HttpRequest {
	/// Creates a `GET` request.
	pub fn get(url: Url) -> Self {
		Self { method: HttpMethod::Get, url, query: Vec::new(), form: Vec::new() }
	}

	/// Creates a `POST` request.
	pub fn post(url: Url) -> Self {
		Self { method: HttpMethod::Post, url, query: Vec::new(), form: Vec::new() }
	}

	/// Sets the query pairs.
	pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
		self.query = query;

		self
	}

	/// Sets the form body pairs.
	pub fn with_form(mut self, form: Vec<(String, String)>) -> Self {
		self.form = form;

		self
	}

	/// `url` with the query pairs appended.
	pub fn target_url(&self) -> Url {
		let mut url = self.url.clone();

		if !self.query.is_empty() {
			url.query_pairs_mut().extend_pairs(self.query.iter());
		}

		url
	}

	/// Returns the value of a query pair.
	pub fn query_value(&self, key: &str) -> Option<&str> {
		self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
	}

	/// Returns the value of a form pair.
	pub fn form_value(&self, key: &str) -> Option<&str> {
		self.form.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
	}
}

/// Response produced by an [`HttpTransport`] after redirects were followed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
	/// Final HTTP status.
	pub status: u16,
	/// `Content-Type` header of the final response.
	pub content_type: Option<String>,
	/// Final URL, including the fragment of the last redirect if it had one.
	pub url: Url,
	/// Every redirect target followed, in order.
	pub history: Vec<Url>,
	/// Response body decoded as text.
	pub body: String,
}
impl HttpResponse {
	/// Creates a response without redirect history.
	pub fn new(status: u16, url: Url, body: impl Into<String>) -> Self {
		Self { status, content_type: None, url, history: Vec::new(), body: body.into() }
	}

	/// Sets the content type.
	pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
		self.content_type = Some(content_type.into());

		self
	}

	/// Sets the redirect history.
	pub fn with_history(mut self, history: Vec<Url>) -> Self {
		self.history = history;

		self
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Target of the last redirect, if any was followed.
	pub fn last_location(&self) -> Option<&Url> {
		self.history.last()
	}

	/// Compares the MIME essence of the content type with `expected`, ignoring parameters.
	pub fn has_content_type(&self, expected: &str) -> bool {
		let Some(actual) = &self.content_type else {
			return false;
		};

		mime_essence(actual).eq_ignore_ascii_case(mime_essence(expected))
	}

	/// Decodes the body as JSON after checking the content type.
	///
	/// A blank body decodes as `null`.
	pub fn json(&self, expected_content_type: &str) -> Result<Value> {
		if !self.has_content_type(expected_content_type) {
			return Err(ProtocolError::NonRestPath {
				url: self.url.to_string(),
				content_type: self.content_type.clone(),
			}
			.into());
		}
		if self.body.trim().is_empty() {
			return Ok(Value::Null);
		}

		let mut de = serde_json::Deserializer::from_str(&self.body);

		serde_path_to_error::deserialize(&mut de).map_err(|source| {
			ProtocolError::MalformedJson { url: self.url.to_string(), source }.into()
		})
	}
}

/// Reqwest-backed transport that follows redirects manually and keeps a cookie store.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
	client: ReqwestClient,
	max_redirects: usize,
}
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Redirect hops followed before giving up.
	pub const DEFAULT_MAX_REDIRECTS: usize = 10;

	/// Builds a client with cookies enabled and automatic redirects disabled.
	pub fn new() -> Result<Self> {
		let client = ReqwestClient::builder()
			.cookie_store(true)
			.redirect(Policy::none())
			.build()
			.map_err(ConfigError::from)?;

		Ok(Self::with_client(client))
	}

	/// Wraps an existing client.
	///
	/// The client must have automatic redirects disabled, otherwise the redirect history
	/// stays empty and the implicit grant cannot read its token.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self { client, max_redirects: Self::DEFAULT_MAX_REDIRECTS }
	}

	/// Overrides the redirect hop limit.
	pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
		self.max_redirects = max_redirects;

		self
	}

	async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
		let mut url = request.target_url();
		let mut method = request.method;
		let mut form = request.form;
		let mut history = Vec::new();

		loop {
			let builder = match method {
				HttpMethod::Get => self.client.get(url.clone()),
				HttpMethod::Post => self.client.post(url.clone()).form(&form),
			};
			let response =
				builder.send().await.map_err(|e| TransportError::network(&url, e))?;
			let status = response.status();

			if status.is_redirection() && status != StatusCode::NOT_MODIFIED {
				let location = response
					.headers()
					.get(LOCATION)
					.and_then(|value| value.to_str().ok())
					.and_then(|raw| url.join(raw).ok())
					.ok_or_else(|| ProtocolError::MissingLocation { url: url.to_string() })?;

				if history.len() >= self.max_redirects {
					return Err(TransportError::TooManyRedirects {
						url: url.to_string(),
						limit: self.max_redirects,
					}
					.into());
				}
				if !matches!(
					status,
					StatusCode::TEMPORARY_REDIRECT | StatusCode::PERMANENT_REDIRECT
				) {
					method = HttpMethod::Get;
					form.clear();
				}

				history.push(location.clone());
				url = location;

				continue;
			}

			let content_type = response
				.headers()
				.get(CONTENT_TYPE)
				.and_then(|value| value.to_str().ok())
				.map(str::to_owned);
			let body = response.text().await.map_err(|e| TransportError::network(&url, e))?;

			return Ok(HttpResponse { status: status.as_u16(), content_type, url, history, body });
		}
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
		Box::pin(self.execute(request))
	}
}

fn mime_essence(content_type: &str) -> &str {
	content_type.split(';').next().unwrap_or_default().trim()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse test URL.")
	}

	#[test]
	fn target_url_appends_query_pairs() {
		let request = HttpRequest::get(url("https://api.example.com/fb.do?x=1"))
			.with_query(vec![("method".into(), "users.getInfo".into())]);

		assert_eq!(
			request.target_url().as_str(),
			"https://api.example.com/fb.do?x=1&method=users.getInfo"
		);
		assert_eq!(request.query_value("method"), Some("users.getInfo"));
	}

	#[test]
	fn json_checks_mime_essence() {
		let response = HttpResponse::new(200, url("https://api.example.com/fb.do"), "{\"a\":1}")
			.with_content_type("application/json;charset=utf-8");

		assert_eq!(
			response.json("application/json").expect("JSON body should decode."),
			serde_json::json!({ "a": 1 })
		);

		let html = HttpResponse::new(200, url("https://api.example.com/x"), "<html></html>")
			.with_content_type("text/html");
		let err = html.json("application/json").expect_err("HTML must be rejected.");

		assert!(matches!(err, Error::Protocol(ProtocolError::NonRestPath { .. })));
	}

	#[test]
	fn malformed_json_reports_protocol_error() {
		let response = HttpResponse::new(200, url("https://api.example.com/fb.do"), "{\"a\":")
			.with_content_type("application/json");
		let err = response.json("application/json").expect_err("Truncated JSON must fail.");

		assert!(matches!(err, Error::Protocol(ProtocolError::MalformedJson { .. })));
	}

	#[test]
	fn blank_body_decodes_as_null() {
		let response = HttpResponse::new(200, url("https://api.example.com/fb.do"), "  ")
			.with_content_type("application/json");

		assert_eq!(response.json("application/json").expect("Blank body should decode."), Value::Null);
	}
}
