//! Stateful request executors: unsigned public calls and signed token calls.
//!
//! [`PublicSession`] owns the transport handle, the endpoint set, and the response
//! classification rules. [`TokenSession`] layers credentials, a [`Grant`], and the
//! grant-populated [`TokenState`] on top and signs every call.
//!
//! A session is a single logical flow: [`TokenSession::authorize`] takes `&mut self`
//! while calls take `&self`, so overlapping authorize/request calls on one instance do not
//! compile. Clone the session to get an isolated copy of its credential state; clones share
//! the transport (and its cookie store).

// std
use std::ops::Deref;
// self
use crate::{
	_prelude::*,
	api::Api,
	auth::{Credentials, TokenState},
	endpoint::Endpoints,
	error::{ApiError, ProtocolError},
	grant::Grant,
	http::{HttpRequest, HttpResponse, HttpTransport},
	obs::{self, FlowKind},
	signature::{self, Params, SignatureCircuit},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Public session over the crate's default reqwest transport.
pub type ReqwestPublicSession = PublicSession<ReqwestTransport>;
#[cfg(feature = "reqwest")]
/// Token session over the crate's default reqwest transport.
pub type ReqwestTokenSession = TokenSession<ReqwestTransport>;

/// Session for calling public API methods without a signature.
pub struct PublicSession<C>
where
	C: ?Sized + HttpTransport,
{
	/// Transport used for every outbound request.
	pub transport: Arc<C>,
	/// API, token, and dialog endpoints.
	pub endpoints: Endpoints,
	/// Returns decoded bodies verbatim instead of classifying errors. Off by default.
	pub pass_error: bool,
	/// Expected MIME type of API responses.
	pub content_type: String,
}
impl<C> PublicSession<C>
where
	C: ?Sized + HttpTransport,
{
	/// Expected MIME type of API responses unless overridden.
	pub const CONTENT_TYPE: &'static str = "application/json";

	/// Creates a session against the production endpoints.
	pub fn new(transport: impl Into<Arc<C>>) -> Result<Self> {
		Ok(Self::with_transport(transport, Endpoints::production()?))
	}

	/// Creates a session against explicit endpoints.
	pub fn with_transport(transport: impl Into<Arc<C>>, endpoints: Endpoints) -> Self {
		Self {
			transport: transport.into(),
			endpoints,
			pass_error: false,
			content_type: Self::CONTENT_TYPE.into(),
		}
	}

	/// Replaces the endpoint set.
	pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
		self.endpoints = endpoints;

		self
	}

	/// Enables or disables pass-raw-errors mode.
	pub fn with_pass_error(mut self, pass_error: bool) -> Self {
		self.pass_error = pass_error;

		self
	}

	/// Overrides the expected response MIME type.
	pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
		self.content_type = content_type.into();

		self
	}

	/// Requests public data from the API, appending `segments` to the endpoint path.
	pub async fn public_request(&self, segments: &[&str], params: Params) -> Result<Value> {
		obs::observe(FlowKind::PublicRequest, "public_request", async move {
			let url = self.endpoints.api_url(segments);

			self.call_api(HttpRequest::get(url).with_query(params.to_pairs())).await
		})
		.await
	}

	/// Dispatches `request` and classifies the JSON response.
	pub(crate) async fn call_api(&self, request: HttpRequest) -> Result<Value> {
		let (response, content) = self.fetch_json(request).await?;

		self.classify(&response, content)
	}

	/// Dispatches `request` and decodes the JSON body without classifying it.
	pub(crate) async fn fetch_json(&self, request: HttpRequest) -> Result<(HttpResponse, Value)> {
		let response = self.transport.send(request).await?;
		let content = response.json(&self.content_type)?;

		Ok((response, content))
	}

	/// Applies the shared classification rules to a decoded response body.
	pub fn classify(&self, response: &HttpResponse, content: Value) -> Result<Value> {
		if self.pass_error {
			return Ok(content);
		}
		if content.get("error_code").is_some() {
			return Err(ApiError::from_payload(&content).into());
		}
		if !response.is_success() {
			return Err(
				ProtocolError::Status { url: response.url.to_string(), status: response.status }
					.into(),
			);
		}
		if signature::is_truthy(&content) {
			Ok(content)
		} else {
			obs::stage("empty_response", &response.url);

			Err(Error::empty_response())
		}
	}
}
#[cfg(feature = "reqwest")]
impl PublicSession<ReqwestTransport> {
	/// Creates a session over a fresh reqwest transport and the production endpoints.
	pub fn reqwest() -> Result<Self> {
		Self::new(ReqwestTransport::new()?)
	}
}
impl<C> Clone for PublicSession<C>
where
	C: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			endpoints: self.endpoints.clone(),
			pass_error: self.pass_error,
			content_type: self.content_type.clone(),
		}
	}
}
impl<C> Debug for PublicSession<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PublicSession")
			.field("endpoints", &self.endpoints)
			.field("pass_error", &self.pass_error)
			.field("content_type", &self.content_type)
			.finish()
	}
}

/// Session for executing signed, authorized requests.
pub struct TokenSession<C>
where
	C: ?Sized + HttpTransport,
{
	/// Unsigned session this one builds on.
	pub public: PublicSession<C>,
	/// Application credentials and the token fields grants overwrite.
	pub credentials: Credentials,
	/// Grant driven by [`TokenSession::authorize`].
	pub grant: Grant,
	/// Fields populated by the last successful grant.
	pub token: TokenState,
	/// Response format requested from the API.
	pub format: String,
}
impl<C> TokenSession<C>
where
	C: ?Sized + HttpTransport,
{
	/// Response format requested unless overridden.
	pub const FORMAT: &'static str = "json";

	/// Creates a session against the production endpoints.
	pub fn new(transport: impl Into<Arc<C>>, credentials: Credentials, grant: Grant) -> Result<Self> {
		Ok(Self::from_public(PublicSession::new(transport)?, credentials, grant))
	}

	/// Wraps an existing public session.
	pub fn from_public(public: PublicSession<C>, credentials: Credentials, grant: Grant) -> Self {
		Self {
			public,
			credentials,
			grant,
			token: TokenState::default(),
			format: Self::FORMAT.into(),
		}
	}

	/// Replaces the endpoint set.
	pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
		self.public.endpoints = endpoints;

		self
	}

	/// Enables or disables pass-raw-errors mode.
	pub fn with_pass_error(mut self, pass_error: bool) -> Self {
		self.public.pass_error = pass_error;

		self
	}

	/// Overrides the response format.
	pub fn with_format(mut self, format: impl Into<String>) -> Self {
		self.format = format.into();

		self
	}

	/// Parameters merged into every signed request.
	pub fn required_params(&self) -> Params {
		Params::new()
			.with("application_key", self.credentials.app_key.as_str())
			.with("format", self.format.as_str())
	}

	/// Signature circuit usable right now; re-evaluated on every call.
	pub fn sig_circuit(&self) -> SignatureCircuit {
		self.credentials.sig_circuit()
	}

	/// Signing secret of the current circuit.
	pub fn secret_key(&self) -> Result<String> {
		self.credentials.secret_key()
	}

	/// Canonical signing string of `params` under the current circuit.
	pub fn params_to_str(&self, params: &Params) -> Result<String> {
		Ok(signature::params_to_str(params, &self.secret_key()?))
	}

	/// Signature of `params` under the current circuit.
	pub fn sign_params(&self, params: &Params) -> Result<String> {
		Ok(signature::sign(params, &self.secret_key()?))
	}

	/// Builds the transmitted parameter set: empties dropped, required parameters merged,
	/// `sig` computed over the result, and `access_token` attached unsigned.
	pub fn signed_params(&self, mut params: Params) -> Result<Params> {
		params.merge(self.required_params());
		params.retain_truthy();

		let sig = self.sign_params(&params)?;

		params.insert("sig", sig);

		if let Some(token) = &self.credentials.access_token {
			params.insert("access_token", token.expose());
		}

		Ok(params)
	}

	/// Sends a signed request, appending `segments` to the endpoint path.
	///
	/// Fails with a configuration error before touching the network when no signature
	/// circuit is usable.
	pub async fn request(&self, segments: &[&str], params: Params) -> Result<Value> {
		obs::observe(FlowKind::Request, "request", async move {
			let params = self.signed_params(params)?;
			let url = self.public.endpoints.api_url(segments);

			self.public.call_api(HttpRequest::get(url).with_query(params.to_pairs())).await
		})
		.await
	}

	/// Requests public data without signing.
	pub async fn public_request(&self, segments: &[&str], params: Params) -> Result<Value> {
		self.public.public_request(segments, params).await
	}

	/// Method-call facade bound to this session.
	pub fn api(&self) -> Api<'_, C> {
		Api::new(self)
	}

	/// Authorizes and hands the session back, ready for calls.
	pub async fn connect(mut self) -> Result<Self> {
		self.authorize().await?;

		Ok(self)
	}

	/// Ends the session, releasing this handle on the transport.
	pub fn close(self) {}
}
#[cfg(feature = "reqwest")]
impl TokenSession<ReqwestTransport> {
	/// Creates a session over a fresh reqwest transport and the production endpoints.
	pub fn reqwest(credentials: Credentials, grant: Grant) -> Result<Self> {
		Self::new(ReqwestTransport::new()?, credentials, grant)
	}
}
impl<C> Deref for TokenSession<C>
where
	C: ?Sized + HttpTransport,
{
	type Target = PublicSession<C>;

	fn deref(&self) -> &Self::Target {
		&self.public
	}
}
impl<C> Clone for TokenSession<C>
where
	C: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			public: self.public.clone(),
			credentials: self.credentials.clone(),
			grant: self.grant.clone(),
			token: self.token.clone(),
			format: self.format.clone(),
		}
	}
}
impl<C> Debug for TokenSession<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenSession")
			.field("public", &self.public)
			.field("credentials", &self.credentials)
			.field("grant", &self.grant)
			.field("token", &self.token)
			.field("format", &self.format)
			.finish()
	}
}
