//! Shared helpers for grant implementations (token-endpoint exchanges, response fields).

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::{ConfigError, OAuthError},
	grant::GrantType,
	http::{HttpRequest, HttpTransport},
	session::TokenSession,
	signature,
};

/// Description used when a grant endpoint answers with an empty body.
pub const EMPTY_AUTHORIZATION_RESPONSE: &str = "got empty authorization response";

/// Fields read from a successful token-endpoint response.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenEndpointResponse {
	/// Issued access token.
	pub access_token: TokenSecret,
	/// Issued refresh token, if any.
	pub refresh_token: Option<TokenSecret>,
	/// Reported token type.
	pub token_type: Option<String>,
	/// Reported lifetime in seconds.
	pub expires_in: Option<u64>,
}
impl TokenEndpointResponse {
	/// Reads a token-endpoint body.
	///
	/// An `error` member wins over everything else, an empty body is an OAuth failure, and
	/// `access_token` is always required. `refresh_token` is required only when
	/// `require_refresh` is set.
	pub fn parse(content: &Value, require_refresh: bool) -> Result<Self, OAuthError> {
		if content.get("error").is_some() {
			return Err(OAuthError::from_payload(content));
		}
		if !signature::is_truthy(content) {
			return Err(OAuthError::new(EMPTY_AUTHORIZATION_RESPONSE));
		}

		let access_token = required_str(content, "access_token")?;
		let refresh_token = match optional_str(content, "refresh_token") {
			Some(token) => Some(TokenSecret::new(token)),
			None if require_refresh => return Err(OAuthError::missing_field("refresh_token")),
			None => None,
		};

		Ok(Self {
			access_token: TokenSecret::new(access_token),
			refresh_token,
			token_type: optional_str(content, "token_type"),
			expires_in: parse_expires_in(content.get("expires_in"))?,
		})
	}
}
impl Debug for TokenEndpointResponse {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenEndpointResponse")
			.field("refresh_token_present", &self.refresh_token.is_some())
			.field("token_type", &self.token_type)
			.field("expires_in", &self.expires_in)
			.finish()
	}
}

impl<C> TokenSession<C>
where
	C: ?Sized + HttpTransport,
{
	/// `client_secret` sent to the token endpoint.
	pub(crate) fn client_secret(&self, grant: GrantType) -> Result<String> {
		match &self.credentials.app_secret_key {
			Some(secret) if !secret.is_empty() => Ok(secret.expose().to_owned()),
			_ => Err(ConfigError::MissingAppSecretKey { grant: grant.as_str() }.into()),
		}
	}

	/// Posts `form` to the token endpoint and parses the response.
	pub(crate) async fn post_token_endpoint(
		&self,
		form: Vec<(String, String)>,
		require_refresh: bool,
	) -> Result<TokenEndpointResponse> {
		let request = HttpRequest::post(self.public.endpoints.token.clone()).with_form(form);
		let (_, content) = self.public.fetch_json(request).await?;

		Ok(TokenEndpointResponse::parse(&content, require_refresh)?)
	}

	/// Stores a token-endpoint response; an absent refresh token keeps the current one.
	pub(crate) fn apply_token_response(&mut self, response: TokenEndpointResponse) {
		self.credentials.access_token = Some(response.access_token);

		if let Some(refresh_token) = response.refresh_token {
			self.token.refresh_token = Some(refresh_token);
		}

		self.token.token_type = response.token_type;
		self.token.set_expires_in(response.expires_in, OffsetDateTime::now_utc());
	}
}

/// Reads a required string member.
pub fn required_str(content: &Value, field: &str) -> Result<String, OAuthError> {
	optional_str(content, field).ok_or_else(|| OAuthError::missing_field(field))
}

/// Reads an optional member as a string; numbers are rendered, empties read as absent.
pub fn optional_str(content: &Value, field: &str) -> Option<String> {
	match content.get(field)? {
		Value::String(s) if !s.is_empty() => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		_ => None,
	}
}

/// Reads `expires_in` given as a number or a numeric string.
pub fn parse_expires_in(value: Option<&Value>) -> Result<Option<u64>, OAuthError> {
	let malformed = || OAuthError::new("expires_in is malformed in the response.");

	match value {
		None | Some(Value::Null) => Ok(None),
		Some(Value::Number(n)) => n.as_u64().map(Some).ok_or_else(malformed),
		Some(Value::String(s)) if s.is_empty() => Ok(None),
		Some(Value::String(s)) => s.parse().map(Some).map_err(|_| malformed()),
		Some(_) => Err(malformed()),
	}
}

/// Renders `(key, value)` pairs.
pub(crate) fn pairs<const N: usize>(items: [(&str, &str); N]) -> Vec<(String, String)> {
	items.into_iter().map(|(k, v)| (k.to_owned(), v.to_owned())).collect()
}
