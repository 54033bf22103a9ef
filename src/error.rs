//! Client-level error types shared across sessions, grants, and the transport.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem, raised before any network call.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, redirect loop).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The server answered with something other than the expected REST payload.
	#[error(transparent)]
	Protocol(#[from] ProtocolError),
	/// API method returned an `error_code` payload.
	#[error(transparent)]
	Api(#[from] ApiError),
	/// API method returned an empty payload where content was expected.
	#[error(transparent)]
	EmptyResponse(ApiError),
	/// OAuth grant failed.
	#[error(transparent)]
	OAuth(#[from] OAuthError),
}
impl Error {
	/// Builds the empty-response error (`error_code = -1`).
	pub fn empty_response() -> Self {
		Self::EmptyResponse(ApiError::empty_response())
	}

	/// Returns the API error payload for both [`Error::Api`] and [`Error::EmptyResponse`].
	pub fn api_error(&self) -> Option<&ApiError> {
		match self {
			Self::Api(e) | Self::EmptyResponse(e) => Some(e),
			_ => None,
		}
	}

	/// Returns the OAuth error when the failure came from a grant flow.
	pub fn oauth_error(&self) -> Option<&OAuthError> {
		match self {
			Self::OAuth(e) => Some(e),
			_ => None,
		}
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// No signature circuit can be derived from the current credentials.
	#[error(
		"Signature circuit is undefined: pass `app_key` and `access_token` together with either `app_secret_key` (server-server) or `session_secret_key` (client-server)."
	)]
	UndefinedSignatureCircuit,
	/// A token-endpoint grant needs the application secret key.
	#[error("The {grant} grant requires `app_secret_key`.")]
	MissingAppSecretKey {
		/// Grant label.
		grant: &'static str,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Endpoint or redirect URL cannot be parsed.
	#[error("URL `{url}` is invalid.")]
	InvalidUrl {
		/// Offending input.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, redirects).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {url}.")]
	Network {
		/// Request URL.
		url: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Redirect chain exceeded the configured hop limit.
	#[error("Redirect limit of {limit} exceeded at {url}.")]
	TooManyRedirects {
		/// Last URL visited.
		url: String,
		/// Configured hop limit.
		limit: usize,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(url: &Url, src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { url: url.to_string(), source: Box::new(src) }
	}
}

/// Responses that do not follow the REST contract.
#[derive(Debug, ThisError)]
pub enum ProtocolError {
	/// Content type did not match the expected JSON type.
	#[error("Got non-REST path: {url} (content type {content_type:?}).")]
	NonRestPath {
		/// Response URL.
		url: String,
		/// Content type reported by the server, if any.
		content_type: Option<String>,
	},
	/// Body was declared as JSON but could not be decoded.
	#[error("Response from {url} is malformed JSON.")]
	MalformedJson {
		/// Response URL.
		url: String,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Non-2xx status without an API error payload.
	#[error("Unexpected HTTP status {status} from {url}.")]
	Status {
		/// Response URL.
		url: String,
		/// HTTP status code.
		status: u16,
	},
	/// Redirect status without a usable `Location` header.
	#[error("Redirect from {url} has no usable Location header.")]
	MissingLocation {
		/// Response URL.
		url: String,
	},
}

/// API business error carried by `{error_code, error_msg, error_data}` payloads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ThisError)]
#[error("Error {}: \"{}\". Data: {}.", render(.code), render(.msg), render(.data))]
pub struct ApiError {
	/// `error_code` field.
	#[serde(rename = "error_code", default)]
	pub code: Value,
	/// `error_msg` field; `null` when the server sent none.
	#[serde(rename = "error_msg", default)]
	pub msg: Value,
	/// `error_data` field.
	#[serde(rename = "error_data", default)]
	pub data: Value,
}
impl ApiError {
	/// Code used by the empty-response error.
	pub const EMPTY_RESPONSE_CODE: i64 = -1;

	/// Reads `error_code`, `error_msg`, and `error_data` from a response body.
	///
	/// Each member is taken as sent; absent members read as `null`.
	pub fn from_payload(payload: &Value) -> Self {
		let field = |name: &str| payload.get(name).cloned().unwrap_or(Value::Null);

		Self { code: field("error_code"), msg: field("error_msg"), data: field("error_data") }
	}

	/// Fixed payload for empty responses.
	pub fn empty_response() -> Self {
		Self {
			code: Value::from(Self::EMPTY_RESPONSE_CODE),
			msg: Value::from("empty response"),
			data: Value::Object(Default::default()),
		}
	}
}

/// OAuth failures carrying an `{error, error_description}` payload.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum OAuthError {
	/// Generic or server-supplied OAuth failure.
	#[error("OAuth error {error}: {description}")]
	Provider {
		/// `error` field.
		error: String,
		/// `error_description` field.
		description: String,
	},
	/// Invalid user credentials.
	#[error("OAuth error invalid_grant: invalid login or password")]
	InvalidGrant,
	/// Invalid client id.
	#[error("OAuth error invalid_client: invalid client id")]
	InvalidClient,
	/// User is blocked.
	#[error("OAuth error invalid_user: user is blocked")]
	InvalidUser,
}
impl OAuthError {
	/// Error code used for failures raised by this client rather than the server.
	pub const GENERIC: &'static str = "oauth_error";

	/// Builds a client-side OAuth failure with the given description.
	pub fn new(description: impl Into<String>) -> Self {
		Self::Provider { error: Self::GENERIC.into(), description: description.into() }
	}

	/// Builds the failure raised when a required field is absent from a grant response.
	pub fn missing_field(field: &str) -> Self {
		Self::new(format!("{field} is missing in the response."))
	}

	/// Classifies a server `{error, error_description}` payload.
	pub fn from_payload(payload: &Value) -> Self {
		let Ok(body) = serde_json::from_value::<OAuthErrorBody>(payload.clone()) else {
			return Self::new(payload.to_string());
		};

		match body.error.as_str() {
			"invalid_grant" => Self::InvalidGrant,
			"invalid_client" => Self::InvalidClient,
			"invalid_user" => Self::InvalidUser,
			_ => Self::Provider {
				error: body.error,
				description: body.error_description.unwrap_or_default(),
			},
		}
	}

	/// `error` field of the payload.
	pub fn error(&self) -> &str {
		match self {
			Self::Provider { error, .. } => error,
			Self::InvalidGrant => "invalid_grant",
			Self::InvalidClient => "invalid_client",
			Self::InvalidUser => "invalid_user",
		}
	}

	/// `error_description` field of the payload.
	pub fn error_description(&self) -> &str {
		match self {
			Self::Provider { description, .. } => description,
			Self::InvalidGrant => "invalid login or password",
			Self::InvalidClient => "invalid client id",
			Self::InvalidUser => "user is blocked",
		}
	}

	/// Structured `{error, error_description}` payload.
	pub fn payload(&self) -> Value {
		serde_json::json!({
			"error": self.error(),
			"error_description": self.error_description(),
		})
	}
}

#[derive(Deserialize)]
struct OAuthErrorBody {
	error: String,
	#[serde(default)]
	error_description: Option<String>,
}

fn render(value: &Value) -> String {
	match value {
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}
