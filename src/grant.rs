//! OAuth 2.0 grant configuration carried by a [`TokenSession`](crate::session::TokenSession).

// std
use std::time::Duration as StdDuration;
// self
use crate::{_prelude::*, auth::TokenSecret};

/// OAuth 2.0 grant types supported by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
	/// Authorization Code grant against the token endpoint.
	AuthorizationCode,
	/// Implicit grant driven through the browser dialogs.
	Implicit,
	/// Password grant via the `auth.login` API method.
	Password,
	/// Refresh Token grant against the token endpoint.
	RefreshToken,
}
impl GrantType {
	/// Returns the RFC 6749 style identifier for the grant type.
	pub const fn as_str(self) -> &'static str {
		match self {
			GrantType::AuthorizationCode => "authorization_code",
			GrantType::Implicit => "implicit",
			GrantType::Password => "password",
			GrantType::RefreshToken => "refresh_token",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Grant-specific inputs; one session type covers every grant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Grant {
	/// Credentials already carry a token; authorizing does nothing.
	#[default]
	Preauthorized,
	/// Exchange an authorization code for tokens.
	AuthorizationCode {
		/// Code received on the redirect URI.
		code: TokenSecret,
		/// Redirect URI used when the code was issued.
		redirect_uri: String,
	},
	/// Log in through the OAuth dialogs and read the token from the final redirect.
	Implicit(ImplicitGrant),
	/// Exchange a login and password through `auth.login`.
	Password {
		/// User login (e-mail, phone, or nickname).
		login: String,
		/// User password.
		password: TokenSecret,
	},
	/// Exchange a refresh token for a new access token.
	RefreshToken {
		/// Refresh token issued by an earlier grant.
		refresh_token: TokenSecret,
	},
}
impl Grant {
	/// Authorization Code grant.
	pub fn authorization_code(
		code: impl Into<TokenSecret>,
		redirect_uri: impl Into<String>,
	) -> Self {
		Self::AuthorizationCode { code: code.into(), redirect_uri: redirect_uri.into() }
	}

	/// Password grant.
	pub fn password(login: impl Into<String>, password: impl Into<TokenSecret>) -> Self {
		Self::Password { login: login.into(), password: password.into() }
	}

	/// Refresh Token grant.
	pub fn refresh_token(refresh_token: impl Into<TokenSecret>) -> Self {
		Self::RefreshToken { refresh_token: refresh_token.into() }
	}

	/// Implicit grant.
	pub fn implicit(grant: ImplicitGrant) -> Self {
		Self::Implicit(grant)
	}

	/// Grant type, or `None` for [`Grant::Preauthorized`].
	pub fn grant_type(&self) -> Option<GrantType> {
		match self {
			Self::Preauthorized => None,
			Self::AuthorizationCode { .. } => Some(GrantType::AuthorizationCode),
			Self::Implicit(_) => Some(GrantType::Implicit),
			Self::Password { .. } => Some(GrantType::Password),
			Self::RefreshToken { .. } => Some(GrantType::RefreshToken),
		}
	}
}

/// Implicit-grant inputs and retry policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImplicitGrant {
	/// User login typed into the login dialog.
	pub login: String,
	/// User password typed into the login dialog.
	pub password: TokenSecret,
	/// Requested permissions, `;`-separated as the API expects.
	pub scope: String,
	/// Redirect URI; the endpoint default applies when unset.
	pub redirect_uri: Option<Url>,
	/// Opaque state; a random value is generated when unset.
	pub state: Option<String>,
	/// Number of dialog passes before giving up (at least one).
	pub attempts: u32,
	/// Pause between two passes.
	pub retry_interval: StdDuration,
}
impl ImplicitGrant {
	/// Default number of dialog passes.
	pub const DEFAULT_ATTEMPTS: u32 = 1;
	/// Default pause between passes.
	pub const DEFAULT_RETRY_INTERVAL: StdDuration = StdDuration::from_secs(1);

	/// Creates an implicit grant for a user.
	pub fn new(login: impl Into<String>, password: impl Into<TokenSecret>) -> Self {
		Self {
			login: login.into(),
			password: password.into(),
			scope: String::new(),
			redirect_uri: None,
			state: None,
			attempts: Self::DEFAULT_ATTEMPTS,
			retry_interval: Self::DEFAULT_RETRY_INTERVAL,
		}
	}

	/// Sets the requested permissions.
	pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = scope.into();

		self
	}

	/// Sets the redirect URI.
	pub fn with_redirect_uri(mut self, redirect_uri: Url) -> Self {
		self.redirect_uri = Some(redirect_uri);

		self
	}

	/// Sets the state echoed back by the final redirect.
	pub fn with_state(mut self, state: impl Into<String>) -> Self {
		self.state = Some(state.into());

		self
	}

	/// Sets the number of dialog passes; values below one are raised to one.
	pub fn with_attempts(mut self, attempts: u32) -> Self {
		self.attempts = attempts.max(1);

		self
	}

	/// Sets the pause between passes.
	pub fn with_retry_interval(mut self, retry_interval: StdDuration) -> Self {
		self.retry_interval = retry_interval;

		self
	}
}
