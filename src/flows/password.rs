//! Password grant through the `auth.login` API method.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::{ApiError, OAuthError},
	flows::common::{self, EMPTY_AUTHORIZATION_RESPONSE},
	http::{HttpRequest, HttpTransport},
	session::TokenSession,
	signature,
};

/// API method that trades a login and password for a session.
pub const LOGIN_METHOD: &str = "auth.login";

impl<C> TokenSession<C>
where
	C: ?Sized + HttpTransport,
{
	/// Logs in with `login`/`password` and stores the issued session key and secret.
	pub(crate) async fn login_with_password(&mut self, login: &str, password: &str) -> Result<()> {
		let query = common::pairs([
			("method", LOGIN_METHOD),
			("application_key", self.credentials.app_key.as_str()),
			("user_name", login),
			("password", password),
			("verification_supported", "1"),
			("verification_supported_v", "1"),
			("format", "json"),
		]);
		let request = HttpRequest::get(self.public.endpoints.api.clone()).with_query(query);
		let (_, content) = self.public.fetch_json(request).await?;

		if content.get("error_code").is_some() {
			return Err(ApiError::from_payload(&content).into());
		}
		if !signature::is_truthy(&content) {
			return Err(OAuthError::new(EMPTY_AUTHORIZATION_RESPONSE).into());
		}

		let session_key = common::required_str(&content, "session_key")?;
		let session_secret_key = common::required_str(&content, "session_secret_key")?;

		self.credentials.set_session_key(session_key);
		self.credentials.session_secret_key = Some(TokenSecret::new(session_secret_key));

		Ok(())
	}
}
