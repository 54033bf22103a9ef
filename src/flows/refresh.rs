//! Refresh Token grant.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	flows::common,
	grant::GrantType,
	http::HttpTransport,
	session::TokenSession,
};

impl<C> TokenSession<C>
where
	C: ?Sized + HttpTransport,
{
	/// Exchanges `refresh_token` for a new access token.
	///
	/// When the response rotates the refresh token the new one is kept; otherwise the
	/// token that was exchanged stays current.
	pub(crate) async fn exchange_refresh_token(&mut self, refresh_token: &str) -> Result<()> {
		let client_secret = self.client_secret(GrantType::RefreshToken)?;
		let form = common::pairs([
			("refresh_token", refresh_token),
			("client_id", self.credentials.app_id.as_str()),
			("client_secret", client_secret.as_str()),
			("grant_type", GrantType::RefreshToken.as_str()),
		]);
		let response = self.post_token_endpoint(form, false).await?;

		if response.refresh_token.is_none() {
			self.token.refresh_token = Some(TokenSecret::new(refresh_token));
		}

		self.apply_token_response(response);

		Ok(())
	}
}
