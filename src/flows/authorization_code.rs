//! Authorization Code grant: consent URL building and code exchange.

// self
use crate::{
	_prelude::*,
	flows::common,
	grant::GrantType,
	http::HttpTransport,
	session::TokenSession,
};

impl<C> TokenSession<C>
where
	C: ?Sized + HttpTransport,
{
	/// Builds the consent URL a user opens to obtain an authorization code.
	pub fn authorization_url(&self, redirect_uri: &str, scope: &str, state: Option<&str>) -> Url {
		let mut url = self.public.endpoints.authorize.clone();

		{
			let mut query = url.query_pairs_mut();

			query
				.append_pair("client_id", self.credentials.app_id.as_str())
				.append_pair("scope", scope)
				.append_pair("response_type", "code")
				.append_pair("redirect_uri", redirect_uri)
				.append_pair("layout", "w");

			if let Some(state) = state {
				query.append_pair("state", state);
			}
		}

		url
	}

	/// Exchanges `code` for an access token and a refresh token.
	pub(crate) async fn exchange_authorization_code(
		&mut self,
		code: &str,
		redirect_uri: &str,
	) -> Result<()> {
		let client_secret = self.client_secret(GrantType::AuthorizationCode)?;
		let form = common::pairs([
			("code", code),
			("client_id", self.credentials.app_id.as_str()),
			("client_secret", client_secret.as_str()),
			("redirect_uri", redirect_uri),
			("grant_type", GrantType::AuthorizationCode.as_str()),
		]);
		let response = self.post_token_endpoint(form, true).await?;

		self.apply_token_response(response);

		Ok(())
	}
}
