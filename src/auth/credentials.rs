//! Application and user credentials plus signature-circuit resolution.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::ConfigError,
	signature::{self, SignatureCircuit},
};

/// Static application credentials and the user token fields that grants overwrite.
///
/// Which optional secrets are non-empty decides the [`SignatureCircuit`]. The circuit is
/// derived on every call, so mutating a field between two requests switches circuits
/// immediately.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
	/// Application identifier, sent as `client_id` by OAuth grants.
	pub app_id: String,
	/// Public application key, sent as `application_key`.
	pub app_key: String,
	/// Application secret key used by the server-server circuit and token endpoint.
	pub app_secret_key: Option<TokenSecret>,
	/// User access token (the API's `session_key`).
	pub access_token: Option<TokenSecret>,
	/// Per-session secret used by the client-server circuit.
	pub session_secret_key: Option<TokenSecret>,
}
impl Credentials {
	/// Creates credentials for an application with no secrets or tokens yet.
	pub fn new(app_id: impl Into<String>, app_key: impl Into<String>) -> Self {
		Self { app_id: app_id.into(), app_key: app_key.into(), ..Default::default() }
	}

	/// Sets the application secret key.
	pub fn with_app_secret_key(mut self, secret: impl Into<TokenSecret>) -> Self {
		self.app_secret_key = Some(secret.into());

		self
	}

	/// Sets the user access token.
	pub fn with_access_token(mut self, token: impl Into<TokenSecret>) -> Self {
		self.access_token = Some(token.into());

		self
	}

	/// Sets the session secret key.
	pub fn with_session_secret_key(mut self, secret: impl Into<TokenSecret>) -> Self {
		self.session_secret_key = Some(secret.into());

		self
	}

	/// Alias of [`Credentials::access_token`] under the API's legacy name.
	pub fn session_key(&self) -> Option<&TokenSecret> {
		self.access_token.as_ref()
	}

	/// Replaces the access token under the API's legacy name.
	pub fn set_session_key(&mut self, session_key: impl Into<TokenSecret>) {
		self.access_token = Some(session_key.into());
	}

	/// Signature circuit usable with the current fields.
	pub fn sig_circuit(&self) -> SignatureCircuit {
		SignatureCircuit::resolve(
			present(&self.app_secret_key),
			present(&self.session_secret_key),
			present(&self.access_token),
			!self.app_key.is_empty(),
		)
	}

	/// Resolves the signing secret for the current circuit.
	pub fn secret_key(&self) -> Result<String> {
		match (self.sig_circuit(), &self.access_token) {
			(SignatureCircuit::ClientServer, _) => Ok(self
				.session_secret_key
				.as_ref()
				.map(|secret| secret.expose().to_owned())
				.unwrap_or_default()),
			(SignatureCircuit::ServerServer, Some(token)) => {
				let app_secret = self.app_secret_key.as_ref().map(TokenSecret::expose);

				Ok(signature::server_secret(token.expose(), app_secret.unwrap_or_default()))
			},
			_ => Err(ConfigError::UndefinedSignatureCircuit.into()),
		}
	}
}

fn present(secret: &Option<TokenSecret>) -> bool {
	secret.as_ref().is_some_and(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn base() -> Credentials {
		Credentials::new("app-id", "app-key")
	}

	#[test]
	fn circuit_prefers_server_server() {
		let creds = base()
			.with_access_token("token")
			.with_app_secret_key("app secret key")
			.with_session_secret_key("session secret key");

		assert_eq!(creds.sig_circuit(), SignatureCircuit::ServerServer);
		assert_eq!(
			creds.secret_key().expect("Server-server secret should resolve."),
			"904c9e548e858829e2879d1603a7b0cc"
		);
	}

	#[test]
	fn circuit_falls_back_to_client_server() {
		let creds = base()
			.with_access_token("token")
			.with_app_secret_key("")
			.with_session_secret_key("session secret key");

		assert_eq!(creds.sig_circuit(), SignatureCircuit::ClientServer);
		assert_eq!(
			creds.secret_key().expect("Client-server secret should resolve."),
			"session secret key"
		);
	}

	#[test]
	fn circuit_is_undefined_without_token_or_key() {
		let no_token = base().with_session_secret_key("session secret key");
		let no_key = Credentials::new("app-id", "")
			.with_access_token("token")
			.with_app_secret_key("app secret key");
		let no_secret = base().with_access_token("token");

		for creds in [no_token, no_key, no_secret] {
			assert_eq!(creds.sig_circuit(), SignatureCircuit::Undefined);

			let err = creds.secret_key().expect_err("Undefined circuit must not resolve a secret.");

			assert!(matches!(err, Error::Config(ConfigError::UndefinedSignatureCircuit)));
		}
	}

	#[test]
	fn circuit_tracks_field_mutation() {
		let mut creds = base().with_access_token("token").with_session_secret_key("s");

		assert_eq!(creds.sig_circuit(), SignatureCircuit::ClientServer);

		creds.app_secret_key = Some("app".into());

		assert_eq!(creds.sig_circuit(), SignatureCircuit::ServerServer);

		creds.access_token = None;

		assert_eq!(creds.sig_circuit(), SignatureCircuit::Undefined);
	}

	#[test]
	fn session_key_aliases_access_token() {
		let mut creds = base();

		creds.set_session_key("legacy");

		assert_eq!(creds.access_token.as_ref().map(TokenSecret::expose), Some("legacy"));
		assert_eq!(creds.session_key().map(TokenSecret::expose), Some("legacy"));
	}
}
