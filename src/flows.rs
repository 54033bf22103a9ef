//! Grant flows that populate a [`TokenSession`]'s credentials.
//!
//! Every grant runs through [`TokenSession::authorize`], which dispatches on the session's
//! [`Grant`] and wraps the flow in an `okru.flow` span. A failed grant leaves the previous
//! credential fields untouched.

pub mod authorization_code;
pub mod common;
pub mod implicit;
pub mod password;
pub mod refresh;

pub use common::*;

// self
use crate::{
	_prelude::*,
	grant::Grant,
	http::HttpTransport,
	obs::{self, FlowKind},
	session::TokenSession,
};

impl<C> TokenSession<C>
where
	C: ?Sized + HttpTransport,
{
	/// Runs the configured grant and stores what it yields.
	///
	/// [`Grant::Preauthorized`] returns immediately; every other grant contacts the
	/// provider. Safe to call again to re-authorize.
	pub async fn authorize(&mut self) -> Result<&mut Self> {
		let Some(kind) = self.grant.grant_type().map(FlowKind::from) else {
			return Ok(self);
		};
		let grant = self.grant.clone();

		obs::observe(kind, "authorize", self.run_grant(grant)).await?;

		Ok(self)
	}

	async fn run_grant(&mut self, grant: Grant) -> Result<()> {
		match grant {
			Grant::Preauthorized => Ok(()),
			Grant::AuthorizationCode { code, redirect_uri } =>
				self.exchange_authorization_code(code.expose(), &redirect_uri).await,
			Grant::RefreshToken { refresh_token } =>
				self.exchange_refresh_token(refresh_token.expose()).await,
			Grant::Password { login, password } =>
				self.login_with_password(&login, password.expose()).await,
			Grant::Implicit(implicit) => self.run_implicit(&implicit).await,
		}
	}
}
