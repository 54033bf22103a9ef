//! Implicit grant driven through the browser-style login and consent dialogs.
//!
//! One pass opens the authorization dialog, fills and submits the login form if the
//! dialog asks for it, accepts the permissions dialog if it appears, and then reads the
//! token from the fragment of the last redirect. Passes repeat up to
//! [`ImplicitGrant::attempts`] times with [`ImplicitGrant::retry_interval`] between them.
//! A login form that survives submission means the credentials were rejected and ends the
//! flow without further passes.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::{ApiError, OAuthError},
	flows::common,
	form::Form,
	grant::ImplicitGrant,
	http::{HttpRequest, HttpResponse, HttpTransport},
	obs,
	session::TokenSession,
};

/// Path of the dialog pages.
pub const DIALOG_PATH: &str = "/dk";
/// `st.cmd` value of the login dialog.
pub const LOGIN_COMMAND: &str = "OAuth2Login";
/// `st.cmd` value of the permissions dialog.
pub const PERMISSIONS_COMMAND: &str = "OAuth2Permissions";

const STATE_LEN: usize = 32;

/// Dialog page a response landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialogStep {
	/// Login form.
	Login,
	/// Permissions consent form.
	Permissions,
	/// Any other page.
	Other,
}
impl DialogStep {
	/// Classifies a dialog URL by its path and `st.cmd` query value.
	pub fn of(url: &Url) -> Self {
		if url.path() != DIALOG_PATH {
			return Self::Other;
		}

		match url.query_pairs().find(|(k, _)| k == "st.cmd").map(|(_, v)| v) {
			Some(cmd) if cmd == LOGIN_COMMAND => Self::Login,
			Some(cmd) if cmd == PERMISSIONS_COMMAND => Self::Permissions,
			_ => Self::Other,
		}
	}
}

impl<C> TokenSession<C>
where
	C: ?Sized + HttpTransport,
{
	/// Runs dialog passes until a token is read, the login is rejected, or attempts run out.
	pub(crate) async fn run_implicit(&mut self, grant: &ImplicitGrant) -> Result<()> {
		let redirect_uri =
			grant.redirect_uri.clone().unwrap_or_else(|| self.public.endpoints.implicit_redirect.clone());
		let state = grant.state.clone().unwrap_or_else(random_state);
		let query = common::pairs([
			("client_id", self.credentials.app_id.as_str()),
			("scope", grant.scope.as_str()),
			("response_type", "token"),
			("redirect_uri", redirect_uri.as_str()),
			("layout", "w"),
			("state", state.as_str()),
		]);
		let attempts = grant.attempts.max(1);

		for attempt in 1..=attempts {
			obs::stage("auth_dialog", &attempt);

			let mut page = self.open_auth_dialog(&query).await?;

			if DialogStep::of(&page.url) == DialogStep::Login {
				obs::stage("login_form", &page.url);

				page = self.submit_login(&page, grant).await?;
			}

			match DialogStep::of(&page.url) {
				DialogStep::Permissions => {
					obs::stage("permissions_form", &page.url);

					page = self.submit_permissions(&page).await?;
				},
				DialogStep::Login => return Err(OAuthError::InvalidGrant.into()),
				DialogStep::Other => {},
			}

			if is_redirect_target(&page.url, &redirect_uri) {
				obs::stage("redirect", &page.url);

				return self.read_implicit_token(&query, &state).await;
			}
			if attempt < attempts {
				tokio::time::sleep(grant.retry_interval).await;
			}
		}

		Err(OAuthError::new(format!("{attempts} login attempts exceeded.")).into())
	}

	async fn open_auth_dialog(&self, query: &[(String, String)]) -> Result<HttpResponse> {
		let request =
			HttpRequest::get(self.public.endpoints.authorize.clone()).with_query(query.to_vec());
		let response = self.public.transport.send(request).await?;

		if response.status == 200 {
			return Ok(response);
		}

		match serde_json::from_str::<Value>(&response.body) {
			Ok(payload) if payload.get("error_code").is_some() =>
				Err(ApiError::from_payload(&payload).into()),
			Ok(payload) if payload.get("error").is_some() =>
				Err(OAuthError::from_payload(&payload).into()),
			_ => Err(OAuthError::new("Failed to open authorization dialog.").into()),
		}
	}

	async fn submit_login(&self, page: &HttpResponse, grant: &ImplicitGrant) -> Result<HttpResponse> {
		let mut form = Form::parse(&page.body);

		form.set("fr.email", grant.login.as_str());
		form.set("fr.password", grant.password.expose());

		self.submit_form(page, &form, "Form submission failed.").await
	}

	async fn submit_permissions(&self, page: &HttpResponse) -> Result<HttpResponse> {
		let mut form = Form::parse(&page.body);

		form.set("button_accept_request", "");

		self.submit_form(page, &form, "Failed to process access dialog.").await
	}

	async fn submit_form(
		&self,
		page: &HttpResponse,
		form: &Form,
		failure: &'static str,
	) -> Result<HttpResponse> {
		let action = page.url.join(&form.url).map_err(|_| OAuthError::new(failure))?;
		let response =
			self.public.transport.send(HttpRequest::post(action).with_form(form.to_pairs())).await?;

		if response.status == 200 { Ok(response) } else { Err(OAuthError::new(failure).into()) }
	}

	/// Re-opens the dialog with the established session and reads the redirect fragment.
	async fn read_implicit_token(&mut self, query: &[(String, String)], state: &str) -> Result<()> {
		let failure = || OAuthError::new("Failed to receive access token.");
		let request =
			HttpRequest::get(self.public.endpoints.authorize.clone()).with_query(query.to_vec());
		let response = self.public.transport.send(request).await?;

		if response.status != 200 {
			return Err(failure().into());
		}

		let location = response.last_location().ok_or_else(failure)?;
		let fragment = fragment_params(location);

		if fragment.get("error").is_some() {
			return Err(OAuthError::from_payload(&fragment).into());
		}

		let access_token = common::required_str(&fragment, "access_token")?;
		let session_secret_key = common::required_str(&fragment, "session_secret_key")?;
		let returned_state = common::optional_str(&fragment, "state");

		if returned_state.as_deref().is_some_and(|returned| returned != state) {
			return Err(OAuthError::new("state mismatch in the authorization redirect.").into());
		}

		let expires_in = common::parse_expires_in(fragment.get("expires_in"))?;

		self.credentials.access_token = Some(TokenSecret::new(access_token));
		self.credentials.session_secret_key = Some(TokenSecret::new(session_secret_key));
		self.token.state = returned_state;
		self.token.permissions_granted = common::optional_str(&fragment, "permissions_granted");
		self.token.set_expires_in(expires_in, OffsetDateTime::now_utc());

		Ok(())
	}
}

/// Parses a URL fragment as `application/x-www-form-urlencoded` pairs.
pub fn fragment_params(url: &Url) -> Value {
	let fragment = url.fragment().unwrap_or_default();
	let map = url::form_urlencoded::parse(fragment.as_bytes())
		.map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
		.collect::<serde_json::Map<_, _>>();

	Value::Object(map)
}

/// Whether `url` is the redirect target: same host, port, and path.
pub fn is_redirect_target(url: &Url, redirect_uri: &Url) -> bool {
	url.host_str() == redirect_uri.host_str()
		&& url.port_or_known_default() == redirect_uri.port_or_known_default()
		&& url.path() == redirect_uri.path()
}

fn random_state() -> String {
	rand::rng().sample_iter(Alphanumeric).take(STATE_LEN).map(char::from).collect()
}
