//! Endpoint configuration for the REST API, token endpoint, and OAuth dialogs.

// self
use crate::{_prelude::*, error::ConfigError};

/// URLs every session and grant talks to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
	/// REST API entry point (`fb.do`).
	pub api: Url,
	/// OAuth token endpoint used by the authorization-code and refresh grants.
	pub token: Url,
	/// OAuth dialog endpoint used by the implicit grant and authorization URLs.
	pub authorize: Url,
	/// Redirect target of the implicit grant when the caller does not configure one.
	pub implicit_redirect: Url,
}
impl Endpoints {
	/// Production REST API entry point.
	pub const API_URL: &'static str = "https://api.ok.ru/fb.do";
	/// Production authorization dialog.
	pub const AUTHORIZE_URL: &'static str = "https://connect.ok.ru/oauth/authorize";
	/// Default implicit-grant redirect target.
	pub const IMPLICIT_REDIRECT_URL: &'static str = "https://oauth.mycdn.me/blank.html";
	/// Production token endpoint.
	pub const TOKEN_URL: &'static str = "https://api.ok.ru/oauth/token.do";

	/// Production endpoints.
	pub fn production() -> Result<Self> {
		Self::new(Self::API_URL, Self::TOKEN_URL, Self::AUTHORIZE_URL, Self::IMPLICIT_REDIRECT_URL)
	}

	/// Parses a full endpoint set.
	pub fn new(api: &str, token: &str, authorize: &str, implicit_redirect: &str) -> Result<Self> {
		Ok(Self {
			api: parse(api)?,
			token: parse(token)?,
			authorize: parse(authorize)?,
			implicit_redirect: parse(implicit_redirect)?,
		})
	}

	/// Points every endpoint at `base`, keeping the production paths.
	///
	/// Used to aim a session at a mock server.
	pub fn with_base_url(base: &str) -> Result<Self> {
		let base = parse(base)?;
		let join = |path: &str| {
			base.join(path)
				.map_err(|source| Error::from(ConfigError::InvalidUrl { url: path.into(), source }))
		};

		Ok(Self {
			api: join("/fb.do")?,
			token: join("/oauth/token.do")?,
			authorize: join("/oauth/authorize")?,
			implicit_redirect: join("/blank.html")?,
		})
	}

	/// `api` with extra path segments appended.
	pub fn api_url(&self, segments: &[&str]) -> Url {
		append_segments(&self.api, segments)
	}
}

pub(crate) fn parse(url: &str) -> Result<Url> {
	Url::parse(url).map_err(|source| ConfigError::InvalidUrl { url: url.into(), source }.into())
}

fn append_segments(base: &Url, segments: &[&str]) -> Url {
	if segments.is_empty() {
		return base.clone();
	}

	let path = format!("{}/{}", base.path().trim_end_matches('/'), segments.join("/"));
	let mut url = base.clone();

	url.set_path(&path);

	url
}
