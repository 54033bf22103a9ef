//! Method-call facade over [`TokenSession::request`].
//!
//! ```no_run
//! # async fn demo(session: okru::session::ReqwestTokenSession) -> okru::error::Result<()> {
//! use okru::signature::Params;
//!
//! let api = session.api();
//! let chained = api.method("users").method("getInfo").call(Params::new().with("uids", "1")).await?;
//! let direct = api.call("users.getInfo", Params::new().with("uids", "1")).await?;
//!
//! assert_eq!(chained, direct);
//! # Ok(())
//! # }
//! ```

// self
use crate::{_prelude::*, http::HttpTransport, session::TokenSession, signature::Params};

/// Entry point for building dotted method names bound to one session.
pub struct Api<'s, C>
where
	C: ?Sized + HttpTransport,
{
	session: &'s TokenSession<C>,
}
impl<'s, C> Api<'s, C>
where
	C: ?Sized + HttpTransport,
{
	/// Binds a facade to `session`.
	pub fn new(session: &'s TokenSession<C>) -> Self {
		Self { session }
	}

	/// Starts a method name with `segment`; dots split it into several segments.
	pub fn method(&self, segment: &str) -> ApiMethod<'s, C> {
		ApiMethod { session: self.session, segments: Vec::new() }.method(segment)
	}

	/// Calls the method `name` (for example `users.getInfo`) with `params`.
	pub async fn call(&self, name: &str, params: Params) -> Result<Value> {
		self.method(name).call(params).await
	}
}
impl<C> Clone for Api<'_, C>
where
	C: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self { session: self.session }
	}
}
impl<C> Debug for Api<'_, C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Api").finish_non_exhaustive()
	}
}

/// Accumulated method name; nothing is sent until [`ApiMethod::call`].
pub struct ApiMethod<'s, C>
where
	C: ?Sized + HttpTransport,
{
	session: &'s TokenSession<C>,
	segments: Vec<String>,
}
impl<'s, C> ApiMethod<'s, C>
where
	C: ?Sized + HttpTransport,
{
	/// Appends `segment`; dots split it into several segments and empty parts are skipped.
	pub fn method(mut self, segment: &str) -> Self {
		self.segments.extend(segment.split('.').filter(|part| !part.is_empty()).map(str::to_owned));

		self
	}

	/// Dotted method name accumulated so far.
	pub fn name(&self) -> String {
		self.segments.join(".")
	}

	/// Sends a signed request with `method` set to the accumulated name.
	pub async fn call(&self, params: Params) -> Result<Value> {
		self.session.request(&[], params.with("method", self.name())).await
	}
}
impl<C> Clone for ApiMethod<'_, C>
where
	C: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self { session: self.session, segments: self.segments.clone() }
	}
}
impl<C> Debug for ApiMethod<'_, C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiMethod").field("name", &self.name()).finish()
	}
}
