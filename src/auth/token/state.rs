//! Authorization state populated by a successful grant.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Grant-populated fields that live next to the [`Credentials`](crate::auth::Credentials)
/// they complement.
///
/// Every field stays empty until an authorize step succeeds; re-authorizing overwrites
/// them in place.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenState {
	/// Refresh token issued by the token endpoint.
	pub refresh_token: Option<TokenSecret>,
	/// Token type reported by the token endpoint.
	pub token_type: Option<String>,
	/// Lifetime in seconds reported by the provider.
	pub expires_in: Option<u64>,
	/// Expiry instant derived from `expires_in` at authorization time.
	#[serde(with = "time::serde::rfc3339::option", default)]
	pub expires_at: Option<OffsetDateTime>,
	/// `state` echoed back by the implicit grant redirect.
	pub state: Option<String>,
	/// `permissions_granted` reported by the implicit grant redirect.
	pub permissions_granted: Option<String>,
}
impl TokenState {
	/// Records the token lifetime relative to `now`.
	pub fn set_expires_in(&mut self, expires_in: Option<u64>, now: OffsetDateTime) {
		self.expires_in = expires_in;
		self.expires_at = expires_in
			.and_then(|secs| i64::try_from(secs).ok())
			.map(|secs| now + Duration::seconds(secs));
	}

	/// Returns `true` if the token has a known expiry at or before `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|at| instant >= at)
	}

	/// Returns `true` if the token has a known expiry that already passed.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}
}
impl Debug for TokenState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenState")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("token_type", &self.token_type)
			.field("expires_in", &self.expires_in)
			.field("expires_at", &self.expires_at)
			.field("state", &self.state)
			.field("permissions_granted", &self.permissions_granted)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn expiry_is_derived_from_lifetime() {
		let now = OffsetDateTime::now_utc();
		let mut state = TokenState::default();

		assert!(!state.is_expired_at(now));

		state.set_expires_in(Some(60), now);

		assert_eq!(state.expires_at, Some(now + Duration::seconds(60)));
		assert!(!state.is_expired_at(now + Duration::seconds(59)));
		assert!(state.is_expired_at(now + Duration::seconds(60)));
	}

	#[test]
	fn debug_redacts_refresh_token() {
		let state =
			TokenState { refresh_token: Some("refresh".into()), ..Default::default() };

		assert!(!format!("{state:?}").contains("\"refresh\""));
		assert!(format!("{state:?}").contains("<redacted>"));
	}
}
