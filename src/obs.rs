//! Optional observability helpers for sessions and grant flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `okru.flow` with the `flow` (call or
//!   grant) and `stage` (call site) fields, plus `debug` events for dialog transitions and
//!   `warn` events for failures.
//! - Enable `metrics` to increment the `okru_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`.
//!
//! The crate never installs a subscriber or recorder; the host application does.

mod tracing;

pub use tracing::*;

// self
use crate::{_prelude::*, grant::GrantType};

/// Operations observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Unsigned call through [`PublicSession`](crate::session::PublicSession).
	PublicRequest,
	/// Signed call through [`TokenSession`](crate::session::TokenSession).
	Request,
	/// Authorization Code grant.
	AuthorizationCode,
	/// Implicit grant.
	Implicit,
	/// Password grant.
	Password,
	/// Refresh Token grant.
	RefreshToken,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::PublicRequest => "public_request",
			FlowKind::Request => "request",
			FlowKind::AuthorizationCode => "authorization_code",
			FlowKind::Implicit => "implicit",
			FlowKind::Password => "password",
			FlowKind::RefreshToken => "refresh_token",
		}
	}
}
impl From<GrantType> for FlowKind {
	fn from(grant: GrantType) -> Self {
		match grant {
			GrantType::AuthorizationCode => FlowKind::AuthorizationCode,
			GrantType::Implicit => FlowKind::Implicit,
			GrantType::Password => FlowKind::Password,
			GrantType::RefreshToken => FlowKind::RefreshToken,
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a session call or grant.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Metric counting flow attempts and outcomes.
pub const FLOW_COUNTER: &str = "okru_flow_total";

/// Increments [`FLOW_COUNTER`] for `kind`/`outcome` when the `metrics` feature is enabled.
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!(FLOW_COUNTER, "flow" => kind.as_str(), "outcome" => outcome.as_str())
		.increment(1);
	#[cfg(not(feature = "metrics"))]
	let _ = (kind, outcome);
}

/// Runs `fut` inside a flow span, recording attempt and outcome around it.
pub(crate) async fn observe<T, Fut>(kind: FlowKind, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = FlowSpan::new(kind, stage);

	record_flow_outcome(kind, FlowOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => record_flow_outcome(kind, FlowOutcome::Success),
		Err(err) => {
			span.failure(err);
			record_flow_outcome(kind, FlowOutcome::Failure);
		},
	}

	result
}
