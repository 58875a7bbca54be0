//! Observability helpers shared by every broker flow.
//!
//! # Feature Flags
//!
//! - `tracing` (default) wraps each flow in a `kroger_broker.flow` span carrying the `flow` and
//!   `stage` fields, and emits warning events for failures and lenient state acceptance.
//! - `metrics` increments `kroger_broker_flow_total` for each flow outcome and
//!   `kroger_broker_upstream_error_total` for failures that carry an upstream HTTP status.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Flow kinds observed by the broker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Client-credentials grant for the shared app token.
	ClientCredentials,
	/// Authorization URL construction, callback handling, and code exchange.
	AuthorizationCode,
	/// User token refresh.
	Refresh,
	/// Location, product, identity, and cart calls.
	Resource,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::ClientCredentials => "client_credentials",
			FlowKind::AuthorizationCode => "authorization_code",
			FlowKind::Refresh => "refresh",
			FlowKind::Resource => "resource",
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
	/// Entry to a broker operation.
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

/// Runs `fut` inside a [`FlowSpan`] and records attempt plus final outcome.
pub(crate) async fn observe<T, Fut>(kind: FlowKind, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = FlowSpan::new(kind, stage);

	record_flow_outcome(kind, stage, FlowOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => record_flow_outcome(kind, stage, FlowOutcome::Success),
		Err(err) => {
			record_flow_outcome(kind, stage, FlowOutcome::Failure);

			if let Some(status) = err.upstream_status() {
				record_upstream_error(kind, status);
			}

			log_flow_failure(kind, stage, err);
		},
	}

	result
}
