// self
use crate::obs::{FlowKind, FlowOutcome};

/// Counts one flow outcome as `kroger_broker_flow_total{flow, stage, outcome}`.
pub fn record_flow_outcome(kind: FlowKind, stage: &'static str, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!(
		"kroger_broker_flow_total",
		"flow" => kind.as_str(),
		"stage" => stage,
		"outcome" => outcome.as_str()
	)
	.increment(1);
	#[cfg(not(feature = "metrics"))]
	let _ = (kind, stage, outcome);
}

/// Counts a non-success upstream answer as `kroger_broker_upstream_error_total{flow, status}`.
///
/// Separates upstream rejections (4xx/5xx) from local failures that never left the process.
pub fn record_upstream_error(kind: FlowKind, status: u16) {
	#[cfg(feature = "metrics")]
	metrics::counter!(
		"kroger_broker_upstream_error_total",
		"flow" => kind.as_str(),
		"status" => status.to_string()
	)
	.increment(1);
	#[cfg(not(feature = "metrics"))]
	let _ = (kind, status);
}
