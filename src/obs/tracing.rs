// self
use crate::{_prelude::*, auth::SessionId, obs::FlowKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// Span wrapper used by broker flows.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided flow kind + stage.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("kroger_broker.flow", flow = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a warning for a failed flow. Only error messages are logged, never token values.
pub fn log_flow_failure(kind: FlowKind, stage: &'static str, err: &Error) {
	#[cfg(feature = "tracing")]
	tracing::warn!(
		flow = kind.as_str(),
		stage,
		upstream_status = err.upstream_status(),
		error = %err,
		"Broker flow failed."
	);
	#[cfg(not(feature = "tracing"))]
	let _ = (kind, stage, err);
}

/// Emits a warning when a callback state was accepted by prefix only.
pub fn log_lenient_state(session: &SessionId) {
	#[cfg(feature = "tracing")]
	tracing::warn!(
		session = %session,
		"Accepted authorization state by prefix match; strict validation is disabled."
	);
	#[cfg(not(feature = "tracing"))]
	let _ = session;
}
