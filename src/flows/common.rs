//! Single-flight guards shared by the grant flows.

// self
use crate::{_prelude::*, auth::SessionId, flows::Broker};

/// Key identifying a token that can be refreshed independently.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FlowKey {
	/// The process-wide client-credentials token.
	ClientCredentials,
	/// The user token bound to a session.
	Session(SessionId),
}

/// Returns (and creates on demand) the single-flight guard for `key`.
pub(crate) fn flow_guard(broker: &Broker, key: &FlowKey) -> Arc<AsyncMutex<()>> {
	let mut guards = broker.flow_guards.lock();

	guards.entry(key.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
}

/// Drops the guard for `key` so the guard map does not grow with abandoned sessions.
pub(crate) fn forget_flow_guard(broker: &Broker, key: &FlowKey) {
	broker.flow_guards.lock().remove(key);
}
