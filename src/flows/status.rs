//! Diagnostic snapshot of broker state.

// self
use crate::{
	_prelude::*,
	flows::{Broker, RefreshSnapshot},
};

const CLIENT_ID_PREVIEW_CHARS: usize = 8;

/// Point-in-time view of the broker, safe to expose on a health endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BrokerStatus {
	/// Configured API base URL.
	pub base_url: String,
	/// First characters of the client id followed by `...`.
	pub client_id_preview: String,
	/// Whether a client-credentials token is cached.
	pub has_client_token: bool,
	/// Number of sessions holding a user token.
	pub active_user_sessions: usize,
	/// User token refresh counters.
	pub refresh: RefreshSnapshot,
}

impl Broker {
	/// Returns a snapshot of the broker's configuration and token state.
	pub fn status(&self) -> BrokerStatus {
		let client_id_preview = self
			.config
			.client_id
			.chars()
			.take(CLIENT_ID_PREVIEW_CHARS)
			.chain("...".chars())
			.collect();

		BrokerStatus {
			base_url: self.config.base_url.to_string(),
			client_id_preview,
			has_client_token: self.has_client_token(),
			active_user_sessions: self.store.len(),
			refresh: self.refresh_metrics.snapshot(),
		}
	}
}
