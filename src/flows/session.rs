//! Per-session user token bookkeeping.

// self
use crate::{
	_prelude::*,
	auth::{SessionId, TokenPayload, UserTokenRecord},
	flows::{
		Broker,
		common::{self, FlowKey},
	},
};

impl Broker {
	/// Stores a grant response for `session`, replacing any previous record.
	///
	/// `expires_in` defaults to 1800 seconds and `token_type` to `bearer` when absent.
	pub fn store_user_token(&self, session: &SessionId, payload: TokenPayload) {
		self.save_payload(session, payload);
	}

	/// Returns the stored record for `session` without checking expiry.
	pub fn user_token(&self, session: &SessionId) -> Option<UserTokenRecord> {
		self.store.fetch(session)
	}

	/// Returns `true` when a record exists for `session`.
	pub fn has_user_token(&self, session: &SessionId) -> bool {
		self.store.fetch(session).is_some()
	}

	/// Forgets `session`. Calling it for an unknown session is a no-op.
	pub fn clear_user_session(&self, session: &SessionId) {
		self.store.remove(session);

		common::forget_flow_guard(self, &FlowKey::Session(session.clone()));
	}

	/// Drops sessions whose token expired more than the configured idle TTL ago.
	///
	/// Returns the number of sessions removed; always zero when no TTL is configured.
	pub fn prune_sessions(&self) -> usize {
		let Some(ttl) = self.config.session_idle_ttl else {
			return 0;
		};

		let pruned = self.store.remove_expired_before(self.now() - ttl);

		for session in &pruned {
			common::forget_flow_guard(self, &FlowKey::Session(session.clone()));
		}

		pruned.len()
	}

	pub(crate) fn save_payload(&self, session: &SessionId, payload: TokenPayload) -> UserTokenRecord {
		let record = UserTokenRecord::from_payload(payload, self.now());

		self.store.save(session.clone(), record.clone());

		record
	}
}
