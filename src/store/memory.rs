//! Thread-safe in-memory [`SessionStore`]; the default backend.

// self
use crate::{
	_prelude::*,
	auth::{SessionId, UserTokenRecord},
	store::SessionStore,
};

/// Session map kept in process memory. Nothing survives a restart.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<RwLock<HashMap<SessionId, UserTokenRecord>>>);
impl SessionStore for MemoryStore {
	fn save(&self, session: SessionId, record: UserTokenRecord) {
		self.0.write().insert(session, record);
	}

	fn replace(&self, session: &SessionId, record: UserTokenRecord) -> bool {
		match self.0.write().get_mut(session) {
			Some(slot) => {
				*slot = record;

				true
			},
			None => false,
		}
	}

	fn fetch(&self, session: &SessionId) -> Option<UserTokenRecord> {
		self.0.read().get(session).cloned()
	}

	fn remove(&self, session: &SessionId) -> Option<UserTokenRecord> {
		self.0.write().remove(session)
	}

	fn remove_expired_before(&self, cutoff: OffsetDateTime) -> Vec<SessionId> {
		let mut removed = Vec::new();

		self.0.write().retain(|session, record| {
			let keep = record.expires_at > cutoff;

			if !keep {
				removed.push(session.clone());
			}

			keep
		});

		removed
	}

	fn len(&self) -> usize {
		self.0.read().len()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::auth::TokenPayload;

	fn record(expires_in: u64) -> UserTokenRecord {
		UserTokenRecord::from_payload(
			TokenPayload::new("access").with_expires_in(expires_in),
			macros::datetime!(2025-01-01 00:00 UTC),
		)
	}

	fn session(raw: &str) -> SessionId {
		SessionId::new(raw).expect("Session fixture should be valid.")
	}

	#[test]
	fn replace_does_not_resurrect_removed_sessions() {
		let store = MemoryStore::default();
		let id = session("session-a");

		assert!(!store.replace(&id, record(60)));
		assert!(store.is_empty());

		store.save(id.clone(), record(60));

		assert!(store.replace(&id, record(120)));
		assert_eq!(
			store.fetch(&id).map(|r| r.expires_at),
			Some(macros::datetime!(2025-01-01 00:02 UTC))
		);
		assert!(store.remove(&id).is_some());
		assert!(store.remove(&id).is_none(), "Removal must be idempotent.");
	}

	#[test]
	fn expired_sweep_keeps_live_records() {
		let store = MemoryStore::default();

		store.save(session("old"), record(60));
		store.save(session("new"), record(3_600));

		assert_eq!(
			store.remove_expired_before(macros::datetime!(2025-01-01 00:01 UTC)),
			[session("old")]
		);
		assert_eq!(store.len(), 1);
		assert!(store.fetch(&session("new")).is_some());
	}
}
