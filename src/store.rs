//! Session token storage contract and the in-process implementation.

mod memory;

pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{SessionId, UserTokenRecord},
};

/// Storage backend for per-session user tokens.
///
/// Implementations are synchronous; the broker never holds their locks across an `.await`.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Inserts or replaces the record for `session`.
	fn save(&self, session: SessionId, record: UserTokenRecord);

	/// Replaces the record only if one is still present, returning whether it did.
	///
	/// Refresh uses this so a logout that races a refresh is not undone.
	fn replace(&self, session: &SessionId, record: UserTokenRecord) -> bool;

	/// Returns a copy of the record for `session`.
	fn fetch(&self, session: &SessionId) -> Option<UserTokenRecord>;

	/// Removes the record for `session`, returning it if present.
	fn remove(&self, session: &SessionId) -> Option<UserTokenRecord>;

	/// Removes every record whose `expires_at` is at or before `cutoff`, returning their sessions.
	fn remove_expired_before(&self, cutoff: OffsetDateTime) -> Vec<SessionId>;

	/// Number of stored sessions.
	fn len(&self) -> usize;

	/// Returns `true` when no sessions are stored.
	fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
