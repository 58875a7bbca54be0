// std
use std::sync::atomic::{AtomicU64, Ordering::Relaxed};
// self
use crate::_prelude::*;

/// Lock-free counters describing how user token lookups were satisfied.
#[derive(Debug, Default)]
pub struct RefreshMetrics {
	reused: AtomicU64,
	attempts: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
}
impl RefreshMetrics {
	/// Reads every counter at once.
	pub fn snapshot(&self) -> RefreshSnapshot {
		RefreshSnapshot {
			reused: self.reused.load(Relaxed),
			attempts: self.attempts.load(Relaxed),
			successes: self.success.load(Relaxed),
			failures: self.failure.load(Relaxed),
		}
	}

	pub(crate) fn record_reuse(&self) {
		self.reused.fetch_add(1, Relaxed);
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Relaxed);
	}

	pub(crate) fn record_outcome<T>(&self, result: &Result<T>) {
		match result {
			Ok(_) => self.success.fetch_add(1, Relaxed),
			Err(_) => self.failure.fetch_add(1, Relaxed),
		};
	}
}

/// Copy of [`RefreshMetrics`] at one instant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RefreshSnapshot {
	/// Lookups answered by a still-fresh stored token.
	pub reused: u64,
	/// Refresh-token grants sent upstream.
	pub attempts: u64,
	/// Grants upstream answered with a token.
	///
	/// Storing the token can still fail when the session was cleared during the grant.
	pub successes: u64,
	/// Grants that failed.
	pub failures: u64,
}
