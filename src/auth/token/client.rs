//! Process-wide client-credentials token.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Application-level token obtained through the client-credentials grant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientToken {
	/// Bearer value sent to resource endpoints.
	pub access_token: TokenSecret,
	/// Absolute expiry instant.
	pub expires_at: OffsetDateTime,
}
impl ClientToken {
	/// Builds a token that expires `expires_in` after `now`.
	///
	/// Returns `None` when the expiry instant is not representable.
	pub fn issued_at(
		access_token: impl Into<TokenSecret>,
		now: OffsetDateTime,
		expires_in: Duration,
	) -> Option<Self> {
		let expires_at = now.checked_add(expires_in)?;

		Some(Self { access_token: access_token.into(), expires_at })
	}

	/// Returns `true` while `now` is strictly before `expires_at - skew`.
	pub fn is_fresh_at(&self, now: OffsetDateTime, skew: Duration) -> bool {
		self.expires_at.checked_sub(skew).is_some_and(|edge| now < edge)
	}
}
