//! Per-session user token records and lifecycle helpers.

// crates.io
use time::Date;
// self
use crate::{
	_prelude::*,
	auth::token::{payload::TokenPayload, secret::TokenSecret},
};

/// Lifetime applied when the token endpoint omits `expires_in`.
pub const DEFAULT_USER_TOKEN_TTL: Duration = Duration::seconds(1_800);
/// Token type applied when the token endpoint omits `token_type`.
pub const DEFAULT_TOKEN_TYPE: &str = "bearer";

/// Lifecycle status for a user token record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStatus {
	/// Token is valid and outside the skew window.
	Active,
	/// Token has not expired yet but falls inside the skew window.
	Stale,
	/// Token exceeded its expiry instant.
	Expired,
}

/// User token issued through the authorization-code flow and bound to one session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTokenRecord {
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Refresh token secret, if upstream issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Expiry instant derived from the store time plus `expires_in`.
	pub expires_at: OffsetDateTime,
	/// Token type reported upstream.
	pub token_type: String,
}
impl UserTokenRecord {
	/// Builds a record from a grant response received at `now`.
	///
	/// A lifetime that runs past the representable calendar saturates at its last day.
	pub fn from_payload(payload: TokenPayload, now: OffsetDateTime) -> Self {
		let ttl = payload
			.expires_in
			.and_then(|secs| i64::try_from(secs).ok())
			.map(Duration::seconds)
			.unwrap_or(DEFAULT_USER_TOKEN_TTL);

		Self {
			access_token: payload.access_token,
			refresh_token: payload.refresh_token,
			expires_at: now.checked_add(ttl).unwrap_or_else(|| Date::MAX.midnight().assume_utc()),
			token_type: payload.token_type.unwrap_or_else(|| DEFAULT_TOKEN_TYPE.into()),
		}
	}

	/// Computes the lifecycle status at `now` for the given skew window.
	pub fn status_at(&self, now: OffsetDateTime, skew: Duration) -> TokenStatus {
		if now >= self.expires_at {
			TokenStatus::Expired
		} else if self.expires_at.checked_sub(skew).is_none_or(|edge| now >= edge) {
			TokenStatus::Stale
		} else {
			TokenStatus::Active
		}
	}

	/// Returns `true` unless the record is [`TokenStatus::Active`] at `now`.
	pub fn needs_refresh_at(&self, now: OffsetDateTime, skew: Duration) -> bool {
		!matches!(self.status_at(now, skew), TokenStatus::Active)
	}
}
impl Debug for UserTokenRecord {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("UserTokenRecord")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("expires_at", &self.expires_at)
			.field("token_type", &self.token_type)
			.finish()
	}
}
