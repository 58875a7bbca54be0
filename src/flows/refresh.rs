//! User token refresh with per-session single-flight guards.
//!
//! [`Broker::ensure_fresh_user_token`] is the entry point used by every user-scoped call. It
//! returns the stored record while it is outside the skew window and otherwise performs one
//! `grant_type=refresh_token` call per session, however many requests observe the expiry.

mod metrics;

pub use metrics::*;

// self
use crate::{
	_prelude::*,
	auth::{SessionId, TokenPayload, UserTokenRecord},
	flows::{
		Broker,
		common::{self, FlowKey},
	},
	obs::{self, FlowKind},
};

impl Broker {
	/// Performs the refresh-token grant and returns the raw response.
	pub async fn refresh_user_token(&self, refresh_token: &str) -> Result<TokenPayload> {
		if refresh_token.is_empty() {
			return Err(Error::invalid_argument("refresh token is required"));
		}

		obs::observe(FlowKind::Refresh, "refresh_user_token", async move {
			self.refresh_metrics.record_attempt();

			let result =
				self.facade.refresh_token(refresh_token).await.map_err(Error::TokenRefresh);

			self.refresh_metrics.record_outcome(&result);

			result
		})
		.await
	}

	/// Returns a usable user token for `session`, refreshing it when inside the skew window.
	///
	/// Fails with [`Error::NotAuthenticated`] when no record exists and with
	/// [`Error::TokenExpired`] when the record needs a refresh but carries no refresh token.
	/// The latter never touches the network.
	pub async fn ensure_fresh_user_token(&self, session: &SessionId) -> Result<UserTokenRecord> {
		let not_authenticated = || Error::NotAuthenticated { session: session.clone() };
		let skew = self.config.expiry_skew;
		let current = self.store.fetch(session).ok_or_else(not_authenticated)?;

		if !current.needs_refresh_at(self.now(), skew) {
			self.refresh_metrics.record_reuse();

			return Ok(current);
		}

		let guard = common::flow_guard(self, &FlowKey::Session(session.clone()));
		let _singleflight = guard.lock().await;
		// Re-read: a concurrent caller may have refreshed or cleared the session while we waited.
		let current = self.store.fetch(session).ok_or_else(not_authenticated)?;

		if !current.needs_refresh_at(self.now(), skew) {
			self.refresh_metrics.record_reuse();

			return Ok(current);
		}

		let Some(previous_refresh) = current.refresh_token else {
			return Err(Error::TokenExpired { session: session.clone() });
		};
		let mut payload = self.refresh_user_token(previous_refresh.expose()).await?;

		if payload.refresh_token.is_none() {
			payload.refresh_token = Some(previous_refresh);
		}

		let record = UserTokenRecord::from_payload(payload, self.now());

		if !self.store.replace(session, record) {
			return Err(not_authenticated());
		}

		self.store.fetch(session).ok_or_else(not_authenticated)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::_preludet::{build_test_broker, test_config};

	#[tokio::test]
	async fn missing_session_is_not_authenticated() {
		let (broker, _) = build_test_broker(test_config("https://127.0.0.1:1"));
		let session = SessionId::new("ghost").expect("Session fixture should be valid.");
		let err = broker
			.ensure_fresh_user_token(&session)
			.await
			.expect_err("Unknown sessions must be rejected.");

		assert!(matches!(err, Error::NotAuthenticated { .. }));
		assert_eq!(err.http_status_hint(), 401);
	}

	#[tokio::test]
	async fn fresh_token_is_returned_without_refresh() {
		let (broker, clock) = build_test_broker(test_config("https://127.0.0.1:1"));
		let session = SessionId::new("fresh").expect("Session fixture should be valid.");

		broker.store_user_token(&session, TokenPayload::new("user-a").with_expires_in(3_600));
		clock.advance(Duration::minutes(54));

		let record = broker
			.ensure_fresh_user_token(&session)
			.await
			.expect("Fresh tokens should be returned as-is.");

		assert_eq!(record.access_token.expose(), "user-a");
		assert_eq!(broker.refresh_metrics.snapshot().reused, 1);
		assert_eq!(broker.refresh_metrics.snapshot().attempts, 0);
	}

	#[tokio::test]
	async fn stale_token_without_refresh_token_expires_locally() {
		let (broker, clock) = build_test_broker(test_config("https://127.0.0.1:1"));
		let session = SessionId::new("stale").expect("Session fixture should be valid.");

		broker.store_user_token(&session, TokenPayload::new("user-a").with_expires_in(600));
		clock.advance(Duration::minutes(6));

		let err = broker
			.ensure_fresh_user_token(&session)
			.await
			.expect_err("Tokens inside the skew window without a refresh token must fail.");

		assert!(matches!(err, Error::TokenExpired { .. }));
		assert_eq!(broker.refresh_metrics.snapshot().attempts, 0);
	}
}
