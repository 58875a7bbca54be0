//! Client-credentials token caching with a single-flight guard.
//!
//! [`Broker::client_token`] returns the cached app token while it is outside the skew window
//! and otherwise performs one `grant_type=client_credentials` call, even when many callers
//! observe the expiry at once.

// self
use crate::{
	_prelude::*,
	auth::{ClientToken, TokenSecret},
	error::UpstreamFailure,
	flows::{
		Broker,
		common::{self, FlowKey},
	},
	obs::{self, FlowKind},
};

impl Broker {
	/// Returns a valid client-credentials access token, requesting a new one when needed.
	pub async fn client_token(&self) -> Result<TokenSecret> {
		if let Some(token) = self.cached_client_token() {
			return Ok(token);
		}

		obs::observe(FlowKind::ClientCredentials, "client_token", async move {
			let guard = common::flow_guard(self, &FlowKey::ClientCredentials);
			let _singleflight = guard.lock().await;

			if let Some(token) = self.cached_client_token() {
				return Ok(token);
			}

			let payload = self
				.facade
				.exchange_client_credentials(&self.config.client_scope)
				.await
				.map_err(Error::Authentication)?;
			let unusable = |message: &str| {
				Error::Authentication(UpstreamFailure::Unexpected {
					status: Some(200),
					message: message.into(),
				})
			};
			let expires_in = payload
				.expires_in
				.filter(|secs| *secs > 0)
				.and_then(|secs| i64::try_from(secs).ok())
				.ok_or_else(|| unusable("missing or non-positive expires_in"))?;
			let token =
				ClientToken::issued_at(payload.access_token, self.now(), Duration::seconds(expires_in))
					.ok_or_else(|| unusable("expires_in is out of range"))?;
			let access_token = token.access_token.clone();

			*self.client_token.write() = Some(token);

			Ok(access_token)
		})
		.await
	}

	/// Returns `true` while a cached client token exists, fresh or not.
	pub fn has_client_token(&self) -> bool {
		self.client_token.read().is_some()
	}

	fn cached_client_token(&self) -> Option<TokenSecret> {
		let now = self.now();

		self.client_token
			.read()
			.as_ref()
			.filter(|token| token.is_fresh_at(now, self.config.expiry_skew))
			.map(|token| token.access_token.clone())
	}
}
