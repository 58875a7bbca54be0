//! Authorization-code flow: authorize URL construction, callback state checks, and code exchange.

// self
use crate::{
	_prelude::*,
	auth::{SessionId, TokenPayload, UserTokenRecord},
	config::StateValidation,
	flows::Broker,
	obs::{self, FlowKind},
};

/// Prefix shared by every state value the broker issues.
pub const STATE_PREFIX: &str = "kroger_auth_";

impl Broker {
	/// Builds the upstream authorize URL.
	///
	/// Without an explicit `state`, a time-based `kroger_auth_<unix seconds>` value is used.
	/// Such values cannot pass strict callback validation, so session-bound callers should prefer
	/// [`Broker::authorization_url_for_session`].
	pub fn authorization_url(&self, redirect_uri: &Url, state: Option<&str>) -> Url {
		let state = match state {
			Some(state) => state.to_owned(),
			None => format!("{STATE_PREFIX}{}", self.now().unix_timestamp()),
		};
		let mut url = self.config.endpoints.authorize.clone();

		url.query_pairs_mut()
			.append_pair("scope", &self.config.user_scope.normalized())
			.append_pair("response_type", "code")
			.append_pair("client_id", &self.config.client_id)
			.append_pair("redirect_uri", redirect_uri.as_str())
			.append_pair("state", &state);

		url
	}

	/// State value binding an authorization redirect to `session`.
	pub fn session_state(&self, session: &SessionId) -> String {
		format!("{STATE_PREFIX}{session}")
	}

	/// Authorize URL for `session` using the configured redirect URI.
	pub fn authorization_url_for_session(&self, session: &SessionId) -> Url {
		self.authorization_url(&self.config.redirect_uri, Some(&self.session_state(session)))
	}

	/// Checks the `state` returned on the authorization callback.
	pub fn validate_callback_state(&self, session: &SessionId, returned: Option<&str>) -> Result<()> {
		let Some(returned) = returned.filter(|state| !state.is_empty()) else {
			return Err(Error::InvalidState { reason: "missing state parameter".into() });
		};

		if returned == self.session_state(session) {
			return Ok(());
		}
		if self.config.state_validation == StateValidation::LenientPrefix
			&& returned.starts_with(STATE_PREFIX)
		{
			obs::log_lenient_state(session);

			return Ok(());
		}

		Err(Error::InvalidState { reason: "state does not match the session".into() })
	}

	/// Exchanges an authorization code for a user token.
	pub async fn exchange_code(&self, code: &str, redirect_uri: &Url) -> Result<TokenPayload> {
		if code.is_empty() {
			return Err(Error::invalid_argument("authorization code is required"));
		}

		obs::observe(FlowKind::AuthorizationCode, "exchange_code", async move {
			self.facade
				.exchange_authorization_code(code, redirect_uri)
				.await
				.map_err(Error::TokenExchange)
		})
		.await
	}

	/// Handles an authorization callback: validates `state`, exchanges `code` against the
	/// configured redirect URI, and stores the resulting token for `session`.
	pub async fn complete_authorization(
		&self,
		session: &SessionId,
		code: &str,
		state: Option<&str>,
	) -> Result<UserTokenRecord> {
		self.validate_callback_state(session, state)?;

		let payload = self.exchange_code(code, &self.config.redirect_uri).await?;

		Ok(self.save_payload(session, payload))
	}
}
