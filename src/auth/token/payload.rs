//! Raw grant responses returned by the token endpoint.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Token endpoint response for the authorization-code and refresh-token grants.
///
/// Fields mirror the OAuth2 token response; `expires_in` and `token_type` stay optional because
/// upstream occasionally omits them and the broker applies its own defaults when storing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
	/// Issued access token.
	pub access_token: TokenSecret,
	/// Refresh token, when upstream issued one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<TokenSecret>,
	/// Lifetime of the access token in seconds.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub expires_in: Option<u64>,
	/// Token type reported upstream (normally `bearer`).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub token_type: Option<String>,
}
impl TokenPayload {
	/// Creates a payload carrying only an access token.
	pub fn new(access_token: impl Into<TokenSecret>) -> Self {
		Self { access_token: access_token.into(), refresh_token: None, expires_in: None, token_type: None }
	}

	/// Attaches a refresh token.
	pub fn with_refresh_token(mut self, refresh_token: impl Into<TokenSecret>) -> Self {
		self.refresh_token = Some(refresh_token.into());

		self
	}

	/// Sets the lifetime in seconds.
	pub fn with_expires_in(mut self, seconds: u64) -> Self {
		self.expires_in = Some(seconds);

		self
	}

	/// Sets the token type.
	pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
		self.token_type = Some(token_type.into());

		self
	}
}
