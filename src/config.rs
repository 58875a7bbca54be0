//! Broker configuration, validation, and optional command-line/environment loading.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, TokenSecret},
	error::ConfigError,
	provider::Endpoints,
};

/// Production API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.kroger.com";
/// Redirect URI registered for local development.
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8080/auth/callback";
/// Scope requested by the client-credentials grant.
pub const DEFAULT_CLIENT_SCOPE: &str = "product.compact";
/// Scopes requested from the user during authorization.
pub const DEFAULT_USER_SCOPE: &str = "cart.basic:write profile.compact";
/// Buffer before expiry at which tokens are treated as expired.
pub const DEFAULT_EXPIRY_SKEW_SECS: u64 = 300;
/// Upper bound for configured durations (one year).
pub const MAX_DURATION_SECS: u64 = 365 * 24 * 60 * 60;

/// How the authorization callback `state` parameter is checked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum StateValidation {
	/// The state must equal the value issued for the session.
	#[default]
	Strict,
	/// Any state carrying the broker prefix is accepted. Development only.
	LenientPrefix,
}
impl StateValidation {
	/// Stable label used in logs and configuration files.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Strict => "strict",
			Self::LenientPrefix => "lenient_prefix",
		}
	}
}
impl Display for StateValidation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Validated broker configuration.
#[derive(Clone, Debug)]
pub struct BrokerConfig {
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: TokenSecret,
	/// API base URL.
	pub base_url: Url,
	/// Redirect URI registered with the upstream application.
	pub redirect_uri: Url,
	/// Endpoint URLs derived from `base_url`.
	pub endpoints: Endpoints,
	/// Scope requested by the client-credentials grant.
	pub client_scope: ScopeSet,
	/// Scope requested on the authorization URL.
	pub user_scope: ScopeSet,
	/// Buffer before expiry at which tokens are treated as expired.
	pub expiry_skew: Duration,
	/// Callback state validation mode.
	pub state_validation: StateValidation,
	/// Grace period after expiry before [`prune_sessions`](crate::flows::Broker::prune_sessions)
	/// drops a session. `None` disables pruning.
	pub session_idle_ttl: Option<Duration>,
}
impl BrokerConfig {
	/// Starts a builder seeded with the production defaults.
	pub fn builder(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> BrokerConfigBuilder {
		BrokerConfigBuilder {
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			..Default::default()
		}
	}

	/// `Authorization` header value for the token endpoint: `Basic base64(client_id:client_secret)`.
	pub fn basic_authorization(&self) -> TokenSecret {
		let raw = format!("{}:{}", self.client_id, self.client_secret.expose());

		TokenSecret::new(format!("Basic {}", STANDARD.encode(raw)))
	}
}

/// Unvalidated configuration, deserializable from any serde format.
///
/// Missing fields fall back to the production defaults.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfigBuilder {
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: String,
	/// API base URL.
	pub base_url: String,
	/// Redirect URI registered with the upstream application.
	pub redirect_uri: String,
	/// Scopes requested by the client-credentials grant.
	pub client_scope: Vec<String>,
	/// Scopes requested on the authorization URL.
	pub user_scope: Vec<String>,
	/// Expiry skew in seconds.
	pub expiry_skew_secs: u64,
	/// Callback state validation mode.
	pub state_validation: StateValidation,
	/// Session idle TTL in seconds; `None` disables pruning.
	pub session_idle_ttl_secs: Option<u64>,
}
impl BrokerConfigBuilder {
	/// Overrides the API base URL.
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = url.into();

		self
	}

	/// Overrides the redirect URI.
	pub fn redirect_uri(mut self, url: impl Into<String>) -> Self {
		self.redirect_uri = url.into();

		self
	}

	/// Overrides the client-credentials scopes.
	pub fn client_scope<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.client_scope = scopes.into_iter().map(Into::into).collect();

		self
	}

	/// Overrides the user authorization scopes.
	pub fn user_scope<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.user_scope = scopes.into_iter().map(Into::into).collect();

		self
	}

	/// Overrides the expiry skew.
	pub fn expiry_skew_secs(mut self, secs: u64) -> Self {
		self.expiry_skew_secs = secs;

		self
	}

	/// Overrides the callback state validation mode.
	pub fn state_validation(mut self, mode: StateValidation) -> Self {
		self.state_validation = mode;

		self
	}

	/// Enables session pruning with the given grace period.
	pub fn session_idle_ttl_secs(mut self, secs: u64) -> Self {
		self.session_idle_ttl_secs = Some(secs);

		self
	}

	/// Validates the builder and produces a [`BrokerConfig`].
	pub fn build(self) -> Result<BrokerConfig, ConfigError> {
		if self.client_id.trim().is_empty() {
			return Err(ConfigError::MissingCredential { field: "client_id" });
		}
		if self.client_secret.trim().is_empty() {
			return Err(ConfigError::MissingCredential { field: "client_secret" });
		}

		let expiry_skew = bounded_secs("expiry_skew_secs", self.expiry_skew_secs)?;
		let session_idle_ttl = self
			.session_idle_ttl_secs
			.map(|value| bounded_secs("session_idle_ttl_secs", value))
			.transpose()?;
		let base_url = parse_url("base_url", &self.base_url)?;
		let redirect_uri = parse_url("redirect_uri", &self.redirect_uri)?;
		let endpoints = Endpoints::from_base(&base_url)?;

		Ok(BrokerConfig {
			client_id: self.client_id,
			client_secret: TokenSecret::new(self.client_secret),
			base_url,
			redirect_uri,
			endpoints,
			client_scope: ScopeSet::new(self.client_scope)?,
			user_scope: ScopeSet::new(self.user_scope)?,
			expiry_skew,
			state_validation: self.state_validation,
			session_idle_ttl,
		})
	}
}
impl Default for BrokerConfigBuilder {
	fn default() -> Self {
		Self {
			client_id: String::new(),
			client_secret: String::new(),
			base_url: DEFAULT_BASE_URL.into(),
			redirect_uri: DEFAULT_REDIRECT_URI.into(),
			client_scope: split_scope(DEFAULT_CLIENT_SCOPE),
			user_scope: split_scope(DEFAULT_USER_SCOPE),
			expiry_skew_secs: DEFAULT_EXPIRY_SKEW_SECS,
			state_validation: StateValidation::default(),
			session_idle_ttl_secs: None,
		}
	}
}

/// Command-line and environment configuration.
///
/// Flatten into an application's `clap` parser, then call [`BrokerArgs::into_config`].
#[cfg(feature = "clap")]
#[derive(Clone, Debug, clap::Args)]
pub struct BrokerArgs {
	/// OAuth client identifier.
	#[arg(long, env = "KROGER_CLIENT_ID")]
	pub client_id: String,
	/// OAuth client secret.
	#[arg(long, env = "KROGER_CLIENT_SECRET", hide_env_values = true)]
	pub client_secret: String,
	/// API base URL.
	#[arg(long, env = "KROGER_BASE_URL", default_value = DEFAULT_BASE_URL)]
	pub base_url: String,
	/// Redirect URI registered with the upstream application.
	#[arg(long, env = "REDIRECT_URI", default_value = DEFAULT_REDIRECT_URI)]
	pub redirect_uri: String,
	/// Callback state validation mode.
	#[arg(long, env = "KROGER_STATE_VALIDATION", value_enum, default_value_t = StateValidation::Strict)]
	pub state_validation: StateValidation,
	/// Grace period in seconds after expiry before idle sessions are pruned.
	#[arg(long, env = "KROGER_SESSION_IDLE_TTL_SECS")]
	pub session_idle_ttl_secs: Option<u64>,
}
#[cfg(feature = "clap")]
impl BrokerArgs {
	/// Validates the arguments into a [`BrokerConfig`].
	pub fn into_config(self) -> Result<BrokerConfig, ConfigError> {
		let mut builder = BrokerConfig::builder(self.client_id, self.client_secret)
			.base_url(self.base_url)
			.redirect_uri(self.redirect_uri)
			.state_validation(self.state_validation);

		builder.session_idle_ttl_secs = self.session_idle_ttl_secs;

		builder.build()
	}
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, ConfigError> {
	let url = Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { field, source })?;

	if url.cannot_be_a_base() {
		return Err(ConfigError::CannotBeABase { field, url: url.to_string() });
	}

	Ok(url)
}

fn split_scope(raw: &str) -> Vec<String> {
	raw.split_whitespace().map(str::to_owned).collect()
}

fn bounded_secs(field: &'static str, value: u64) -> Result<Duration, ConfigError> {
	if value > MAX_DURATION_SECS {
		return Err(ConfigError::DurationOutOfRange { field, max_secs: MAX_DURATION_SECS });
	}

	// Bounded above, so the cast cannot wrap.
	Ok(Duration::seconds(value as i64))
}
