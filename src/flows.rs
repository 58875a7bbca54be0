//! The broker: token lifecycle orchestration for the shared client token and per-session user
//! tokens.

pub mod common;
pub mod refresh;

mod authorization;
mod client_credentials;
mod session;
mod status;

pub use authorization::*;
pub use refresh::*;
pub use status::*;

// self
use crate::{
	_prelude::*,
	auth::ClientToken,
	clock::{Clock, SystemClock},
	config::BrokerConfig,
	flows::common::FlowKey,
	http::ReqwestHttpClient,
	oauth::TokenFacade,
	store::{MemoryStore, SessionStore},
};

/// Token manager and API client for one upstream application.
///
/// The broker owns the process-wide client-credentials token, the session map of user tokens,
/// and the HTTP client used for every upstream call. Clones share all state, so one instance
/// built at startup can be handed to every request handler.
#[derive(Clone)]
pub struct Broker {
	/// Validated configuration.
	pub config: Arc<BrokerConfig>,
	/// HTTP client used for token and resource requests.
	pub http_client: ReqwestHttpClient,
	/// Time source for every expiry decision.
	pub clock: Arc<dyn Clock>,
	/// Shared counters for user token refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	facade: Arc<TokenFacade>,
	store: Arc<dyn SessionStore>,
	client_token: Arc<RwLock<Option<ClientToken>>>,
	flow_guards: Arc<Mutex<HashMap<FlowKey, Arc<AsyncMutex<()>>>>>,
}
impl Broker {
	/// Creates a broker with its own redirect-free reqwest client.
	pub fn new(config: BrokerConfig) -> Result<Self> {
		Self::with_http_client(config, ReqwestHttpClient::new()?)
	}

	/// Creates a broker that reuses the caller-provided HTTP client.
	pub fn with_http_client(config: BrokerConfig, http_client: ReqwestHttpClient) -> Result<Self> {
		let facade = TokenFacade::new(&config, http_client.clone())?;

		Ok(Self {
			config: Arc::new(config),
			http_client,
			clock: Arc::new(SystemClock),
			refresh_metrics: Default::default(),
			facade: Arc::new(facade),
			store: Arc::new(MemoryStore::default()),
			client_token: Default::default(),
			flow_guards: Default::default(),
		})
	}

	/// Replaces the time source.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Replaces the session store.
	pub fn with_store(mut self, store: Arc<dyn SessionStore>) -> Self {
		self.store = store;

		self
	}

	pub(crate) fn now(&self) -> OffsetDateTime {
		self.clock.now()
	}
}
impl Debug for Broker {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Broker")
			.field("base_url", &self.config.base_url.as_str())
			.field("client_id", &self.config.client_id)
			.field("has_client_token", &self.client_token.read().is_some())
			.field("sessions", &self.store.len())
			.finish()
	}
}
