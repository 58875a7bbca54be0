//! Token lifecycle manager and API client for the Kroger public API: a shared client-credentials
//! token, per-session user tokens with on-demand refresh, and thin wrappers over the location,
//! product, identity, and cart endpoints.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
pub mod store;
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers shared by unit and integration tests.

	pub use crate::_prelude::*;

	// crates.io
	use time::macros;
	// self
	use crate::{clock::ManualClock, config::BrokerConfig, flows::Broker, http::ReqwestHttpClient};

	/// Client identifier used by test brokers.
	pub const TEST_CLIENT_ID: &str = "client-test";
	/// Client secret used by test brokers.
	pub const TEST_CLIENT_SECRET: &str = "secret-test";

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Builds a configuration pointing at the provided mock server base URL.
	pub fn test_config(base_url: &str) -> BrokerConfig {
		BrokerConfig::builder(TEST_CLIENT_ID, TEST_CLIENT_SECRET)
			.base_url(base_url)
			.build()
			.expect("Test broker configuration should be valid.")
	}

	/// Constructs a [`Broker`] driven by a [`ManualClock`] so tests control expiry decisions.
	pub fn build_test_broker(config: BrokerConfig) -> (Broker, Arc<ManualClock>) {
		let clock = Arc::new(ManualClock::new(macros::datetime!(2025-01-01 00:00 UTC)));
		let broker = Broker::with_http_client(config, test_reqwest_http_client())
			.expect("Test broker should build successfully.")
			.with_clock(clock.clone());

		(broker, clock)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value as JsonValue;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};
