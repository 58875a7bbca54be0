//! Thin wrappers over the location, product, identity, and cart endpoints.
//!
//! Catalog calls authenticate with the shared client token; identity and cart calls use the
//! session's user token. Payloads are returned as raw JSON so upstream schema changes pass
//! through untouched.

pub mod cart;
pub mod identity;
pub mod locations;
pub mod products;

pub use cart::*;
pub use products::*;

// crates.io
use reqwest::{RequestBuilder, header::ACCEPT};
// self
use crate::{_prelude::*, auth::TokenSecret, error::TransportError};

/// Sends `request` with bearer auth and returns the body of a 2xx response.
pub(crate) async fn send(
	endpoint: &'static str,
	request: RequestBuilder,
	token: &TokenSecret,
) -> Result<String> {
	let response = request
		.header(ACCEPT, "application/json")
		.bearer_auth(token.expose())
		.send()
		.await
		.map_err(TransportError::from)?;
	let status = response.status();
	let body = response.text().await.map_err(TransportError::from)?;

	if !status.is_success() {
		return Err(Error::UpstreamHttp { endpoint, status: status.as_u16(), body });
	}

	Ok(body)
}

/// Like [`send`], decoding the body as JSON.
pub(crate) async fn send_json(
	endpoint: &'static str,
	request: RequestBuilder,
	token: &TokenSecret,
) -> Result<JsonValue> {
	let body = send(endpoint, request, token).await?;
	let mut de = serde_json::Deserializer::from_str(&body);

	serde_path_to_error::deserialize(&mut de)
		.map_err(|source| Error::MalformedResponse { endpoint, source })
}
