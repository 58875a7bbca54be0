//! Upstream endpoint layout.
//!
//! Every endpoint hangs off the configured base URL, so pointing the base at a mock server
//! redirects the whole broker.

// self
use crate::{_prelude::*, error::ConfigError};

/// Absolute URLs for every upstream endpoint the broker talks to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
	/// `POST /v1/connect/oauth2/token`.
	pub token: Url,
	/// `GET /v1/connect/oauth2/authorize`.
	pub authorize: Url,
	/// `GET /v1/locations`.
	pub locations: Url,
	/// `GET /v1/products`.
	pub products: Url,
	/// `GET /v1/identity/profile`.
	pub profile: Url,
	/// `PUT /v1/cart/add`.
	pub cart_add: Url,
}
impl Endpoints {
	/// Derives the endpoint set from the API base URL.
	pub fn from_base(base: &Url) -> Result<Self, ConfigError> {
		Ok(Self {
			token: extend(base, &["v1", "connect", "oauth2", "token"])?,
			authorize: extend(base, &["v1", "connect", "oauth2", "authorize"])?,
			locations: extend(base, &["v1", "locations"])?,
			products: extend(base, &["v1", "products"])?,
			profile: extend(base, &["v1", "identity", "profile"])?,
			cart_add: extend(base, &["v1", "cart", "add"])?,
		})
	}

	/// `GET /v1/locations/{id}`; the id is percent-encoded as one path segment.
	pub fn location(&self, id: &str) -> Url {
		with_segment(&self.locations, id)
	}

	/// `GET /v1/products/{id}`; the id is percent-encoded as one path segment.
	pub fn product(&self, id: &str) -> Url {
		with_segment(&self.products, id)
	}
}

fn extend(base: &Url, segments: &[&str]) -> Result<Url, ConfigError> {
	let mut url = base.clone();

	url.path_segments_mut()
		.map_err(|_| ConfigError::CannotBeABase { field: "base_url", url: base.to_string() })?
		.pop_if_empty()
		.extend(segments);

	Ok(url)
}

fn with_segment(collection: &Url, segment: &str) -> Url {
	let mut url = collection.clone();

	// Collections were built through `extend`, so they always accept path segments.
	if let Ok(mut segments) = url.path_segments_mut() {
		segments.push(segment);
	}

	url
}
