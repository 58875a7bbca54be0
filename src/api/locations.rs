//! Store location lookups.

// self
use crate::{
	_prelude::*,
	api,
	auth::LocationId,
	flows::Broker,
	obs::{self, FlowKind},
};

/// Search radius used when the caller has no preference.
pub const DEFAULT_RADIUS_MILES: u32 = 10;

impl Broker {
	/// Finds store locations within `radius_miles` of a coordinate.
	pub async fn search_locations(&self, lat: f64, lon: f64, radius_miles: u32) -> Result<JsonValue> {
		if !lat.is_finite() || !lon.is_finite() {
			return Err(Error::invalid_argument("coordinates must be finite numbers"));
		}

		obs::observe(FlowKind::Resource, "search_locations", async move {
			let token = self.client_token().await?;
			let request = self.http_client.get(self.config.endpoints.locations.clone()).query(&[
				("filter.lat.near", lat.to_string()),
				("filter.lon.near", lon.to_string()),
				("filter.radiusInMiles", radius_miles.to_string()),
			]);

			api::send_json("locations", request, &token).await
		})
		.await
	}

	/// Fetches a single store location.
	pub async fn location_details(&self, location_id: &LocationId) -> Result<JsonValue> {
		obs::observe(FlowKind::Resource, "location_details", async move {
			let token = self.client_token().await?;
			let request = self.http_client.get(self.config.endpoints.location(location_id));

			api::send_json("location details", request, &token).await
		})
		.await
	}
}
