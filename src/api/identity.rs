//! Authenticated user profile.

// self
use crate::{
	_prelude::*,
	api,
	auth::SessionId,
	flows::Broker,
	obs::{self, FlowKind},
};

impl Broker {
	/// Returns the profile of the user bound to `session`, refreshing its token first if needed.
	pub async fn user_profile(&self, session: &SessionId) -> Result<JsonValue> {
		let record = self.ensure_fresh_user_token(session).await?;

		obs::observe(FlowKind::Resource, "user_profile", async move {
			let request = self.http_client.get(self.config.endpoints.profile.clone());

			api::send_json("identity profile", request, &record.access_token).await
		})
		.await
	}
}
