//! Cart mutations on behalf of an authenticated user.

// self
use crate::{
	_prelude::*,
	api,
	auth::SessionId,
	flows::Broker,
	obs::{self, FlowKind},
};

/// How the user receives the item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Modality {
	/// In-store pickup.
	#[default]
	Pickup,
	/// Home delivery.
	Delivery,
}

/// One line of a cart update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
	/// Product UPC.
	pub upc: String,
	/// Units to add.
	pub quantity: u32,
	/// Fulfillment modality.
	#[serde(default)]
	pub modality: Modality,
}
impl CartItem {
	/// Creates a pickup item.
	pub fn new(upc: impl Into<String>, quantity: u32) -> Self {
		Self { upc: upc.into(), quantity, modality: Modality::default() }
	}

	/// Overrides the modality.
	pub fn with_modality(mut self, modality: Modality) -> Self {
		self.modality = modality;

		self
	}
}

#[derive(Serialize)]
struct CartAddBody<'a> {
	items: &'a [CartItem],
}

impl Broker {
	/// Adds `items` to the cart of the user bound to `session`.
	///
	/// Item validation happens before the user token is checked or refreshed, so bad input never
	/// reaches the network. The upstream response body is discarded.
	pub async fn add_to_cart(&self, session: &SessionId, items: &[CartItem]) -> Result<()> {
		if items.is_empty() {
			return Err(Error::invalid_argument("at least one cart item is required"));
		}
		if let Some(item) = items.iter().find(|item| item.upc.is_empty() || item.quantity == 0) {
			return Err(Error::invalid_argument(format!(
				"cart item `{}` needs a UPC and a positive quantity",
				item.upc
			)));
		}

		let record = self.ensure_fresh_user_token(session).await?;

		obs::observe(FlowKind::Resource, "add_to_cart", async move {
			let request = self
				.http_client
				.put(self.config.endpoints.cart_add.clone())
				.json(&CartAddBody { items });

			api::send("cart", request, &record.access_token).await.map(drop)
		})
		.await
	}
}
