//! Walks through the broker against a local mock of the Kroger API: catalog lookups with the
//! shared client token, a simulated login callback, and a cart update on the user's behalf.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use kroger_broker::{
	api::{CartItem, ProductSearch},
	auth::{LocationId, SessionId},
	config::BrokerConfig,
	flows::Broker,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let client_token = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/v1/connect/oauth2/token")
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-user\",\"refresh_token\":\"demo-refresh\",\"token_type\":\"bearer\",\"expires_in\":1800}",
			);
		})
		.await;
	let _locations = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/locations");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"data\":[{\"locationId\":\"01400943\",\"name\":\"Kroger Downtown\"}]}");
		})
		.await;
	let _products = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/products");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"data\":[{\"upc\":\"0001111041700\",\"description\":\"2% Milk\"}]}");
		})
		.await;
	let cart = server
		.mock_async(|when, then| {
			when.method(PUT).path("/v1/cart/add");
			then.status(204);
		})
		.await;
	let config = BrokerConfig::builder("demo-client", "demo-secret")
		.base_url(server.base_url())
		.redirect_uri("http://localhost:8000/callback")
		.build()?;
	let broker = Broker::new(config)?;
	let stores = broker.search_locations(39.1031, -84.512, 10).await?;

	println!("Nearby stores: {}.", stores["data"]);

	let location = LocationId::new("01400943")?;
	let products = broker.search_products(&ProductSearch::new(location).with_term("milk")).await?;

	println!("Products: {}.", products["data"]);

	let session = SessionId::new("demo-browser")?;

	println!("Send the user to {}.", broker.authorization_url_for_session(&session));

	// Simulate the redirect handler receiving `code` and `state`.
	let state = broker.session_state(&session);

	broker.complete_authorization(&session, "demo-code", Some(&state)).await?;
	broker.add_to_cart(&session, &[CartItem::new("0001111041700", 2)]).await?;

	println!("Broker status: {}.", serde_json::to_string_pretty(&broker.status())?);

	client_token.assert_calls_async(2).await;
	cart.assert_async().await;

	Ok(())
}
