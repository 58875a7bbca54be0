// crates.io
use httpmock::prelude::*;
// self
use kroger_broker::{
	_preludet::*,
	api::{CartItem, Modality, ProductSearch},
	auth::{LocationId, ProductId, SessionId, TokenPayload},
};

const TOKEN_PATH: &str = "/v1/connect/oauth2/token";

async fn mock_client_token(server: &MockServer) -> httpmock::Mock<'_> {
	server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"app-1\",\"token_type\":\"bearer\",\"expires_in\":1800}");
		})
		.await
}

fn location() -> LocationId {
	LocationId::new("01400943").expect("Location fixture should be valid.")
}

fn session() -> SessionId {
	SessionId::new("shopper-1").expect("Session fixture should be valid.")
}

#[tokio::test]
async fn location_search_sends_coordinates_with_client_token() {
	let server = MockServer::start_async().await;
	let (broker, _) = build_test_broker(test_config(&server.base_url()));
	let token = mock_client_token(&server).await;
	let locations = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v1/locations")
				.header("authorization", "Bearer app-1")
				.query_param("filter.lat.near", "39.1")
				.query_param("filter.lon.near", "-84.5")
				.query_param("filter.radiusInMiles", "10");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"data\":[{\"locationId\":\"01400943\"}]}");
		})
		.await;
	let body = broker
		.search_locations(39.1, -84.5, 10)
		.await
		.expect("Location search should succeed.");

	locations.assert_async().await;

	assert_eq!(body["data"][0]["locationId"], "01400943");

	broker.location_details(&location()).await.expect_err("Unmocked details should fail.");
	// The second call reuses the cached client token.
	token.assert_calls_async(1).await;
}

#[tokio::test]
async fn location_details_use_the_id_path() {
	let server = MockServer::start_async().await;
	let (broker, _) = build_test_broker(test_config(&server.base_url()));
	let _token = mock_client_token(&server).await;
	let details = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/locations/01400943");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"data\":{\"name\":\"Kroger Downtown\"}}");
		})
		.await;
	let body =
		broker.location_details(&location()).await.expect("Location details should succeed.");

	details.assert_async().await;

	assert_eq!(body["data"]["name"], "Kroger Downtown");
}

#[tokio::test]
async fn product_search_sends_one_criterion_and_paging() {
	let server = MockServer::start_async().await;
	let (broker, _) = build_test_broker(test_config(&server.base_url()));
	let _token = mock_client_token(&server).await;
	let products = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v1/products")
				.query_param("filter.locationId", "01400943")
				.query_param("filter.term", "milk")
				.query_param("filter.limit", "5")
				.query_param("filter.start", "10");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"data\":[],\"meta\":{\"pagination\":{\"total\":0}}}");
		})
		.await;
	let search = ProductSearch::new(location())
		.with_term("milk")
		.with_brand("Kroger")
		.with_limit(5)
		.with_start(10);
	let body = broker.search_products(&search).await.expect("Product search should succeed.");

	products.assert_async().await;

	assert_eq!(body["meta"]["pagination"]["total"], 0);
}

#[tokio::test]
async fn product_search_without_criterion_never_calls_upstream() {
	let server = MockServer::start_async().await;
	let (broker, _) = build_test_broker(test_config(&server.base_url()));
	let token = mock_client_token(&server).await;
	let err = broker
		.search_products(&ProductSearch::new(location()).with_term(""))
		.await
		.expect_err("Searches without a criterion must be rejected.");

	assert!(matches!(err, Error::InvalidArgument { .. }));
	assert_eq!(err.http_status_hint(), 400);
	token.assert_calls_async(0).await;
}

#[tokio::test]
async fn product_details_scope_pricing_to_location() {
	let server = MockServer::start_async().await;
	let (broker, _) = build_test_broker(test_config(&server.base_url()));
	let _token = mock_client_token(&server).await;
	let details = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v1/products/0001111041700")
				.query_param("filter.locationId", "01400943");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"data\":{\"productId\":\"0001111041700\"}}");
		})
		.await;
	let product = ProductId::new("0001111041700").expect("Product fixture should be valid.");
	let body = broker
		.product_details(&product, &location())
		.await
		.expect("Product details should succeed.");

	details.assert_async().await;

	assert_eq!(body["data"]["productId"], "0001111041700");
}

#[tokio::test]
async fn upstream_errors_keep_status_and_body() {
	let server = MockServer::start_async().await;
	let (broker, _) = build_test_broker(test_config(&server.base_url()));
	let _token = mock_client_token(&server).await;
	let _missing = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/locations/01400943");
			then.status(404).body("{\"errors\":{\"reason\":\"not found\"}}");
		})
		.await;
	let err = broker.location_details(&location()).await.expect_err("Missing locations should fail.");

	match &err {
		Error::UpstreamHttp { endpoint, status, body } => {
			assert_eq!(*endpoint, "location details");
			assert_eq!(*status, 404);
			assert!(body.contains("not found"), "Body should be preserved: {body}.");
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	assert_eq!(err.upstream_status(), Some(404));
}

#[tokio::test]
async fn malformed_json_is_reported() {
	let server = MockServer::start_async().await;
	let (broker, _) = build_test_broker(test_config(&server.base_url()));
	let _token = mock_client_token(&server).await;
	let _garbage = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/locations/01400943");
			then.status(200).body("<html>oops</html>");
		})
		.await;
	let err = broker.location_details(&location()).await.expect_err("Non-JSON bodies should fail.");

	assert!(matches!(err, Error::MalformedResponse { endpoint: "location details", .. }));
}

#[tokio::test]
async fn profile_uses_the_session_user_token() {
	let server = MockServer::start_async().await;
	let (broker, _) = build_test_broker(test_config(&server.base_url()));
	let session = session();

	broker.store_user_token(&session, TokenPayload::new("user-1").with_expires_in(1_800));

	let profile = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/identity/profile").header("authorization", "Bearer user-1");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"data\":{\"id\":\"profile-1\"}}");
		})
		.await;
	let body = broker.user_profile(&session).await.expect("Profile lookup should succeed.");

	profile.assert_async().await;

	assert_eq!(body["data"]["id"], "profile-1");
}

#[tokio::test]
async fn profile_without_login_is_not_authenticated() {
	let server = MockServer::start_async().await;
	let (broker, _) = build_test_broker(test_config(&server.base_url()));
	let profile = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/identity/profile");
			then.status(200);
		})
		.await;
	let err = broker.user_profile(&session()).await.expect_err("Anonymous sessions must fail.");

	assert!(matches!(err, Error::NotAuthenticated { .. }));
	profile.assert_calls_async(0).await;
}

#[tokio::test]
async fn cart_add_puts_items_with_user_token() {
	let server = MockServer::start_async().await;
	let (broker, _) = build_test_broker(test_config(&server.base_url()));
	let session = session();

	broker.store_user_token(&session, TokenPayload::new("user-1").with_expires_in(1_800));

	let cart = server
		.mock_async(|when, then| {
			when.method(PUT)
				.path("/v1/cart/add")
				.header("authorization", "Bearer user-1")
				.header("content-type", "application/json")
				.body(
					"{\"items\":[{\"upc\":\"0001111041700\",\"quantity\":2,\"modality\":\"PICKUP\"},{\"upc\":\"0001111060933\",\"quantity\":1,\"modality\":\"DELIVERY\"}]}",
				);
			then.status(204);
		})
		.await;
	let items = [
		CartItem::new("0001111041700", 2),
		CartItem::new("0001111060933", 1).with_modality(Modality::Delivery),
	];

	broker.add_to_cart(&session, &items).await.expect("Cart update should succeed.");
	cart.assert_async().await;
}

#[tokio::test]
async fn invalid_cart_items_never_reach_upstream() {
	let server = MockServer::start_async().await;
	let (broker, _) = build_test_broker(test_config(&server.base_url()));
	let session = session();

	broker.store_user_token(&session, TokenPayload::new("user-1").with_expires_in(1_800));

	let cart = server
		.mock_async(|when, then| {
			when.method(PUT).path("/v1/cart/add");
			then.status(204);
		})
		.await;

	for items in [vec![], vec![CartItem::new("", 1)], vec![CartItem::new("0001111041700", 0)]] {
		let err = broker
			.add_to_cart(&session, &items)
			.await
			.expect_err("Invalid cart items must be rejected.");

		assert!(matches!(err, Error::InvalidArgument { .. }));
	}

	cart.assert_calls_async(0).await;
}
