// crates.io
use httpmock::prelude::*;
// self
use kroger_broker::{
	_preludet::*,
	auth::{SessionId, TokenPayload},
	error::UpstreamFailure,
};

const TOKEN_PATH: &str = "/v1/connect/oauth2/token";

fn session() -> SessionId {
	SessionId::new("browser-7").expect("Session fixture should be valid.")
}

#[tokio::test]
async fn stale_token_is_refreshed_and_keeps_previous_refresh_token() {
	let server = MockServer::start_async().await;
	let (broker, clock) = build_test_broker(test_config(&server.base_url()));
	let session = session();

	broker.store_user_token(
		&session,
		TokenPayload::new("user-old").with_refresh_token("refresh-old").with_expires_in(1_800),
	);

	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"user-new\",\"token_type\":\"bearer\",\"expires_in\":1800}");
		})
		.await;

	// Inside the five minute skew window but not yet expired.
	clock.advance(Duration::seconds(1_600));

	let record = broker
		.ensure_fresh_user_token(&session)
		.await
		.expect("Stale tokens with a refresh token should be refreshed.");

	mock.assert_async().await;

	assert_eq!(record.access_token.expose(), "user-new");
	assert_eq!(record.refresh_token.as_ref().map(|secret| secret.expose()), Some("refresh-old"));

	let stored = broker.user_token(&session).expect("Refreshed record should be stored.");

	assert_eq!(stored.access_token.expose(), "user-new");

	let snapshot = broker.status().refresh;

	assert_eq!(snapshot.attempts, 1);
	assert_eq!(snapshot.successes, 1);
}

#[tokio::test]
async fn rotated_refresh_token_replaces_previous_one() {
	let server = MockServer::start_async().await;
	let (broker, clock) = build_test_broker(test_config(&server.base_url()));
	let session = session();

	broker.store_user_token(
		&session,
		TokenPayload::new("user-old").with_refresh_token("refresh-old").with_expires_in(60),
	);

	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"user-new\",\"refresh_token\":\"refresh-new\",\"token_type\":\"bearer\",\"expires_in\":1800}",
			);
		})
		.await;

	clock.advance(Duration::seconds(120));

	let record = broker
		.ensure_fresh_user_token(&session)
		.await
		.expect("Expired tokens with a refresh token should be refreshed.");

	assert_eq!(record.refresh_token.as_ref().map(|secret| secret.expose()), Some("refresh-new"));
}

#[tokio::test]
async fn refresh_without_token_type_defaults_to_bearer() {
	let server = MockServer::start_async().await;
	let (broker, clock) = build_test_broker(test_config(&server.base_url()));
	let session = session();

	broker.store_user_token(
		&session,
		TokenPayload::new("user-old")
			.with_refresh_token("refresh-old")
			.with_expires_in(60)
			.with_token_type("Bearer"),
	);

	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"user-new\",\"expires_in\":1800}");
		})
		.await;

	clock.advance(Duration::seconds(120));

	let record = broker
		.ensure_fresh_user_token(&session)
		.await
		.expect("Refresh responses without token_type should be accepted.");

	assert_eq!(record.access_token.expose(), "user-new");
	assert_eq!(record.token_type, "bearer");
}

#[tokio::test]
async fn missing_refresh_token_fails_without_network() {
	let server = MockServer::start_async().await;
	let (broker, clock) = build_test_broker(test_config(&server.base_url()));
	let session = session();

	broker.store_user_token(&session, TokenPayload::new("user-old").with_expires_in(1_800));

	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200);
		})
		.await;

	clock.advance(Duration::seconds(1_600));

	let err = broker
		.ensure_fresh_user_token(&session)
		.await
		.expect_err("Stale tokens without a refresh token must fail.");

	assert!(matches!(err, Error::TokenExpired { .. }));
	assert_eq!(err.http_status_hint(), 401);
	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn refresh_failure_maps_to_token_refresh() {
	let server = MockServer::start_async().await;
	let (broker, clock) = build_test_broker(test_config(&server.base_url()));
	let session = session();

	broker.store_user_token(
		&session,
		TokenPayload::new("user-old").with_refresh_token("refresh-revoked").with_expires_in(60),
	);

	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\"}");
		})
		.await;

	clock.advance(Duration::seconds(30));

	let err = broker
		.ensure_fresh_user_token(&session)
		.await
		.expect_err("Revoked refresh tokens should fail.");

	mock.assert_async().await;

	assert!(matches!(err, Error::TokenRefresh(UpstreamFailure::Status { status: 400, .. })));
	assert_eq!(broker.status().refresh.failures, 1);
	// The stale record is kept so a later login can replace it.
	assert_eq!(
		broker.user_token(&session).map(|record| record.access_token.expose().to_owned()),
		Some("user-old".into())
	);
}

#[tokio::test]
async fn concurrent_refreshes_share_one_grant() {
	let server = MockServer::start_async().await;
	let (broker, clock) = build_test_broker(test_config(&server.base_url()));
	let session = session();

	broker.store_user_token(
		&session,
		TokenPayload::new("user-old").with_refresh_token("refresh-old").with_expires_in(60),
	);

	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.delay(std::time::Duration::from_millis(50))
				.body("{\"access_token\":\"user-new\",\"token_type\":\"bearer\",\"expires_in\":1800}");
		})
		.await;

	clock.advance(Duration::seconds(30));

	let (left, right) = tokio::join!(
		broker.ensure_fresh_user_token(&session),
		broker.ensure_fresh_user_token(&session)
	);

	assert_eq!(left.expect("Left caller should succeed.").access_token.expose(), "user-new");
	assert_eq!(right.expect("Right caller should succeed.").access_token.expose(), "user-new");
	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn cleared_session_is_not_authenticated() {
	let (broker, _) = build_test_broker(test_config("https://127.0.0.1:1"));
	let session = session();

	broker.store_user_token(&session, TokenPayload::new("user-a"));
	broker.clear_user_session(&session);
	broker.clear_user_session(&session);

	let err = broker
		.ensure_fresh_user_token(&session)
		.await
		.expect_err("Cleared sessions must be rejected.");

	assert!(matches!(err, Error::NotAuthenticated { .. }));
}
