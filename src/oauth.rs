//! Internal facade over the `oauth2` client for the three token endpoint grants.

pub use oauth2;

// std
use std::borrow::Cow;
// crates.io
use oauth2::{
	AccessToken, AuthorizationCode, Client, ClientId, EndpointNotSet, EndpointSet, HttpClientError,
	RedirectUrl, RefreshToken, RequestTokenError, Scope, StandardRevocableToken, TokenResponse,
	TokenType, TokenUrl,
	basic::{
		BasicErrorResponse, BasicRequestTokenError, BasicRevocationErrorResponse,
		BasicTokenIntrospectionResponse,
	},
};
use reqwest::header::HeaderValue;
// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, TokenPayload, TokenSecret},
	config::BrokerConfig,
	error::{ConfigError, TransportError, UpstreamFailure},
	http::{ReqwestHttpClient, ResponseMetadata, ResponseMetadataSlot},
};

type GrantClient = Client<
	BasicErrorResponse,
	GrantResponse,
	BasicTokenIntrospectionResponse,
	StandardRevocableToken,
	BasicRevocationErrorResponse,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointSet,
>;

/// `token_type` as sent by the token endpoint; absent values stay `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct GrantTokenType(Option<String>);
impl TokenType for GrantTokenType {}

/// Token endpoint response that, unlike `oauth2`'s basic response, tolerates a missing
/// `token_type`.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct GrantResponse {
	access_token: AccessToken,
	#[serde(default)]
	token_type: GrantTokenType,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	expires_in: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	refresh_token: Option<RefreshToken>,
	#[serde(skip)]
	scopes: Option<Vec<Scope>>,
}
impl TokenResponse for GrantResponse {
	type TokenType = GrantTokenType;

	fn access_token(&self) -> &AccessToken {
		&self.access_token
	}

	fn token_type(&self) -> &Self::TokenType {
		&self.token_type
	}

	fn expires_in(&self) -> Option<std::time::Duration> {
		self.expires_in.map(std::time::Duration::from_secs)
	}

	fn refresh_token(&self) -> Option<&RefreshToken> {
		self.refresh_token.as_ref()
	}

	fn scopes(&self) -> Option<&Vec<Scope>> {
		self.scopes.as_ref()
	}
}

/// Token endpoint client.
///
/// The client secret is not registered with `oauth2`, which would form-urlencode both
/// credentials before base64. The transport sends `Basic base64(client_id:client_secret)` of the
/// raw values instead.
pub(crate) struct TokenFacade {
	oauth_client: GrantClient,
	http_client: ReqwestHttpClient,
	authorization: HeaderValue,
}
impl TokenFacade {
	pub(crate) fn new(config: &BrokerConfig, http_client: ReqwestHttpClient) -> Result<Self> {
		let token_url = TokenUrl::new(config.endpoints.token.to_string()).map_err(|source| {
			ConfigError::InvalidUrl { field: "token endpoint", source }
		})?;
		let oauth_client = Client::new(ClientId::new(config.client_id.clone())).set_token_uri(token_url);
		let mut authorization = HeaderValue::from_str(config.basic_authorization().expose())
			.map_err(ConfigError::http_client_build)?;

		authorization.set_sensitive(true);

		Ok(Self { oauth_client, http_client, authorization })
	}

	pub(crate) async fn exchange_client_credentials(
		&self,
		scope: &ScopeSet,
	) -> Result<TokenPayload, UpstreamFailure> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.instrumented(meta.clone(), self.authorization.clone());
		let mut request = self.oauth_client.exchange_client_credentials();

		for scope in scope.iter() {
			request = request.add_scope(Scope::new(scope.to_owned()));
		}

		let response = request
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(meta.take(), err))?;

		Ok(into_payload(response))
	}

	pub(crate) async fn exchange_authorization_code(
		&self,
		code: &str,
		redirect_uri: &Url,
	) -> Result<TokenPayload, UpstreamFailure> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.instrumented(meta.clone(), self.authorization.clone());
		let redirect_url = RedirectUrl::from_url(redirect_uri.clone());
		let response = self
			.oauth_client
			.exchange_code(AuthorizationCode::new(code.to_owned()))
			.set_redirect_uri(Cow::Owned(redirect_url))
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(meta.take(), err))?;

		Ok(into_payload(response))
	}

	pub(crate) async fn refresh_token(
		&self,
		refresh_token: &str,
	) -> Result<TokenPayload, UpstreamFailure> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.instrumented(meta.clone(), self.authorization.clone());
		let refresh_secret = RefreshToken::new(refresh_token.to_owned());
		let response = self
			.oauth_client
			.exchange_refresh_token(&refresh_secret)
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(meta.take(), err))?;

		Ok(into_payload(response))
	}
}

fn into_payload(response: GrantResponse) -> TokenPayload {
	TokenPayload {
		access_token: TokenSecret::new(response.access_token.into_secret()),
		refresh_token: response.refresh_token.map(|token| TokenSecret::new(token.into_secret())),
		expires_in: response.expires_in,
		token_type: response.token_type.0,
	}
}

fn map_request_error(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<ReqwestError>>,
) -> UpstreamFailure {
	let status = meta.as_ref().and_then(|value| value.status);

	// A non-2xx status wins over however `oauth2` classified the body.
	if let Some(ResponseMetadata { status: Some(status), body }) =
		meta.filter(ResponseMetadata::is_failure)
	{
		return UpstreamFailure::Status { status, body: body.unwrap_or_default() };
	}

	match err {
		RequestTokenError::ServerResponse(response) => UpstreamFailure::Unexpected {
			status,
			message: format!("OAuth error `{}`", response.error().as_ref()),
		},
		RequestTokenError::Request(error) => map_transport_error(status, error),
		RequestTokenError::Parse(source, _body) =>
			UpstreamFailure::MalformedResponse { status, source },
		RequestTokenError::Other(message) => UpstreamFailure::Unexpected { status, message },
	}
}

fn map_transport_error(status: Option<u16>, err: HttpClientError<ReqwestError>) -> UpstreamFailure {
	match err {
		HttpClientError::Reqwest(inner) => TransportError::from(*inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Http(inner) => TransportError::network(inner).into(),
		HttpClientError::Other(message) => UpstreamFailure::Unexpected { status, message },
		_ => UpstreamFailure::Unexpected { status, message: "unknown HTTP client error".into() },
	}
}
