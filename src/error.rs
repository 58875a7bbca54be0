//! Broker-level error types shared across flows, API wrappers, and configuration.

// self
use crate::{
	_prelude::*,
	auth::{IdentifierError, ScopeValidationError, SessionId},
};

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Canonical broker error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Network failure while calling a resource endpoint.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// The client-credentials grant failed.
	#[error("Client credentials grant failed: {0}.")]
	Authentication(#[source] UpstreamFailure),
	/// The authorization-code exchange failed.
	#[error("Authorization code exchange failed: {0}.")]
	TokenExchange(#[source] UpstreamFailure),
	/// The refresh-token grant failed.
	#[error("User token refresh failed: {0}.")]
	TokenRefresh(#[source] UpstreamFailure),
	/// No user token is stored for the session.
	#[error("Session `{session}` is not authenticated.")]
	NotAuthenticated {
		/// Session that was looked up.
		session: SessionId,
	},
	/// The stored user token expired and cannot be refreshed.
	#[error("User token for session `{session}` expired and no refresh token is available.")]
	TokenExpired {
		/// Session whose token expired.
		session: SessionId,
	},
	/// The authorization callback carried a missing or mismatched `state`.
	#[error("Authorization state is invalid: {reason}.")]
	InvalidState {
		/// Broker-supplied reason string.
		reason: String,
	},
	/// Caller-supplied arguments were rejected before any network call.
	#[error("Invalid argument: {reason}.")]
	InvalidArgument {
		/// Broker-supplied reason string.
		reason: String,
	},
	/// A resource endpoint answered with a non-success status.
	#[error("The {endpoint} endpoint responded with HTTP {status}.")]
	UpstreamHttp {
		/// Logical endpoint label.
		endpoint: &'static str,
		/// HTTP status code returned upstream.
		status: u16,
		/// Raw response body.
		body: String,
	},
	/// A resource endpoint answered with a payload that is not valid JSON.
	#[error("The {endpoint} endpoint returned malformed JSON.")]
	MalformedResponse {
		/// Logical endpoint label.
		endpoint: &'static str,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl Error {
	pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
		Self::InvalidArgument { reason: reason.into() }
	}

	/// HTTP status an inbound routing layer should answer with when surfacing this error.
	pub fn http_status_hint(&self) -> u16 {
		match self {
			Self::InvalidArgument { .. } | Self::InvalidState { .. } => 400,
			Self::NotAuthenticated { .. } | Self::TokenExpired { .. } => 401,
			Self::Config(_)
			| Self::Transport(_)
			| Self::Authentication(_)
			| Self::TokenExchange(_)
			| Self::TokenRefresh(_)
			| Self::UpstreamHttp { .. }
			| Self::MalformedResponse { .. } => 500,
		}
	}

	/// Upstream HTTP status carried by the error, if any.
	pub fn upstream_status(&self) -> Option<u16> {
		match self {
			Self::Authentication(failure)
			| Self::TokenExchange(failure)
			| Self::TokenRefresh(failure) => failure.status(),
			Self::UpstreamHttp { status, .. } => Some(*status),
			_ => None,
		}
	}
}

/// Failure details for a token endpoint call.
#[derive(Debug, ThisError)]
pub enum UpstreamFailure {
	/// Token endpoint answered with a non-success status.
	#[error("token endpoint responded with HTTP {status}")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Raw (possibly truncated) response body.
		body: String,
	},
	/// Token endpoint could not be reached.
	#[error("token endpoint could not be reached")]
	Transport(#[from] TransportError),
	/// Token endpoint answered 2xx with a body that could not be parsed.
	#[error("token endpoint returned malformed JSON")]
	MalformedResponse {
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Token endpoint answered with something the broker cannot use.
	#[error("token endpoint returned an unexpected response: {message}")]
	Unexpected {
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Broker-supplied description.
		message: String,
	},
}
impl UpstreamFailure {
	/// HTTP status code returned by the token endpoint, when one was received.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } => Some(*status),
			Self::Transport(_) => None,
			Self::MalformedResponse { status, .. } | Self::Unexpected { status, .. } => *status,
		}
	}

	/// Response body returned alongside a non-success status.
	pub fn body(&self) -> Option<&str> {
		match self {
			Self::Status { body, .. } => Some(body),
			_ => None,
		}
	}
}

/// Configuration and validation failures raised by the broker.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A configured credential is empty.
	#[error("The {field} must not be empty.")]
	MissingCredential {
		/// Which credential is missing.
		field: &'static str,
	},
	/// A configured URL cannot be parsed or used as a base.
	#[error("The {field} is not a valid URL.")]
	InvalidUrl {
		/// Which URL failed validation.
		field: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A configured URL cannot carry path segments.
	#[error("The {field} cannot be used as a base URL: {url}.")]
	CannotBeABase {
		/// Which URL failed validation.
		field: &'static str,
		/// Offending URL.
		url: String,
	},
	/// A configured duration exceeds the supported range.
	#[error("The {field} must not exceed {max_secs} seconds.")]
	DurationOutOfRange {
		/// Which setting was rejected.
		field: &'static str,
		/// Largest accepted value.
		max_secs: u64,
	},
	/// Configured scopes cannot be normalized.
	#[error("Configured scopes are invalid.")]
	InvalidScope(#[from] ScopeValidationError),
	/// A configured identifier is invalid.
	#[error("Configured identifier is invalid.")]
	InvalidIdentifier(#[from] IdentifierError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the upstream API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the upstream API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
