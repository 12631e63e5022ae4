//! Client-level error types shared across the pipeline, coordinator, and stores.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout) or a credential lookup that aborted a send.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Credential refresh failed.
	#[error(transparent)]
	Refresh(#[from] RefreshError),
	/// Request body could not be encoded.
	#[error("Request body could not be encoded as JSON.")]
	Encode(#[from] serde_json::Error),

	/// Request was cancelled before it could complete.
	#[error("Request was cancelled.")]
	Cancelled,
}

/// Configuration and validation failures raised while building a client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL cannot be parsed.
	#[error("Base URL `{url}` is invalid.")]
	InvalidBaseUrl {
		/// Raw URL that failed to parse.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request path cannot be resolved against the base URL.
	#[error("Path `{path}` cannot be resolved against the base URL.")]
	InvalidPath {
		/// Raw request path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Header name or value is not valid HTTP.
	#[error("Header `{name}` is invalid.")]
	InvalidHeader {
		/// Offending header name.
		name: String,
	},
	/// Base URL cannot carry relative paths (e.g. `mailto:`).
	#[error("Base URL `{url}` cannot be used as a base for request paths.")]
	CannotBeABase {
		/// Offending URL.
		url: String,
	},
	/// Request timeout must be positive.
	#[error("Request timeout must be greater than zero.")]
	ZeroTimeout,
	/// Refresh endpoint is empty.
	#[error("Refresh endpoint must not be empty.")]
	MissingRefreshEndpoint,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, timeout, credential lookup before a send).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while sending the request.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Access token could not be read before sending.
	#[error("Access token lookup failed before sending the request.")]
	CredentialLookup(#[source] crate::store::StoreError),
	/// Stored access token cannot be encoded as an `Authorization` header.
	#[error("Access token contains characters that are not valid in an HTTP header.")]
	InvalidBearer,
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Reasons a refresh episode failed.
#[derive(Debug, ThisError)]
pub enum RefreshError {
	/// The store holds no refresh token.
	#[error("No refresh token is available.")]
	MissingRefreshToken,
	/// Reading the current token pair failed.
	#[error("Reading the current token pair failed.")]
	Lookup(#[source] crate::store::StoreError),
	/// The refresh call could not be sent or timed out.
	#[error("Refresh request could not be completed.")]
	Request {
		/// Underlying pipeline failure.
		#[source]
		source: Box<Error>,
	},
	/// The refresh endpoint answered with a non-success status.
	#[error("Refresh endpoint rejected the request with status {status}.")]
	Rejected {
		/// HTTP status code.
		status: u16,
	},
	/// The refresh endpoint responded with malformed JSON.
	#[error("Refresh endpoint returned malformed JSON.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// The refresh response lacked one of the token fields.
	#[error("Refresh response is missing `{field}`.")]
	IncompleteResponse {
		/// Missing field name.
		field: &'static str,
	},
	/// Persisting the new token pair failed.
	#[error("Persisting the refreshed token pair failed.")]
	Save(#[source] crate::store::StoreError),
	/// Another task led the episode and it failed.
	#[error("The refresh episode this request joined failed.")]
	EpisodeFailed,
}
impl From<Error> for RefreshError {
	fn from(e: Error) -> Self {
		Self::Request { source: Box::new(e) }
	}
}
