//! Client and refresh-endpoint configuration.
//!
//! [`ClientConfig`] is assembled through [`ClientConfigBuilder`], which validates URLs and
//! headers up front so request dispatch never has to. [`RefreshConfig`] derives serde with
//! defaults, letting applications load it from their own configuration files.

/// Builder API for assembling client configuration.
pub mod builder;

pub use builder::*;

// crates.io
use http::{HeaderMap, Method};
use serde_json::{Map, Value};
// self
use crate::{_prelude::*, error::ConfigError};

/// HTTP method used for the refresh call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RefreshMethod {
	/// Tokens travel as query parameters.
	Get,
	#[default]
	/// Tokens travel in a JSON body.
	Post,
	/// Tokens travel in a JSON body.
	Put,
}
impl RefreshMethod {
	/// Converts into the matching [`Method`].
	pub fn as_method(self) -> Method {
		match self {
			Self::Get => Method::GET,
			Self::Post => Method::POST,
			Self::Put => Method::PUT,
		}
	}

	/// Returns `true` when the payload belongs in the query string.
	pub fn uses_query(self) -> bool {
		matches!(self, Self::Get)
	}
}

/// Body marker that narrows which 401 responses count as an expired session.
///
/// `field` names a top-level JSON key, or a JSON pointer when it starts with `/`
/// (for example `/error/code`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiredMarker {
	/// Key or JSON pointer inspected in the response body.
	pub field: String,
	/// Value that marks the session as expired.
	pub value: Value,
}
impl ExpiredMarker {
	/// Creates a marker matching `field == value`.
	pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
		Self { field: field.into(), value: value.into() }
	}

	/// Checks whether `body` carries the marker. Non-JSON bodies never match.
	pub fn matches(&self, body: &[u8]) -> bool {
		let Ok(document) = serde_json::from_slice::<Value>(body) else {
			return false;
		};
		let found = if self.field.starts_with('/') {
			document.pointer(&self.field)
		} else {
			document.get(&self.field)
		};

		found == Some(&self.value)
	}
}

/// Refresh endpoint configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
	/// Endpoint path (resolved against the base URL) or absolute URL.
	pub endpoint: String,
	/// Method used for the refresh call.
	pub method: RefreshMethod,
	/// Extra fields merged into the refresh payload.
	pub extra_payload: Map<String, Value>,
	/// Replays allowed per request; `0` disables refresh-and-replay entirely.
	pub max_retry: u32,
	/// Optional body marker required on top of the 401 status.
	pub expired_marker: Option<ExpiredMarker>,
}
impl RefreshConfig {
	const DEFAULT_ENDPOINT: &'static str = "/auth/refresh";
	const DEFAULT_MAX_RETRY: u32 = 1;

	/// Creates a configuration targeting `endpoint` with default settings.
	pub fn new(endpoint: impl Into<String>) -> Self {
		Self { endpoint: endpoint.into(), ..Default::default() }
	}

	/// Overrides the refresh method.
	pub fn with_method(mut self, method: RefreshMethod) -> Self {
		self.method = method;

		self
	}

	/// Adds an extra payload field sent with every refresh call.
	pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.extra_payload.insert(key.into(), value.into());

		self
	}

	/// Overrides the retry bound.
	pub fn with_max_retry(mut self, max_retry: u32) -> Self {
		self.max_retry = max_retry;

		self
	}

	/// Requires the given body marker before a 401 counts as refreshable.
	pub fn with_expired_marker(mut self, marker: ExpiredMarker) -> Self {
		self.expired_marker = Some(marker);

		self
	}
}
impl Default for RefreshConfig {
	fn default() -> Self {
		Self {
			endpoint: Self::DEFAULT_ENDPOINT.into(),
			method: RefreshMethod::default(),
			extra_payload: Map::new(),
			max_retry: Self::DEFAULT_MAX_RETRY,
			expired_marker: None,
		}
	}
}

/// Validated client configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
	/// Base URL every request path resolves against; always ends with `/`.
	pub base_url: Url,
	/// Timeout applied to every request, the refresh call included.
	pub timeout: Option<Duration>,
	/// Headers attached to every request.
	pub default_headers: HeaderMap,
	/// Refresh endpoint configuration.
	pub refresh: RefreshConfig,
}
impl ClientConfig {
	/// Creates a new builder for the provided base URL.
	pub fn builder(base_url: impl Into<String>) -> ClientConfigBuilder {
		ClientConfigBuilder::new(base_url)
	}

	/// Resolves a request path (or absolute URL) against the base URL.
	pub fn resolve(&self, path: &str) -> Result<Url, ConfigError> {
		self.base_url
			.join(path.trim_start_matches('/'))
			.map_err(|source| ConfigError::InvalidPath { path: path.to_owned(), source })
	}
}
