// crates.io
use http::{HeaderMap, HeaderName, HeaderValue};
// self
use crate::{
	_prelude::*,
	config::{ClientConfig, RefreshConfig},
	error::ConfigError,
};

/// Timeout applied to every request unless [`ClientConfigBuilder::timeout`] overrides it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	/// Raw base URL.
	pub base_url: String,
	/// Request timeout; [`DEFAULT_TIMEOUT`] unless overridden.
	pub timeout: Option<Duration>,
	/// Raw default headers, validated on build.
	pub default_headers: Vec<(String, String)>,
	/// Refresh endpoint configuration.
	pub refresh: RefreshConfig,
}
impl ClientConfigBuilder {
	/// Creates a new builder seeded with the provided base URL.
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			base_url: base_url.into(),
			timeout: Some(DEFAULT_TIMEOUT),
			default_headers: Vec::new(),
			refresh: RefreshConfig::default(),
		}
	}

	/// Overrides the timeout applied to every request, the refresh call included.
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Adds a header attached to every request.
	pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.default_headers.push((name.into(), value.into()));

		self
	}

	/// Overrides the refresh endpoint configuration.
	pub fn refresh(mut self, refresh: RefreshConfig) -> Self {
		self.refresh = refresh;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let base_url = parse_base_url(&self.base_url)?;

		if self.timeout.is_some_and(|timeout| timeout.is_zero()) {
			return Err(ConfigError::ZeroTimeout);
		}
		if self.refresh.endpoint.trim().is_empty() {
			return Err(ConfigError::MissingRefreshEndpoint);
		}

		let mut default_headers = HeaderMap::with_capacity(self.default_headers.len());

		for (name, value) in self.default_headers {
			let (Ok(header_name), Ok(header_value)) =
				(HeaderName::try_from(name.as_str()), HeaderValue::try_from(value.as_str()))
			else {
				return Err(ConfigError::InvalidHeader { name });
			};

			default_headers.append(header_name, header_value);
		}

		let config =
			ClientConfig { base_url, timeout: self.timeout, default_headers, refresh: self.refresh };

		config.resolve(&config.refresh.endpoint)?;

		Ok(config)
	}
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
	let mut url = Url::parse(raw)
		.map_err(|source| ConfigError::InvalidBaseUrl { url: raw.to_owned(), source })?;

	if url.cannot_be_a_base() {
		return Err(ConfigError::CannotBeABase { url: raw.to_owned() });
	}
	// `Url::join` drops the last segment unless the base ends with a slash.
	if !url.path().ends_with('/') {
		let path = format!("{}/", url.path());

		url.set_path(&path);
	}

	Ok(url)
}
