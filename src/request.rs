//! Request descriptions handed to the client and the descriptors that track their retries.

// crates.io
use http::{HeaderMap, HeaderName, HeaderValue, Method, header::CONTENT_TYPE};
use tokio_util::sync::CancellationToken;
// self
use crate::{_prelude::*, error::ConfigError};

/// Shape the caller expects back; drives the `Accept` header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ResponseKind {
	/// JSON document.
	#[default]
	Json,
	/// Plain text.
	Text,
	/// Opaque bytes.
	Bytes,
}
impl ResponseKind {
	/// `Accept` header value advertised for this kind.
	pub const fn accept(self) -> &'static str {
		match self {
			Self::Json => "application/json",
			Self::Text => "text/plain",
			Self::Bytes => "*/*",
		}
	}
}

/// Caller-level request, independent of credentials.
///
/// The same value is replayed verbatim after a refresh, so everything needed to rebuild the
/// wire request lives here.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Path resolved against the base URL, or an absolute URL.
	pub path: String,
	/// Query parameters appended in order.
	pub query: Vec<(String, String)>,
	/// Request-specific headers; override client defaults.
	pub headers: HeaderMap,
	/// Encoded body.
	pub body: Option<Vec<u8>>,
	/// Response shape expected by the caller.
	pub response_kind: ResponseKind,
	/// Optional external cancellation signal.
	pub cancellation: Option<CancellationToken>,
}
impl ApiRequest {
	/// Creates a request for `method` + `path`.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
			query: Vec::new(),
			headers: HeaderMap::new(),
			body: None,
			response_kind: ResponseKind::default(),
			cancellation: None,
		}
	}

	/// Shorthand for a `GET` request.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::GET, path)
	}

	/// Shorthand for a `POST` request.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::POST, path)
	}

	/// Appends a query parameter.
	pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.push((key.into(), value.into()));

		self
	}

	/// Sets a header, replacing any previous value.
	pub fn header(mut self, name: &str, value: &str) -> Result<Self, ConfigError> {
		let (Ok(name), Ok(value)) = (HeaderName::try_from(name), HeaderValue::try_from(value))
		else {
			return Err(ConfigError::InvalidHeader { name: name.to_owned() });
		};

		self.headers.insert(name, value);

		Ok(self)
	}

	/// Encodes `body` as JSON and sets the content type.
	pub fn json<B>(mut self, body: &B) -> Result<Self>
	where
		B: ?Sized + Serialize,
	{
		self.body = Some(serde_json::to_vec(body)?);
		self.headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

		Ok(self)
	}

	/// Sets a raw body with an explicit content type.
	pub fn bytes(mut self, body: impl Into<Vec<u8>>, content_type: HeaderValue) -> Self {
		self.body = Some(body.into());
		self.headers.insert(CONTENT_TYPE, content_type);

		self
	}

	/// Overrides the expected response shape.
	pub fn accepting(mut self, kind: ResponseKind) -> Self {
		self.response_kind = kind;

		self
	}

	/// Attaches an external cancellation signal.
	pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
		self.cancellation = Some(token);

		self
	}

	/// Returns `true` once the attached cancellation signal fired.
	pub fn is_cancelled(&self) -> bool {
		self.cancellation.as_ref().is_some_and(CancellationToken::is_cancelled)
	}
}

/// Tracks one request across its attempts.
#[derive(Clone, Debug)]
pub struct PendingRequest {
	/// Request being sent.
	pub request: ApiRequest,
	/// Replays performed so far.
	pub retry_count: u32,
	/// Marks the internal refresh call, which is never itself refreshed.
	pub is_refresh_call: bool,
	/// Credential generation observed when the latest attempt was prepared.
	pub(crate) generation: u64,
}
impl PendingRequest {
	/// Wraps a caller request for its first attempt.
	pub fn new(request: ApiRequest) -> Self {
		Self { request, retry_count: 0, is_refresh_call: false, generation: 0 }
	}

	/// Wraps the internal refresh call.
	pub fn refresh_call(request: ApiRequest) -> Self {
		Self { is_refresh_call: true, ..Self::new(request) }
	}

	/// Overrides the retry counter.
	pub fn with_retry_count(mut self, retry_count: u32) -> Self {
		self.retry_count = retry_count;

		self
	}
}
