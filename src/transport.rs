//! Transport primitives for outbound requests.
//!
//! [`HttpTransport`] is the client's only dependency on an HTTP stack. The pipeline hands it a
//! fully prepared [`OutboundRequest`] (URL with query string, headers including the bearer
//! credential, encoded body, timeout) and expects a buffered [`RawResponse`] back. Non-2xx
//! statuses are ordinary responses; only network-level failures are errors.

// crates.io
use http::{HeaderMap, Method, StatusCode};
// self
use crate::_prelude::*;

/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a, E> = Pin<Box<dyn Future<Output = Result<RawResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP stacks able to execute prepared requests.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared by every
/// clone of a client, and they must honor [`OutboundRequest::timeout`] so a hung call (the
/// refresh call in particular) cannot hold queued requests indefinitely.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Sends `request` and buffers the response.
	fn execute(&self, request: OutboundRequest) -> TransportFuture<'_, Self::TransportError>;
}

/// Fully prepared request ready for the wire.
#[derive(Clone, Debug)]
pub struct OutboundRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute URL including the query string.
	pub url: Url,
	/// Headers, `Authorization` included when a token is available.
	pub headers: HeaderMap,
	/// Encoded body, if any.
	pub body: Option<Vec<u8>>,
	/// Per-request timeout.
	pub timeout: Option<Duration>,
}

/// Buffered response returned by a transport.
#[derive(Clone, Debug)]
pub struct RawResponse {
	/// HTTP status code.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Response body bytes.
	pub body: Vec<u8>,
}
impl RawResponse {
	/// Builds a response with empty headers.
	pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
		Self { status, headers: HeaderMap::new(), body: body.into() }
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	/// Lossy UTF-8 view of the body.
	pub fn text(&self) -> std::borrow::Cow<'_, str> {
		String::from_utf8_lossy(&self.body)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	type TransportError = ReqwestError;

	fn execute(&self, request: OutboundRequest) -> TransportFuture<'_, Self::TransportError> {
		Box::pin(async move {
			let OutboundRequest { method, url, headers, body, timeout } = request;
			let mut builder = self.0.request(method, url).headers(headers);

			if let Some(body) = body {
				builder = builder.body(body);
			}
			if let Some(timeout) = timeout {
				builder = builder.timeout(timeout);
			}

			let response = builder.send().await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await?.to_vec();

			Ok(RawResponse { status, headers, body })
		})
	}
}
