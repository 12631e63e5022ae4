//! Uniform response envelope returned by the client facade.

// self
use crate::{_prelude::*, transport::RawResponse};

/// Synthesized status for failures that never produced a response.
pub const TRANSPORT_FAILURE_STATUS: u16 = 500;
/// Synthesized status for cancelled requests.
pub const CANCELLED_STATUS: u16 = 499;

/// Result of one facade call.
///
/// `data` is populated for 2xx responses whose body decoded; `error` carries the response body
/// (or the canonical reason) for non-2xx responses, the decode failure for undecodable 2xx
/// bodies, and the error text for failures that never produced a response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
	/// HTTP status, or a synthesized one for local failures.
	pub status_code: u16,
	/// Decoded payload.
	pub data: Option<T>,
	/// Error description.
	pub error: Option<String>,
}
impl<T> ApiResponse<T> {
	/// Builds a successful envelope.
	pub fn success(status_code: u16, data: Option<T>) -> Self {
		Self { status_code, data, error: None }
	}

	/// Builds a failed envelope.
	pub fn failure(status_code: u16, error: impl Into<String>) -> Self {
		Self { status_code, data: None, error: Some(error.into()) }
	}

	/// Maps a pipeline error into the envelope's error channel.
	pub fn from_error(error: &Error) -> Self {
		let status_code = match error {
			Error::Cancelled => CANCELLED_STATUS,
			_ => TRANSPORT_FAILURE_STATUS,
		};

		Self::failure(status_code, error.to_string())
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status_code)
	}

	/// Converts into a `Result`, yielding the payload (if any) on success.
	pub fn into_result(self) -> std::result::Result<Option<T>, (u16, String)> {
		if self.is_success() && self.error.is_none() {
			Ok(self.data)
		} else {
			Err((self.status_code, self.error.unwrap_or_default()))
		}
	}

	fn decode(raw: RawResponse, decode: impl FnOnce(Vec<u8>) -> Result<T, String>) -> Self {
		let status_code = raw.status.as_u16();

		if !raw.is_success() {
			return Self::failure(status_code, failure_text(&raw));
		}
		if raw.body.is_empty() {
			return Self::success(status_code, None);
		}

		match decode(raw.body) {
			Ok(data) => Self::success(status_code, Some(data)),
			Err(e) => Self { status_code, data: None, error: Some(e) },
		}
	}
}
impl<T> ApiResponse<T>
where
	T: DeserializeOwned,
{
	/// Decodes a JSON body.
	pub fn from_json(raw: RawResponse) -> Self {
		Self::decode(raw, |body| {
			let mut de = serde_json::Deserializer::from_slice(&body);

			serde_path_to_error::deserialize(&mut de)
				.map_err(|e| format!("Response body could not be decoded: {e}."))
		})
	}
}
impl ApiResponse<String> {
	/// Decodes a UTF-8 body.
	pub fn from_text(raw: RawResponse) -> Self {
		Self::decode(raw, |body| {
			String::from_utf8(body).map_err(|e| format!("Response body is not valid UTF-8: {e}."))
		})
	}
}
impl ApiResponse<Vec<u8>> {
	/// Keeps the body as bytes.
	pub fn from_bytes(raw: RawResponse) -> Self {
		Self::decode(raw, Ok)
	}
}

fn failure_text(raw: &RawResponse) -> String {
	let text = raw.text();

	if text.trim().is_empty() {
		raw.status.canonical_reason().unwrap_or("Request failed").to_owned()
	} else {
		text.into_owned()
	}
}
