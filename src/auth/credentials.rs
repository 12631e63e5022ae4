//! Immutable access/refresh token pair.

// self
use crate::{_prelude::*, auth::secret::TokenSecret};

/// Access token paired with the refresh token that can renew it.
///
/// Stores replace the pair as a whole, so readers never observe a new access token
/// next to a stale refresh token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
	/// Short-lived bearer token attached to outgoing requests.
	pub access_token: TokenSecret,
	/// Longer-lived token exchanged for a new pair.
	pub refresh_token: TokenSecret,
}
impl Credentials {
	/// Builds a pair from raw token strings.
	pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			refresh_token: TokenSecret::new(refresh_token),
		}
	}
}
