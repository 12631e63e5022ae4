//! Token wrapper whose formatters never print the token.

// self
use crate::_prelude::*;

const MASK: &str = "***";

/// Access or refresh token.
///
/// `Debug` and `Display` print a mask, so credentials can sit inside structs that get logged.
/// Serialization writes the raw string; persisting a token is the point of storing it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a raw token.
	pub fn new(token: impl Into<String>) -> Self {
		Self(token.into())
	}

	/// Raw token. Keep it out of logs.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns `true` for an empty token, which is treated as absent.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// `Authorization` header value for this token.
	pub fn bearer(&self) -> String {
		format!("Bearer {}", self.0)
	}
}
impl From<String> for TokenSecret {
	fn from(token: String) -> Self {
		Self(token)
	}
}
impl From<&str> for TokenSecret {
	fn from(token: &str) -> Self {
		Self::new(token)
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "TokenSecret({MASK})")
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(MASK)
	}
}
