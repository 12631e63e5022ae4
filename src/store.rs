//! Credential store contract and built-in store implementations.
//!
//! The client never caches tokens itself: every send re-reads the access token and every
//! refresh re-reads both tokens, so the store is the single source of truth.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{Credentials, TokenSecret},
};

/// Boxed future returned by every [`CredentialStore`] operation.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend holding the current token pair.
///
/// Each operation is asynchronous and independently failable. Implementations must replace
/// the pair atomically in [`save_tokens`](CredentialStore::save_tokens) so readers never see a
/// half-updated pair.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Returns the current access token, if any.
	fn access_token(&self) -> StoreFuture<'_, Option<TokenSecret>>;

	/// Returns the current refresh token, if any.
	fn refresh_token(&self) -> StoreFuture<'_, Option<TokenSecret>>;

	/// Replaces the stored pair.
	fn save_tokens(&self, credentials: Credentials) -> StoreFuture<'_, ()>;

	/// Drops every stored credential after an unrecoverable authentication failure.
	fn clear_on_logout(&self) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
