//! Thread-safe in-memory [`CredentialStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{Credentials, TokenSecret},
	store::{CredentialStore, StoreFuture},
};

type Slot = Arc<RwLock<Option<Credentials>>>;

/// Storage backend that keeps the token pair in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Slot);
impl MemoryStore {
	/// Creates a store seeded with `credentials`.
	pub fn with_credentials(credentials: Credentials) -> Self {
		Self(Arc::new(RwLock::new(Some(credentials))))
	}

	/// Returns a copy of the current pair.
	pub fn snapshot(&self) -> Option<Credentials> {
		self.0.read().clone()
	}
}
impl CredentialStore for MemoryStore {
	fn access_token(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(slot.read().as_ref().map(|c| c.access_token.clone())) })
	}

	fn refresh_token(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(slot.read().as_ref().map(|c| c.refresh_token.clone())) })
	}

	fn save_tokens(&self, credentials: Credentials) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			*slot.write() = Some(credentials);

			Ok(())
		})
	}

	fn clear_on_logout(&self) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			slot.write().take();

			Ok(())
		})
	}
}
