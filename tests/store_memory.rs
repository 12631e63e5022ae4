// std
use std::sync::Arc;
// self
use refresh_relay::{
	auth::Credentials,
	store::{CredentialStore, MemoryStore},
};

#[tokio::test]
async fn empty_store_yields_no_tokens() {
	let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::default());

	assert!(store.access_token().await.expect("Read should succeed.").is_none());
	assert!(store.refresh_token().await.expect("Read should succeed.").is_none());
}

#[tokio::test]
async fn save_replaces_the_whole_pair() {
	let backend = MemoryStore::with_credentials(Credentials::new("A1", "R1"));
	let store: Arc<dyn CredentialStore> = Arc::new(backend.clone());

	store.save_tokens(Credentials::new("A2", "R2")).await.expect("Save should succeed.");

	let access = store.access_token().await.expect("Read should succeed.");
	let refresh = store.refresh_token().await.expect("Read should succeed.");

	assert_eq!(access.as_ref().map(|t| t.expose()), Some("A2"));
	assert_eq!(refresh.as_ref().map(|t| t.expose()), Some("R2"));
	// Clones share the same slot.
	assert_eq!(backend.snapshot(), Some(Credentials::new("A2", "R2")));
}

#[tokio::test]
async fn logout_clears_both_tokens() {
	let backend = MemoryStore::with_credentials(Credentials::new("A1", "R1"));

	backend.clear_on_logout().await.expect("Clear should succeed.");

	assert_eq!(backend.snapshot(), None);
	assert!(backend.refresh_token().await.expect("Read should succeed.").is_none());
	// Clearing twice is harmless.
	backend.clear_on_logout().await.expect("Second clear should succeed.");
}
