//! Authenticated HTTP client layer that injects bearer tokens, coalesces concurrent
//! refreshes into a single network call, replays the affected requests, and falls back
//! to a logout procedure when the refresh itself fails.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod inject;
pub mod obs;
pub mod request;
pub mod response;
pub mod retry;
pub mod store;
pub mod transport;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use crate::{auth::Credentials, store::MemoryStore};
	#[cfg(feature = "reqwest")]
	use crate::{
		client::ReqwestAuthClient,
		config::{ClientConfig, RefreshConfig},
		store::CredentialStore,
	};

	/// Counts logout notifications fired by a client under test.
	#[derive(Clone, Debug, Default)]
	pub struct LogoutProbe(Arc<AtomicUsize>);
	impl LogoutProbe {
		/// Returns how many times the hook fired.
		pub fn count(&self) -> usize {
			self.0.load(Ordering::SeqCst)
		}

		/// Builds a hook that increments this probe.
		pub fn hook(&self) -> impl Fn() + Send + Sync + 'static {
			let counter = self.0.clone();

			move || {
				counter.fetch_add(1, Ordering::SeqCst);
			}
		}
	}

	/// Memory store holding `access` and `refresh`.
	pub fn seeded_store(access: &str, refresh: &str) -> Arc<MemoryStore> {
		Arc::new(MemoryStore::with_credentials(Credentials::new(access, refresh)))
	}

	/// Constructs a [`ReqwestAuthClient`] backed by a seeded in-memory store and a logout probe.
	#[cfg(feature = "reqwest")]
	pub fn build_reqwest_test_client(
		base_url: &str,
		refresh: RefreshConfig,
		access: &str,
		refresh_token: &str,
	) -> (ReqwestAuthClient, Arc<MemoryStore>, LogoutProbe) {
		let store_backend = seeded_store(access, refresh_token);
		let store: Arc<dyn CredentialStore> = store_backend.clone();
		let config = ClientConfig::builder(base_url)
			.timeout(Duration::from_secs(5))
			.refresh(refresh)
			.build()
			.expect("Test client configuration should be valid.");
		let probe = LogoutProbe::default();
		let client = ReqwestAuthClient::new(config, store)
			.expect("Test reqwest client should build.")
			.on_logout(probe.hook());

		(client, store_backend, probe)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap, VecDeque},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
		time::Duration,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use http;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use tokio_util::sync::CancellationToken;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, refresh_relay as _};
