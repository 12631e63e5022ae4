//! Authenticated client facade that owns the transport, the credential store, and the
//! refresh coordinator.

mod dispatch;
mod refresh;
mod verbs;

pub use refresh::RefreshOutcome;

// self
use crate::{
	_prelude::*,
	config::ClientConfig,
	coordinator::{Coordinator, RefreshMetrics},
	store::CredentialStore,
	transport::HttpTransport,
};
#[cfg(feature = "reqwest")]
use crate::{error::ConfigError, transport::ReqwestTransport};

/// Zero-argument callback fired once per failed refresh episode, after credentials are cleared.
pub type LogoutHook = Arc<dyn Fn() + Send + Sync>;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestAuthClient = AuthClient<ReqwestTransport>;

/// Authenticated HTTP client.
///
/// Clones share the transport, the store, and the refresh coordinator, so every clone takes
/// part in the same single-flight refresh. Build one instance in the application's composition
/// root and hand clones or references to callers.
pub struct AuthClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Transport used for every outbound request, the refresh call included.
	pub transport: Arc<T>,
	/// Store holding the current token pair.
	pub store: Arc<dyn CredentialStore>,
	/// Validated client configuration.
	pub config: Arc<ClientConfig>,
	/// Shared metrics recorder for refresh episodes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	coordinator: Arc<Coordinator>,
	on_logout: Option<LogoutHook>,
}
impl<T> AuthClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_transport(
		config: ClientConfig,
		store: Arc<dyn CredentialStore>,
		transport: impl Into<Arc<T>>,
	) -> Self {
		let refresh_metrics = Arc::<RefreshMetrics>::default();
		let coordinator = Arc::new(Coordinator::new(&config.refresh, refresh_metrics.clone()));

		Self {
			transport: transport.into(),
			store,
			config: Arc::new(config),
			refresh_metrics,
			coordinator,
			on_logout: None,
		}
	}

	/// Registers the logout notification.
	pub fn on_logout(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
		self.on_logout = Some(Arc::new(hook));

		self
	}

	/// Refresh state machine shared by every clone of this client.
	pub fn coordinator(&self) -> &Coordinator {
		&self.coordinator
	}
}
#[cfg(feature = "reqwest")]
impl AuthClient<ReqwestTransport> {
	/// Creates a client with its own reqwest transport.
	///
	/// Redirects are not followed, so a 401 from a redirected endpoint reaches the coordinator
	/// instead of being swallowed.
	pub fn new(config: ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().redirect(reqwest::redirect::Policy::none()).build()?;

		Ok(Self::with_transport(config, store, ReqwestTransport::with_client(client)))
	}
}
impl<T> Clone for AuthClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			store: self.store.clone(),
			config: self.config.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			coordinator: self.coordinator.clone(),
			on_logout: self.on_logout.clone(),
		}
	}
}
impl<T> Debug for AuthClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthClient")
			.field("config", &self.config)
			.field("coordinator", &self.coordinator)
			.field("on_logout_set", &self.on_logout.is_some())
			.finish()
	}
}
