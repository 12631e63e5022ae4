#![allow(dead_code)]

// std
use std::{
	io,
	sync::atomic::{AtomicUsize, Ordering},
};
// crates.io
use serde_json::json;
use tokio::sync::Notify;
// self
use refresh_relay::{
	_preludet::*,
	auth::{Credentials, TokenSecret},
	client::AuthClient,
	config::{ClientConfig, RefreshConfig},
	http::{StatusCode, header::AUTHORIZATION},
	store::{CredentialStore, MemoryStore, StoreError, StoreFuture},
	transport::{HttpTransport, OutboundRequest, RawResponse, TransportFuture},
};

pub const REFRESH_PATH: &str = "/auth/refresh";
/// Requests to this path answer only after [`GatedTransport::release_held`].
pub const HELD_PATH: &str = "/slow";

pub fn gated_client(
	transport: GatedTransport,
	refresh: RefreshConfig,
) -> (AuthClient<GatedTransport>, Arc<MemoryStore>, LogoutProbe) {
	let store = seeded_store("A1", "R1");
	let (client, logout) = gated_client_over(transport, refresh, store.clone());

	(client, store, logout)
}

pub fn gated_client_over(
	transport: GatedTransport,
	refresh: RefreshConfig,
	store: Arc<dyn CredentialStore>,
) -> (AuthClient<GatedTransport>, LogoutProbe) {
	let config = ClientConfig::builder("https://api.example.com")
		.timeout(Duration::from_secs(5))
		.refresh(refresh)
		.build()
		.expect("Test client configuration should be valid.");
	let probe = LogoutProbe::default();
	let client = AuthClient::<GatedTransport>::with_transport(config, store, transport)
		.on_logout(probe.hook());

	(client, probe)
}

/// Memory store whose `save_tokens` always fails.
#[derive(Debug)]
pub struct ReadOnlyStore(pub Arc<MemoryStore>);
impl CredentialStore for ReadOnlyStore {
	fn access_token(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		self.0.access_token()
	}

	fn refresh_token(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		self.0.refresh_token()
	}

	fn save_tokens(&self, _: Credentials) -> StoreFuture<'_, ()> {
		Box::pin(async { Err(StoreError::Backend { message: "disk full".into() }) })
	}

	fn clear_on_logout(&self) -> StoreFuture<'_, ()> {
		self.0.clear_on_logout()
	}
}

/// How the fake refresh endpoint answers once its gate opens.
#[derive(Clone, Debug)]
pub enum RefreshReply {
	Rotate { access: &'static str, refresh: &'static str },
	Reject(StatusCode),
	/// 200 with a body that is not JSON.
	Garbled,
	/// The connection drops before a response arrives.
	Reset,
}

/// In-process transport whose refresh endpoint blocks until the test opens the gate.
///
/// Every other path answers 200 when the bearer matches the currently accepted token and a
/// refreshable 401 otherwise. [`HELD_PATH`] checks the bearer on arrival but answers only once
/// the test lets it go.
pub struct GatedTransport {
	accepted: Mutex<String>,
	reply: RefreshReply,
	gate: Notify,
	held: Notify,
	refresh_calls: AtomicUsize,
	seen: Mutex<Vec<(String, Option<String>)>>,
}
impl GatedTransport {
	pub fn new(accepted: &str, reply: RefreshReply) -> Self {
		Self {
			accepted: Mutex::new(accepted.to_owned()),
			reply,
			gate: Notify::new(),
			held: Notify::new(),
			refresh_calls: AtomicUsize::new(0),
			seen: Mutex::new(Vec::new()),
		}
	}

	/// Lets one pending (or the next) refresh call answer.
	pub fn release(&self) {
		self.gate.notify_one();
	}

	/// Lets one request on [`HELD_PATH`] answer.
	pub fn release_held(&self) {
		self.held.notify_one();
	}

	pub fn refresh_calls(&self) -> usize {
		self.refresh_calls.load(Ordering::SeqCst)
	}

	/// `Authorization` values seen on `path`, in arrival order.
	pub fn bearers(&self, path: &str) -> Vec<Option<String>> {
		self.seen
			.lock()
			.iter()
			.filter(|(seen, _)| seen == path)
			.map(|(_, bearer)| bearer.clone())
			.collect()
	}
}
impl HttpTransport for GatedTransport {
	type TransportError = io::Error;

	fn execute(&self, request: OutboundRequest) -> TransportFuture<'_, Self::TransportError> {
		Box::pin(async move {
			let path = request.url.path().to_owned();
			let bearer = request
				.headers
				.get(AUTHORIZATION)
				.and_then(|value| value.to_str().ok())
				.map(str::to_owned);

			self.seen.lock().push((path.clone(), bearer.clone()));

			if path == REFRESH_PATH {
				self.refresh_calls.fetch_add(1, Ordering::SeqCst);
				self.gate.notified().await;

				let response = match &self.reply {
					RefreshReply::Rotate { access, refresh } => {
						*self.accepted.lock() = (*access).to_owned();

						RawResponse::new(
							StatusCode::OK,
							json!({ "accessToken": access, "refreshToken": refresh }).to_string(),
						)
					},
					RefreshReply::Reject(status) => RawResponse::new(*status, ""),
					RefreshReply::Garbled =>
						RawResponse::new(StatusCode::OK, "<html>maintenance</html>"),
					RefreshReply::Reset =>
						return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
				};

				return Ok(response);
			}

			let expected = format!("Bearer {}", self.accepted.lock());
			let response = if bearer.as_deref() == Some(expected.as_str()) {
				RawResponse::new(StatusCode::OK, r#"{"ok":true}"#)
			} else {
				RawResponse::new(StatusCode::UNAUTHORIZED, r#"{"reason":"token_expired"}"#)
			};

			if path == HELD_PATH {
				self.held.notified().await;
			}

			Ok(response)
		})
	}
}

/// Polls `check` until it holds, failing the test after a generous deadline.
pub async fn wait_until(mut check: impl FnMut() -> bool) {
	for _ in 0..1_000 {
		if check() {
			return;
		}

		tokio::time::sleep(Duration::from_millis(5)).await;
	}

	panic!("Condition was not reached in time.");
}
