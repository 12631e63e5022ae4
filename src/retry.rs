//! Request replay after a credential refresh.
//!
//! A replay is the same [`ApiRequest`](crate::request::ApiRequest) resubmitted through the
//! regular pipeline: path, method, body, query, content type, and expected response shape are
//! carried over untouched, the `Authorization` header is dropped so the injector recomputes it
//! from the store, and the retry counter grows by one so a second failure meets the retry bound.

// crates.io
use http::header::AUTHORIZATION;
// self
use crate::request::PendingRequest;

impl PendingRequest {
	/// Rebuilds this descriptor for its next attempt.
	pub fn into_replay(self) -> Self {
		let Self { mut request, retry_count, is_refresh_call, generation } = self;

		request.headers.remove(AUTHORIZATION);

		Self { request, retry_count: retry_count.saturating_add(1), is_refresh_call, generation }
	}

	/// Returns `true` once the descriptor used up `max_retry` replays.
	pub fn retries_exhausted(&self, max_retry: u32) -> bool {
		self.retry_count >= max_retry
	}
}
