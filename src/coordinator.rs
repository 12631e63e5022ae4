//! Single-flight refresh coordination.
//!
//! The [`Coordinator`] owns the only piece of shared mutable state in the client: the
//! [`RefreshState`] plus its waiter queue. Every failed response is classified by
//! [`Coordinator::evaluate`]; refreshable failures then call `enter`, which inspects and
//! transitions the state under one synchronous lock with no suspension point inside. The first
//! caller to find the state `Idle` flips it to `Refreshing` and leads the episode; every later
//! caller is queued and suspended until the leader settles.
//!
//! A credential generation counter is bumped whenever an episode changes the stored credentials,
//! by rotating them or by clearing them. Requests record the generation they were sent under, so
//! a 401 that arrives after a rotation goes straight to replay, and one that arrives after a
//! failed episode resolves with its own 401 instead of clearing and logging out a second time.

mod metrics;
mod state;

pub use metrics::{RefreshMetrics, RefreshStats};
pub use state::{RefreshState, Settlement, WaiterQueue};

// std
use std::mem;
// crates.io
use futures::{
	channel::oneshot,
	future::{self, Either},
};
use http::StatusCode;
use tokio_util::sync::CancellationToken;
// self
use crate::{
	_prelude::*,
	config::{ExpiredMarker, RefreshConfig},
	request::PendingRequest,
	transport::RawResponse,
};

/// Classification of a failed response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verdict {
	/// Expired session that a refresh may recover.
	Refreshable,
	/// The request already used every replay it is allowed.
	RetriesExhausted,
	/// The refresh call itself failed; it is never refreshed.
	RefreshCallRejected,
	/// Any other failure.
	NotRefreshable,
}
impl Verdict {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Verdict::Refreshable => "refreshable",
			Verdict::RetriesExhausted => "retries_exhausted",
			Verdict::RefreshCallRejected => "refresh_call_rejected",
			Verdict::NotRefreshable => "not_refreshable",
		}
	}
}
impl Display for Verdict {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Default)]
struct Inner {
	state: RefreshState,
	generation: u64,
	/// Generation produced by the latest failed episode.
	logged_out_at: Option<u64>,
	next_waiter: u64,
}

/// Owner of the refresh state machine.
#[derive(Debug)]
pub struct Coordinator {
	inner: Mutex<Inner>,
	max_retry: u32,
	expired_marker: Option<ExpiredMarker>,
	metrics: Arc<RefreshMetrics>,
}
impl Coordinator {
	/// Creates an idle coordinator enforcing `config`'s retry bound and expiry marker.
	pub fn new(config: &RefreshConfig, metrics: Arc<RefreshMetrics>) -> Self {
		Self {
			inner: Default::default(),
			max_retry: config.max_retry,
			expired_marker: config.expired_marker.clone(),
			metrics,
		}
	}

	/// Classifies a failed response for `pending`.
	///
	/// Checks run in a fixed order: retry bound, refresh-call flag, then the refreshable
	/// condition.
	pub fn evaluate(&self, pending: &PendingRequest, response: &RawResponse) -> Verdict {
		if pending.retries_exhausted(self.max_retry) {
			return Verdict::RetriesExhausted;
		}
		if pending.is_refresh_call {
			return Verdict::RefreshCallRejected;
		}
		if !self.is_refreshable(response) {
			return Verdict::NotRefreshable;
		}

		Verdict::Refreshable
	}

	/// A 401, carrying the configured body marker when one is set.
	pub fn is_refreshable(&self, response: &RawResponse) -> bool {
		response.status == StatusCode::UNAUTHORIZED
			&& self.expired_marker.as_ref().is_none_or(|marker| marker.matches(&response.body))
	}

	/// Returns `true` while a refresh call is outstanding.
	pub fn is_refreshing(&self) -> bool {
		self.inner.lock().state.is_refreshing()
	}

	/// Number of requests queued behind the outstanding refresh call.
	pub fn waiting(&self) -> usize {
		match &self.inner.lock().state {
			RefreshState::Refreshing(queue) => queue.len(),
			RefreshState::Idle => 0,
		}
	}

	/// Number of episodes that rotated or cleared credentials so far.
	pub fn generation(&self) -> u64 {
		self.inner.lock().generation
	}

	/// Shared refresh counters.
	pub fn metrics(&self) -> &Arc<RefreshMetrics> {
		&self.metrics
	}

	/// Atomically decides whether the caller leads a refresh, queues behind one, or skips the
	/// refresh because an episode already settled after it was sent.
	pub(crate) fn enter(&self, observed_generation: u64) -> Ticket<'_> {
		let mut guard = self.inner.lock();
		let inner = &mut *guard;

		if inner.generation != observed_generation {
			return if inner.logged_out_at == Some(inner.generation) {
				Ticket::LoggedOut
			} else {
				Ticket::Rotated
			};
		}
		if let RefreshState::Refreshing(queue) = &mut inner.state {
			let id = inner.next_waiter;

			inner.next_waiter += 1;

			let receiver = queue.enqueue(id);

			self.metrics.record_coalesced();

			return Ticket::Waiter(Waiter { coordinator: self, id, receiver, resolved: false });
		}

		inner.state = RefreshState::Refreshing(WaiterQueue::default());

		Ticket::Leader(RefreshLease { coordinator: self, settled: false })
	}

	fn forget(&self, id: u64) -> bool {
		match &mut self.inner.lock().state {
			RefreshState::Refreshing(queue) => queue.remove(id),
			RefreshState::Idle => false,
		}
	}

	fn settle(&self, settlement: Settlement) -> Vec<u64> {
		let queue = {
			let mut inner = self.inner.lock();

			match settlement {
				Settlement::Refreshed => inner.generation += 1,
				Settlement::Failed => {
					inner.generation += 1;
					inner.logged_out_at = Some(inner.generation);
				},
				Settlement::Abandoned => (),
			}

			match mem::take(&mut inner.state) {
				RefreshState::Refreshing(queue) => queue,
				RefreshState::Idle => WaiterQueue::default(),
			}
		};

		queue.drain(settlement)
	}
}

/// Result of [`Coordinator::enter`].
pub(crate) enum Ticket<'a> {
	/// Credentials changed since the request was sent; replay without refreshing.
	Rotated,
	/// A failed episode cleared credentials since the request was sent; fail without refreshing.
	LoggedOut,
	/// The caller runs the refresh episode.
	Leader(RefreshLease<'a>),
	/// The caller waits for the running episode.
	Waiter(Waiter<'a>),
}

/// Exclusive right to run the current refresh episode.
///
/// Dropping an unsettled lease abandons the episode so queued requests are never stranded.
pub(crate) struct RefreshLease<'a> {
	coordinator: &'a Coordinator,
	settled: bool,
}
impl RefreshLease<'_> {
	/// Returns to `Idle` and resumes every waiter in arrival order.
	pub(crate) fn settle(mut self, settlement: Settlement) -> Vec<u64> {
		self.settled = true;

		self.coordinator.settle(settlement)
	}
}
impl Drop for RefreshLease<'_> {
	fn drop(&mut self) {
		if !self.settled {
			self.coordinator.settle(Settlement::Abandoned);
		}
	}
}

/// What a queued request observed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WaitOutcome {
	Settled(Settlement),
	Cancelled,
}

/// Completion handle of a queued request.
///
/// Dropping it before the episode settles removes it from the queue.
pub(crate) struct Waiter<'a> {
	coordinator: &'a Coordinator,
	id: u64,
	receiver: oneshot::Receiver<Settlement>,
	resolved: bool,
}
impl Waiter<'_> {
	/// Suspends until the episode settles or `cancellation` fires.
	pub(crate) async fn wait(mut self, cancellation: Option<&CancellationToken>) -> WaitOutcome {
		let outcome = match cancellation {
			Some(token) => {
				let cancelled = std::pin::pin!(token.cancelled());

				match future::select(&mut self.receiver, cancelled).await {
					Either::Left((settled, _)) =>
						WaitOutcome::Settled(settled.unwrap_or(Settlement::Abandoned)),
					Either::Right(((), _)) => {
						self.coordinator.forget(self.id);
						self.coordinator.metrics.record_cancelled();

						WaitOutcome::Cancelled
					},
				}
			},
			None =>
				WaitOutcome::Settled((&mut self.receiver).await.unwrap_or(Settlement::Abandoned)),
		};

		self.resolved = true;

		outcome
	}
}
impl Drop for Waiter<'_> {
	fn drop(&mut self) {
		if !self.resolved {
			self.coordinator.forget(self.id);
		}
	}
}
