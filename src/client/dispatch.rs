//! Request pipeline: inject, send, classify, then refresh or queue, then replay.

// std
use std::pin::pin;
// crates.io
use futures::future::{self, Either};
use http::{HeaderValue, header::ACCEPT};
// self
use crate::{
	_prelude::*,
	client::AuthClient,
	coordinator::{Settlement, Ticket, Verdict, WaitOutcome},
	error::TransportError,
	inject,
	obs::{self, FlowKind, FlowOutcome},
	request::{ApiRequest, PendingRequest},
	transport::{HttpTransport, OutboundRequest, RawResponse},
};

/// What a request does once its refresh episode is behind it.
enum Resume {
	Replay,
	Fail,
}

impl<T> AuthClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Sends `request` through the authenticated pipeline and returns the final response.
	///
	/// Non-2xx statuses are returned as responses; only failures that never produced a
	/// response (transport, credential lookup, cancellation) are errors. A refreshable 401 is
	/// recovered transparently when the refresh succeeds, and surfaces unchanged when it fails.
	pub async fn execute(&self, request: ApiRequest) -> Result<RawResponse> {
		obs::record_flow_outcome(FlowKind::Dispatch, FlowOutcome::Attempt);

		let result =
			obs::in_flow(FlowKind::Dispatch, "execute", self.dispatch(PendingRequest::new(request)))
				.await;

		obs::record_flow_outcome(FlowKind::Dispatch, FlowOutcome::of_dispatch(&result));

		result
	}

	async fn dispatch(&self, mut pending: PendingRequest) -> Result<RawResponse> {
		loop {
			let response = self.send_attempt(&mut pending).await?;

			if response.is_success() {
				return Ok(response);
			}

			let verdict = self.coordinator.evaluate(&pending, &response);

			obs::trace_verdict(verdict, response.status.as_u16(), pending.retry_count);
			obs::record_verdict(verdict);

			if verdict != Verdict::Refreshable {
				return Ok(response);
			}

			match self.await_credentials(&pending).await? {
				Resume::Replay => {
					pending = pending.into_replay();

					obs::record_flow_outcome(FlowKind::Replay, FlowOutcome::Attempt);
				},
				Resume::Fail => return Ok(response),
			}
		}
	}

	/// Sends one attempt of `pending` with the current access token.
	///
	/// The credential generation is recorded before the token is read, so a 401 caused by a
	/// token that was already rotated is recognized as such by the coordinator.
	pub(crate) async fn send_attempt(&self, pending: &mut PendingRequest) -> Result<RawResponse> {
		pending.generation = self.coordinator.generation();

		if pending.request.is_cancelled() {
			return Err(Error::Cancelled);
		}

		let outbound = self.prepare(&pending.request)?;
		let outbound = inject::attach_bearer(self.store.as_ref(), outbound).await?;
		let sending = self.transport.execute(outbound);
		let sent = match &pending.request.cancellation {
			Some(token) => {
				let cancelled = pin!(token.cancelled());

				match future::select(sending, cancelled).await {
					Either::Left((sent, _)) => sent,
					Either::Right(((), _)) => return Err(Error::Cancelled),
				}
			},
			None => sending.await,
		};

		Ok(sent.map_err(TransportError::network)?)
	}

	/// Builds the wire request: URL with query, default then request headers, `Accept`, timeout.
	fn prepare(&self, request: &ApiRequest) -> Result<OutboundRequest> {
		let mut url = self.config.resolve(&request.path)?;

		if !request.query.is_empty() {
			url.query_pairs_mut().extend_pairs(&request.query);
		}

		let mut headers = self.config.default_headers.clone();

		headers.insert(ACCEPT, HeaderValue::from_static(request.response_kind.accept()));

		for name in request.headers.keys() {
			headers.remove(name);
		}
		for (name, value) in &request.headers {
			headers.append(name.clone(), value.clone());
		}

		Ok(OutboundRequest {
			method: request.method.clone(),
			url,
			headers,
			body: request.body.clone(),
			timeout: self.config.timeout,
		})
	}

	/// Leads a refresh, joins the running one, or replays straight away after a rotation.
	async fn await_credentials(&self, pending: &PendingRequest) -> Result<Resume> {
		loop {
			match self.coordinator.enter(pending.generation) {
				Ticket::Rotated => return Ok(Resume::Replay),
				Ticket::LoggedOut => return Ok(Resume::Fail),
				Ticket::Leader(lease) =>
					return Ok(match self.run_episode(lease).await {
						Ok(()) => Resume::Replay,
						Err(_) => Resume::Fail,
					}),
				Ticket::Waiter(waiter) =>
					match waiter.wait(pending.request.cancellation.as_ref()).await {
						WaitOutcome::Settled(Settlement::Refreshed) => return Ok(Resume::Replay),
						WaitOutcome::Settled(Settlement::Failed) => return Ok(Resume::Fail),
						// The leader went away; evaluate again without spending a retry.
						WaitOutcome::Settled(Settlement::Abandoned) => continue,
						WaitOutcome::Cancelled => return Err(Error::Cancelled),
					},
			}
		}
	}
}
