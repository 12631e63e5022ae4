//! Refresh episode run by the request that flipped the coordinator to `Refreshing`.

// crates.io
use serde_json::{Map, Value};
// self
use crate::{
	_prelude::*,
	auth::{Credentials, TokenSecret},
	client::AuthClient,
	coordinator::{RefreshLease, Settlement, Ticket, WaitOutcome},
	error::RefreshError,
	obs::{self, FlowKind, FlowOutcome},
	request::{ApiRequest, PendingRequest},
	transport::HttpTransport,
};

/// How [`AuthClient::refresh_now`] obtained fresh credentials.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
	/// This call issued the refresh request.
	Led,
	/// This call joined an episode that was already in flight.
	Joined,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshPayload {
	#[serde(default)]
	access_token: Option<String>,
	#[serde(default)]
	refresh_token: Option<String>,
}

impl<T> AuthClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Refreshes credentials now, coalescing with an episode that is already running.
	///
	/// Failure follows the regular path: credentials are cleared and the logout hook fires.
	pub async fn refresh_now(&self) -> Result<RefreshOutcome> {
		loop {
			match self.coordinator.enter(self.coordinator.generation()) {
				// A refresh settled between the two reads; look again.
				Ticket::Rotated => continue,
				// A failed episode cleared credentials between the two reads.
				Ticket::LoggedOut => return Err(RefreshError::EpisodeFailed.into()),
				Ticket::Leader(lease) => {
					self.run_episode(lease).await?;

					return Ok(RefreshOutcome::Led);
				},
				Ticket::Waiter(waiter) => match waiter.wait(None).await {
					WaitOutcome::Settled(Settlement::Refreshed) => return Ok(RefreshOutcome::Joined),
					WaitOutcome::Settled(Settlement::Failed) =>
						return Err(RefreshError::EpisodeFailed.into()),
					WaitOutcome::Settled(Settlement::Abandoned) => continue,
					WaitOutcome::Cancelled => return Err(Error::Cancelled),
				},
			}
		}
	}

	/// Runs one episode and settles `lease`.
	///
	/// On success the new pair is saved before the coordinator returns to `Idle`. On failure
	/// credentials are cleared, the episode settles as failed, and the logout hook fires once.
	pub(crate) async fn run_episode(&self, lease: RefreshLease<'_>) -> Result<(), RefreshError> {
		self.refresh_metrics.record_attempt();
		obs::record_flow_outcome(FlowKind::Refresh, FlowOutcome::Attempt);

		match obs::in_flow(FlowKind::Refresh, "run_episode", self.refresh_credentials()).await {
			Ok(()) => {
				self.refresh_metrics.record_success();
				obs::record_flow_outcome(FlowKind::Refresh, FlowOutcome::Success);

				let resumed = lease.settle(Settlement::Refreshed);

				obs::trace_settlement(Settlement::Refreshed, resumed.len());
				obs::record_resumed_waiters(resumed.len());

				Ok(())
			},
			Err(e) => {
				self.refresh_metrics.record_failure();
				obs::record_flow_outcome(FlowKind::Refresh, FlowOutcome::Failure);
				obs::trace_refresh_failure(&e);

				if let Err(clear) = self.store.clear_on_logout().await {
					obs::trace_clear_failure(&clear);
				}

				let resumed = lease.settle(Settlement::Failed);

				obs::trace_settlement(Settlement::Failed, resumed.len());
				obs::record_resumed_waiters(resumed.len());

				if let Some(hook) = &self.on_logout {
					hook();
				}

				Err(e)
			},
		}
	}

	async fn refresh_credentials(&self) -> Result<(), RefreshError> {
		let refresh_token = self
			.store
			.refresh_token()
			.await
			.map_err(RefreshError::Lookup)?
			.filter(|token| !token.is_empty())
			.ok_or(RefreshError::MissingRefreshToken)?;
		let access_token = self.store.access_token().await.map_err(RefreshError::Lookup)?;
		let mut pending =
			PendingRequest::refresh_call(self.refresh_request(access_token, refresh_token)?);
		let response = self.send_attempt(&mut pending).await?;

		if !response.is_success() {
			let verdict = self.coordinator.evaluate(&pending, &response);

			obs::trace_verdict(verdict, response.status.as_u16(), pending.retry_count);
			obs::record_verdict(verdict);

			return Err(RefreshError::Rejected { status: response.status.as_u16() });
		}

		let mut de = serde_json::Deserializer::from_slice(&response.body);
		let payload: RefreshPayload = serde_path_to_error::deserialize(&mut de)
			.map_err(|source| RefreshError::MalformedResponse { source })?;
		let access_token = payload
			.access_token
			.filter(|token| !token.is_empty())
			.ok_or(RefreshError::IncompleteResponse { field: "accessToken" })?;
		let refresh_token = payload
			.refresh_token
			.filter(|token| !token.is_empty())
			.ok_or(RefreshError::IncompleteResponse { field: "refreshToken" })?;

		self.store
			.save_tokens(Credentials::new(access_token, refresh_token))
			.await
			.map_err(RefreshError::Save)
	}

	/// Builds the refresh call. Token fields win over extra fields with the same name.
	fn refresh_request(
		&self,
		access_token: Option<TokenSecret>,
		refresh_token: TokenSecret,
	) -> Result<ApiRequest, RefreshError> {
		let config = &self.config.refresh;
		let mut payload = config.extra_payload.clone();

		if let Some(access_token) = access_token.filter(|token| !token.is_empty()) {
			payload.insert("accessToken".into(), access_token.expose().into());
		}

		payload.insert("refreshToken".into(), refresh_token.expose().into());

		let request = ApiRequest::new(config.method.as_method(), config.endpoint.as_str());

		if config.method.uses_query() {
			Ok(query_pairs(payload)
				.into_iter()
				.fold(request, |request, (key, value)| request.query(key, value)))
		} else {
			Ok(request.json(&payload)?)
		}
	}
}

fn query_pairs(payload: Map<String, Value>) -> Vec<(String, String)> {
	payload
		.into_iter()
		.map(|(key, value)| {
			let value = match value {
				Value::String(s) => s,
				Value::Null => String::new(),
				other => other.to_string(),
			};

			(key, value)
		})
		.collect()
}
