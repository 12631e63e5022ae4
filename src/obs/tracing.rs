// self
use crate::{
	_prelude::*,
	coordinator::{Settlement, Verdict},
	error::RefreshError,
	obs::FlowKind,
	store::StoreError,
};

/// Future running inside a `refresh_relay.flow` span; the bare future without `tracing`.
#[cfg(feature = "tracing")]
pub type InFlow<F> = tracing::instrument::Instrumented<F>;
/// Future running inside a `refresh_relay.flow` span; the bare future without `tracing`.
#[cfg(not(feature = "tracing"))]
pub type InFlow<F> = F;

/// Runs `fut` inside a `refresh_relay.flow` span tagged with `kind` and the calling `stage`.
///
/// The span is attached to the future rather than entered, so nothing is held across `.await`.
pub fn in_flow<F>(kind: FlowKind, stage: &'static str, fut: F) -> InFlow<F>
where
	F: Future,
{
	#[cfg(feature = "tracing")]
	{
		use tracing::Instrument;

		fut.instrument(tracing::info_span!("refresh_relay.flow", flow = kind.as_str(), stage))
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, stage);

		fut
	}
}

/// Emits a debug event for the coordinator's classification of a failed response.
pub fn trace_verdict(verdict: Verdict, status: u16, retry_count: u32) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(verdict = verdict.as_str(), status, retry_count, "failed response classified");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (verdict, status, retry_count);
	}
}

/// Emits an event once a refresh episode settles and its waiters are resumed.
pub fn trace_settlement(settlement: Settlement, resumed: usize) {
	#[cfg(feature = "tracing")]
	{
		match settlement {
			Settlement::Refreshed => tracing::debug!(resumed, "refresh episode succeeded"),
			Settlement::Failed => tracing::warn!(resumed, "refresh episode failed"),
			Settlement::Abandoned => tracing::warn!(resumed, "refresh episode abandoned"),
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (settlement, resumed);
	}
}

/// Emits a warning describing why a refresh call failed.
pub fn trace_refresh_failure(error: &RefreshError) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(error = %error, "credential refresh failed");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = error;
	}
}

/// Emits a warning when the store could not be cleared during logout.
pub fn trace_clear_failure(error: &StoreError) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(error = %error, "clearing credentials on logout failed");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = error;
	}
}
