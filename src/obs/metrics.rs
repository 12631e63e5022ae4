// self
use crate::{
	coordinator::Verdict,
	obs::{FlowKind, FlowOutcome},
};

/// Bumps `refresh_relay_flow_total{flow,outcome}`.
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!(
		"refresh_relay_flow_total",
		"flow" => kind.as_str(),
		"outcome" => outcome.as_str()
	)
	.increment(1);
	#[cfg(not(feature = "metrics"))]
	let _ = (kind, outcome);
}

/// Bumps `refresh_relay_verdict_total{verdict}` for every classified failure.
pub fn record_verdict(verdict: Verdict) {
	#[cfg(feature = "metrics")]
	metrics::counter!("refresh_relay_verdict_total", "verdict" => verdict.as_str()).increment(1);
	#[cfg(not(feature = "metrics"))]
	let _ = verdict;
}

/// Records how many queued requests one settlement resumed.
pub fn record_resumed_waiters(count: usize) {
	#[cfg(feature = "metrics")]
	metrics::histogram!("refresh_relay_waiters_resumed").record(count as f64);
	#[cfg(not(feature = "metrics"))]
	let _ = count;
}
