//! Observability hooks for the request pipeline and refresh episodes.
//!
//! Both backends are opt-in and every hook compiles to nothing without its feature:
//!
//! - `tracing`: a `refresh_relay.flow` span (fields `flow`, `stage`) around dispatch and refresh,
//!   plus events for verdicts, settlements, and refresh/logout failures.
//! - `metrics`: `refresh_relay_flow_total{flow,outcome}`, `refresh_relay_verdict_total{verdict}`,
//!   and the `refresh_relay_waiters_resumed` histogram.
//!
//! [`RefreshMetrics`](crate::coordinator::RefreshMetrics) counters are always available
//! regardless of features.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::{_prelude::*, transport::RawResponse};

/// Pipeline stage a span or counter belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// A caller request, from first send to final response.
	Dispatch,
	/// The refresh call and its settlement.
	Refresh,
	/// A resubmission after a refresh.
	Replay,
}
impl FlowKind {
	/// Label used in span fields and metric labels.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Dispatch => "dispatch",
			Self::Refresh => "refresh",
			Self::Replay => "replay",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// How far a flow got.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// The flow started.
	Attempt,
	/// 2xx response, or a saved token pair for refreshes.
	Success,
	/// Non-2xx response, local failure, or refresh failure.
	Failure,
	/// Cancelled by the caller.
	Cancelled,
}
impl FlowOutcome {
	/// Label used in span fields and metric labels.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Attempt => "attempt",
			Self::Success => "success",
			Self::Failure => "failure",
			Self::Cancelled => "cancelled",
		}
	}

	/// Final outcome of a dispatched request.
	pub fn of_dispatch(result: &Result<RawResponse>) -> Self {
		match result {
			Ok(response) if response.is_success() => Self::Success,
			Err(Error::Cancelled) => Self::Cancelled,
			_ => Self::Failure,
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
