// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of [`RefreshMetrics`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefreshStats {
	/// Refresh calls issued.
	pub attempts: u64,
	/// Episodes that saved a new pair.
	pub successes: u64,
	/// Episodes that ended in logout.
	pub failures: u64,
	/// Requests that queued behind a running episode instead of starting one.
	pub coalesced: u64,
	/// Queued requests cancelled before their episode settled.
	pub cancelled: u64,
}

/// Always-on refresh counters shared by every clone of a client.
#[derive(Debug, Default)]
pub struct RefreshMetrics {
	attempts: AtomicU64,
	successes: AtomicU64,
	failures: AtomicU64,
	coalesced: AtomicU64,
	cancelled: AtomicU64,
}
impl RefreshMetrics {
	/// Reads every counter.
	pub fn snapshot(&self) -> RefreshStats {
		RefreshStats {
			attempts: read(&self.attempts),
			successes: read(&self.successes),
			failures: read(&self.failures),
			coalesced: read(&self.coalesced),
			cancelled: read(&self.cancelled),
		}
	}

	/// Refresh calls issued.
	pub fn attempts(&self) -> u64 {
		read(&self.attempts)
	}

	/// Episodes that saved a new pair.
	pub fn successes(&self) -> u64 {
		read(&self.successes)
	}

	/// Episodes that ended in logout.
	pub fn failures(&self) -> u64 {
		read(&self.failures)
	}

	/// Requests that queued behind a running episode.
	pub fn coalesced(&self) -> u64 {
		read(&self.coalesced)
	}

	/// Queued requests cancelled before their episode settled.
	pub fn cancelled(&self) -> u64 {
		read(&self.cancelled)
	}

	pub(crate) fn record_attempt(&self) {
		bump(&self.attempts);
	}

	pub(crate) fn record_success(&self) {
		bump(&self.successes);
	}

	pub(crate) fn record_failure(&self) {
		bump(&self.failures);
	}

	pub(crate) fn record_coalesced(&self) {
		bump(&self.coalesced);
	}

	pub(crate) fn record_cancelled(&self) {
		bump(&self.cancelled);
	}
}

fn read(counter: &AtomicU64) -> u64 {
	counter.load(Ordering::Relaxed)
}

fn bump(counter: &AtomicU64) {
	counter.fetch_add(1, Ordering::Relaxed);
}
