// crates.io
use futures::channel::oneshot;
// self
use crate::_prelude::*;

/// How a refresh episode ended, as seen by a queued request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Settlement {
	/// New credentials were saved; replay the request.
	Refreshed,
	/// Refresh failed; resolve with the original failure.
	Failed,
	/// The leading task went away before finishing; evaluate again.
	Abandoned,
}

/// Refresh state owned by the coordinator.
#[derive(Debug, Default)]
pub enum RefreshState {
	/// No refresh call in flight.
	#[default]
	Idle,
	/// A refresh call is outstanding; later arrivals queue here.
	Refreshing(WaiterQueue),
}
impl RefreshState {
	/// Returns `true` while a refresh call is outstanding.
	pub fn is_refreshing(&self) -> bool {
		matches!(self, Self::Refreshing(_))
	}
}

/// FIFO queue of completion handles for requests suspended behind a refresh.
#[derive(Debug, Default)]
pub struct WaiterQueue(VecDeque<(u64, oneshot::Sender<Settlement>)>);
impl WaiterQueue {
	/// Appends a waiter and returns the receiving half of its handle.
	pub fn enqueue(&mut self, id: u64) -> oneshot::Receiver<Settlement> {
		let (sender, receiver) = oneshot::channel();

		self.0.push_back((id, sender));

		receiver
	}

	/// Drops the waiter with `id`; returns whether it was still queued.
	pub fn remove(&mut self, id: u64) -> bool {
		let before = self.0.len();

		self.0.retain(|(queued, _)| *queued != id);

		self.0.len() != before
	}

	/// Number of queued waiters.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when nobody is queued.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Resolves every waiter in arrival order and returns their ids in that order.
	pub fn drain(self, settlement: Settlement) -> Vec<u64> {
		self.0
			.into_iter()
			.map(|(id, sender)| {
				// A receiver dropped mid-flight simply misses the notification.
				let _ = sender.send(settlement);

				id
			})
			.collect()
	}
}
