// std
use std::sync::atomic::{AtomicU64, Ordering::Relaxed};
// self
use crate::{_prelude::*, client::ApiResult};

/// Point-in-time copy of [`RefreshMetrics`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefreshCounts {
	/// Refresh requests sent.
	pub refreshes: u64,
	/// Refreshes that installed a new access token.
	pub rotations: u64,
	/// Refreshes that failed, leaving the original result in place.
	pub fallbacks: u64,
	/// Replays answered with a 2xx status.
	pub replays_recovered: u64,
	/// Replays still answered with 401 or 403 after a fresh token was installed.
	pub replays_rejected: u64,
}

/// Refresh-cycle counters shared by a decorator and its clones.
///
/// Replays that end in any other status, or in a transport error, only show up in
/// [`RefreshCounts::rotations`].
#[derive(Debug, Default)]
pub struct RefreshMetrics {
	refreshes: AtomicU64,
	rotations: AtomicU64,
	fallbacks: AtomicU64,
	replays_recovered: AtomicU64,
	replays_rejected: AtomicU64,
}
impl RefreshMetrics {
	/// Reads every counter.
	pub fn snapshot(&self) -> RefreshCounts {
		RefreshCounts {
			refreshes: self.refreshes.load(Relaxed),
			rotations: self.rotations.load(Relaxed),
			fallbacks: self.fallbacks.load(Relaxed),
			replays_recovered: self.replays_recovered.load(Relaxed),
			replays_rejected: self.replays_rejected.load(Relaxed),
		}
	}

	pub(crate) fn record_refresh<T, E>(&self, outcome: &Result<T, E>) {
		self.refreshes.fetch_add(1, Relaxed);

		let counter = if outcome.is_ok() { &self.rotations } else { &self.fallbacks };

		counter.fetch_add(1, Relaxed);
	}

	pub(crate) fn record_replay(&self, replay: &Result<ApiResult>) {
		match replay {
			Ok(result) if result.is_auth_failure() => {
				self.replays_rejected.fetch_add(1, Relaxed);
			},
			Ok(result) if result.response().is_success() => {
				self.replays_recovered.fetch_add(1, Relaxed);
			},
			_ => {},
		}
	}
}
