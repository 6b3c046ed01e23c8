//! Optional observability helpers for decorated calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to run every decorated call inside a span named `beds24.call` with the `verb`
//!   and `stage` fields, and to log refresh failures.
//! - Enable `metrics` to increment the `beds24_refresh_total` counter for every refresh
//!   attempt/success/failure, labeled by `verb` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each refresh cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefreshOutcome {
	/// An auth failure triggered a refresh.
	Attempt,
	/// A new access token was installed and the call replayed.
	Success,
	/// The refresh failed and the original error was returned.
	Failure,
}
impl RefreshOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RefreshOutcome::Attempt => "attempt",
			RefreshOutcome::Success => "success",
			RefreshOutcome::Failure => "failure",
		}
	}
}
impl Display for RefreshOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
