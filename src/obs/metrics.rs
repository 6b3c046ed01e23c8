// self
use crate::{client::Verb, obs::RefreshOutcome};

/// Records a refresh outcome via the global metrics recorder (when enabled).
pub fn record_refresh_outcome(verb: Verb, outcome: RefreshOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"beds24_refresh_total",
			"verb" => verb.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (verb, outcome);
	}
}
