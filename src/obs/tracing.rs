// self
use crate::{_prelude::*, client::Verb, refresh::RefreshError};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// A span builder used by decorated calls.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a new span tagged with the provided verb + stage.
	pub fn new(verb: Verb, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("beds24.call", verb = verb.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (verb, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs a refresh that could not produce a new access token.
///
/// Transport, request-construction, and decode failures are unexpected and log at `warn`; a
/// rejected refresh token or a body without a token logs at `debug`.
pub fn log_refresh_failure(verb: Verb, status: u16, err: &RefreshError) {
	#[cfg(feature = "tracing")]
	{
		if err.is_unexpected() {
			tracing::warn!(
				verb = verb.as_str(),
				status,
				error = %err,
				"Auto-refresh token failed."
			);
		} else {
			tracing::debug!(verb = verb.as_str(), status, error = %err, "Auto-refresh declined.");
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (verb, status, err);
	}
}

/// Logs a successful token rotation; the token itself is never logged.
pub fn log_token_rotated(verb: Verb, status: u16) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(verb = verb.as_str(), status, "Access token rotated; replaying call.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (verb, status);
	}
}
