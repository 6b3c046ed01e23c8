//! Typed client for the Beds24 API v2 with a decorator that transparently rotates expired access
//! tokens and replays the failed call once.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod error;
pub mod obs;
pub mod rate_limit;
pub mod refresh;
pub mod transport;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and fakes for tests; enabled via `cfg(test)` or the `test` crate
	//! feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		client::{Beds24Client, Beds24ClientOptions},
		transport::{HttpRequest, HttpResponse, HttpTransport, TransportFuture},
	};

	/// Scripted reply produced by [`ScriptedTransport`].
	#[derive(Clone, Debug)]
	pub enum ScriptedReply {
		/// Respond with the given status code and raw body.
		Respond {
			/// HTTP status code.
			status: u16,
			/// Raw response body.
			body: String,
		},
		/// Fail before any response exists.
		NetworkFailure,
	}
	impl ScriptedReply {
		/// Builds a JSON reply.
		pub fn json(status: u16, body: serde_json::Value) -> Self {
			Self::Respond { status, body: body.to_string() }
		}
	}

	/// Transport that replays queued replies in order and records every request it saw.
	///
	/// Once the queue is drained the last reply is repeated.
	#[derive(Clone, Debug, Default)]
	pub struct ScriptedTransport {
		replies: Arc<Mutex<Vec<ScriptedReply>>>,
		seen: Arc<Mutex<Vec<RecordedRequest>>>,
	}
	impl ScriptedTransport {
		/// Creates a transport that answers with `replies` in order.
		pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
			let mut replies = replies.into_iter().collect::<Vec<_>>();

			replies.reverse();

			Self { replies: Arc::new(Mutex::new(replies)), seen: Default::default() }
		}

		/// Requests observed so far.
		pub fn requests(&self) -> Vec<RecordedRequest> {
			self.seen.lock().clone()
		}

		fn next_reply(&self) -> ScriptedReply {
			let mut replies = self.replies.lock();

			if replies.len() > 1 {
				replies.pop().unwrap_or(ScriptedReply::NetworkFailure)
			} else {
				replies.last().cloned().unwrap_or(ScriptedReply::NetworkFailure)
			}
		}
	}
	impl HttpTransport for ScriptedTransport {
		fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
			Box::pin(async move {
				self.seen.lock().push(RecordedRequest::from(&request));

				match self.next_reply() {
					ScriptedReply::Respond { status, body } => {
						let mut response = HttpResponse::new(body.into_bytes());

						*response.status_mut() =
							http::StatusCode::from_u16(status).map_err(TransportError::network)?;

						Ok(response)
					},
					ScriptedReply::NetworkFailure => Err(TransportError::network(
						std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
					)),
				}
			})
		}
	}

	/// Snapshot of a request captured by [`ScriptedTransport`].
	#[derive(Clone, Debug)]
	pub struct RecordedRequest {
		/// Request method.
		pub method: String,
		/// Absolute request URL.
		pub url: String,
		/// Header pairs with lowercase names.
		pub headers: BTreeMap<String, String>,
	}
	impl RecordedRequest {
		/// Returns the header value, if present.
		pub fn header(&self, name: &str) -> Option<&str> {
			self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
		}
	}
	impl From<&HttpRequest> for RecordedRequest {
		fn from(request: &HttpRequest) -> Self {
			let headers = request
				.headers()
				.iter()
				.filter_map(|(name, value)| {
					value.to_str().ok().map(|value| (name.as_str().to_owned(), value.to_owned()))
				})
				.collect();

			Self { method: request.method().to_string(), url: request.uri().to_string(), headers }
		}
	}

	/// Builds a [`Beds24Client`] pointed at `base_url` that talks through `transport`.
	pub fn build_scripted_client(
		base_url: &str,
		token: &str,
		transport: ScriptedTransport,
	) -> Beds24Client<ScriptedTransport> {
		let options = Beds24ClientOptions::new()
			.base_url(Url::parse(base_url).expect("Failed to parse scripted base URL."))
			.token(token);

		Beds24Client::with_transport(options, Arc::new(transport))
			.expect("Failed to build scripted Beds24 client.")
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{ConfigError, DecodeError, Error, Result, TransportError};
}

pub use http;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
