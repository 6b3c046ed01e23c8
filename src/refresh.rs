//! Refresh-and-retry decorator for expired access tokens.
//!
//! [`AutoRefreshClient`] wraps any [`RequestClient`] and intercepts every verb call. When the
//! wrapped client answers with 401 or 403, the decorator asks Beds24 for a new access token
//! through its own transport, installs it on the wrapped client, notifies the optional callback,
//! and replays the original call exactly once. A refresh that fails for any reason is logged and
//! the caller sees the original authentication error, so the decorator never adds an error shape
//! of its own to the verb path.
//!
//! Concurrent calls that hit an expired token refresh independently; the last token written wins.

mod metrics;

pub use metrics::{RefreshCounts, RefreshMetrics};

// crates.io
use http::{HeaderValue, Method, header::ACCEPT};
// self
use crate::{
	_prelude::*,
	auth::{Credentials, TokenSecret},
	client::{self, CallFuture, ClientConfig, RequestClient, RequestOptions, Verb},
	obs::{self, CallSpan, RefreshOutcome},
	transport::{HttpRequest, HttpTransport},
};

/// Path of the token refresh endpoint, relative to the client's base URL.
pub const REFRESH_PATH: &str = "/authentication/token";
/// Header carrying the refresh token.
pub const REFRESH_TOKEN_HEADER: &str = "refreshToken";

/// Callback invoked with every newly issued access token.
pub type TokenUpdateCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Failures of a single refresh attempt.
#[derive(Debug, ThisError)]
pub enum RefreshError {
	/// Refresh request could not be assembled.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Refresh request never produced a response.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Refresh endpoint answered with a non-2xx status.
	#[error("Refresh endpoint rejected the refresh token with HTTP {status}.")]
	Rejected {
		/// HTTP status code.
		status: u16,
	},
	/// Refresh endpoint answered with a body that is not the expected JSON.
	#[error("Refresh endpoint returned malformed JSON.")]
	Decode {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Refresh endpoint answered 2xx without a usable `token`.
	#[error("Refresh endpoint response did not include a token.")]
	MissingToken,
}
impl RefreshError {
	/// Whether the failure is a fault (transport, request construction, decoding) rather than a
	/// well-formed refusal from the server.
	pub fn is_unexpected(&self) -> bool {
		matches!(self, Self::Config(_) | Self::Transport(_) | Self::Decode { .. })
	}
}

/// Access token issued by the refresh endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefreshedToken {
	/// New access token.
	pub token: TokenSecret,
	/// Lifetime reported by the server, if any.
	pub expires_in: Option<Duration>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
	#[serde(default)]
	token: Option<TokenSecret>,
	#[serde(default)]
	expires_in: Option<i64>,
}

/// Decorator that adds automatic access-token refresh to a [`RequestClient`].
///
/// The decorator implements [`RequestClient`] itself, so it can stand in wherever the wrapped
/// client is used. Only [`call`](RequestClient::call), and therefore every verb helper, is
/// intercepted; the configuration accessors and credential mutators forward unchanged.
pub struct AutoRefreshClient<C, T>
where
	C: ?Sized + RequestClient,
	T: ?Sized + HttpTransport,
{
	inner: Arc<C>,
	transport: Arc<T>,
	refresh_token: TokenSecret,
	on_token_update: Option<TokenUpdateCallback>,
	metrics: Arc<RefreshMetrics>,
}
impl<C, T> AutoRefreshClient<C, T>
where
	C: ?Sized + RequestClient,
	T: ?Sized + HttpTransport,
{
	/// Wraps `inner`, refreshing through `transport` with `refresh_token`.
	///
	/// `transport` is used only for refresh requests, never for the wrapped client's calls.
	pub fn new(inner: Arc<C>, refresh_token: impl Into<TokenSecret>, transport: Arc<T>) -> Self {
		Self {
			inner,
			transport,
			refresh_token: refresh_token.into(),
			on_token_update: None,
			metrics: Default::default(),
		}
	}

	/// Registers a callback invoked synchronously with every new access token, e.g. to persist
	/// it.
	pub fn with_token_callback<F>(mut self, callback: F) -> Self
	where
		F: 'static + Fn(&str) + Send + Sync,
	{
		self.on_token_update = Some(Arc::new(callback));

		self
	}

	/// Wrapped client.
	pub fn inner(&self) -> &Arc<C> {
		&self.inner
	}

	/// Refresh counters for this decorator and its clones.
	pub fn metrics(&self) -> &RefreshMetrics {
		&self.metrics
	}

	/// Requests a new access token and installs it on the wrapped client.
	///
	/// On success the wrapped client's token is replaced and the callback (if any) runs before
	/// this returns. On failure nothing is mutated.
	pub async fn refresh_access_token(&self) -> Result<RefreshedToken, RefreshError> {
		let outcome = self.request_new_token().await;

		self.metrics.record_refresh(&outcome);

		let refreshed = outcome?;

		self.inner.set_token(refreshed.token.clone());

		if let Some(callback) = &self.on_token_update {
			callback(refreshed.token.expose());
		}

		Ok(refreshed)
	}

	async fn request_new_token(&self) -> Result<RefreshedToken, RefreshError> {
		let request = self.refresh_request()?;
		let response = self.transport.execute(request).await?;

		if !response.status().is_success() {
			return Err(RefreshError::Rejected { status: response.status().as_u16() });
		}

		let body: RefreshResponse = client::response::from_json_slice(response.body())
			.map_err(|source| RefreshError::Decode { source })?;
		let token = body
			.token
			.filter(|token| !token.is_empty())
			.ok_or(RefreshError::MissingToken)?;

		Ok(RefreshedToken { token, expires_in: body.expires_in.map(Duration::seconds) })
	}

	fn refresh_request(&self) -> Result<HttpRequest, ConfigError> {
		let url = client::request::join_endpoint(
			&self.inner.base_url(),
			REFRESH_PATH,
			&BTreeMap::new(),
			&[],
		)?;
		let mut refresh_token = HeaderValue::from_str(self.refresh_token.expose())
			.map_err(|_| ConfigError::InvalidHeader { name: REFRESH_TOKEN_HEADER.into() })?;

		refresh_token.set_sensitive(true);

		let request = http::Request::builder()
			.method(Method::GET)
			.uri(url.as_str())
			.header(REFRESH_TOKEN_HEADER, refresh_token)
			.header(ACCEPT, HeaderValue::from_static("application/json"))
			.body(Vec::new())?;

		Ok(request)
	}
}
impl<C, T> RequestClient for AutoRefreshClient<C, T>
where
	C: ?Sized + RequestClient,
	T: ?Sized + HttpTransport,
{
	fn call<'a>(&'a self, verb: Verb, path: &'a str, options: RequestOptions) -> CallFuture<'a> {
		let span = CallSpan::new(verb, "call");

		Box::pin(span.instrument(async move {
			let result = self.inner.call(verb, path, options.clone()).await;
			let auth_failure = result.as_ref().ok().filter(|outcome| outcome.is_auth_failure());
			let Some(status) = auth_failure.map(|outcome| outcome.status()) else {
				return result;
			};

			obs::record_refresh_outcome(verb, RefreshOutcome::Attempt);

			match self.refresh_access_token().await {
				Ok(_) => {
					obs::record_refresh_outcome(verb, RefreshOutcome::Success);
					obs::log_token_rotated(verb, status);

					let replay = self.inner.call(verb, path, options).await;

					self.metrics.record_replay(&replay);

					replay
				},
				Err(err) => {
					obs::record_refresh_outcome(verb, RefreshOutcome::Failure);
					obs::log_refresh_failure(verb, status, &err);

					result
				},
			}
		}))
	}

	fn base_url(&self) -> Url {
		self.inner.base_url()
	}

	fn set_token(&self, token: TokenSecret) {
		self.inner.set_token(token);
	}

	fn set_organization(&self, organization: Option<String>) {
		self.inner.set_organization(organization);
	}

	fn set_auth(&self, credentials: Credentials) {
		self.inner.set_auth(credentials);
	}

	fn config(&self) -> ClientConfig {
		self.inner.config()
	}
}
impl<C, T> Clone for AutoRefreshClient<C, T>
where
	C: ?Sized + RequestClient,
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
			transport: Arc::clone(&self.transport),
			refresh_token: self.refresh_token.clone(),
			on_token_update: self.on_token_update.clone(),
			metrics: Arc::clone(&self.metrics),
		}
	}
}
impl<C, T> Debug for AutoRefreshClient<C, T>
where
	C: ?Sized + RequestClient,
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AutoRefreshClient")
			.field("base_url", &self.inner.base_url().as_str())
			.field("refresh_token", &self.refresh_token)
			.field("callback_set", &self.on_token_update.is_some())
			.field("metrics", &self.metrics)
			.finish()
	}
}
