//! Beds24 request client and the [`RequestClient`] contract the refresh decorator wraps.
//!
//! Every verb call resolves to an [`ApiResult`]: non-2xx responses are data, not errors, so
//! callers (and decorators) can inspect the status and headers of a failed call. The `Err`
//! side of the returned [`Result`] only carries failures that happen before a response exists
//! or while decoding a successful body.

pub mod options;
pub mod request;
pub mod response;

pub use options::*;
pub use request::*;
pub use response::*;

// self
use crate::{
	_prelude::*,
	auth::{Credentials, TokenSecret},
	transport::HttpTransport,
};

/// Boxed future returned by [`RequestClient::call`] and the verb helpers.
pub type CallFuture<'a> = Pin<Box<dyn Future<Output = Result<ApiResult>> + 'a + Send>>;

/// Calling interface shared by [`Beds24Client`] and decorators wrapping it.
///
/// Only [`call`](RequestClient::call) performs I/O; the verb helpers are thin aliases that route
/// through it, so a decorator overriding `call` intercepts every verb at once. The remaining
/// methods are plain accessors and mutators over the client's configuration.
pub trait RequestClient
where
	Self: Send + Sync,
{
	/// Issues `verb` against `path` with the currently configured credentials.
	fn call<'a>(&'a self, verb: Verb, path: &'a str, options: RequestOptions) -> CallFuture<'a>;

	/// Base URL every request path is resolved against.
	fn base_url(&self) -> Url;

	/// Replaces the access token used by subsequent calls.
	fn set_token(&self, token: TokenSecret);

	/// Replaces (or clears) the organization header.
	fn set_organization(&self, organization: Option<String>);

	/// Replaces both credential halves at once.
	fn set_auth(&self, credentials: Credentials);

	/// Owned snapshot of the current configuration.
	fn config(&self) -> ClientConfig;

	/// `GET path`.
	fn get<'a>(&'a self, path: &'a str, options: RequestOptions) -> CallFuture<'a> {
		self.call(Verb::Get, path, options)
	}

	/// `POST path`.
	fn post<'a>(&'a self, path: &'a str, options: RequestOptions) -> CallFuture<'a> {
		self.call(Verb::Post, path, options)
	}

	/// `PUT path`.
	fn put<'a>(&'a self, path: &'a str, options: RequestOptions) -> CallFuture<'a> {
		self.call(Verb::Put, path, options)
	}

	/// `DELETE path`.
	fn delete<'a>(&'a self, path: &'a str, options: RequestOptions) -> CallFuture<'a> {
		self.call(Verb::Delete, path, options)
	}

	/// `PATCH path`.
	fn patch<'a>(&'a self, path: &'a str, options: RequestOptions) -> CallFuture<'a> {
		self.call(Verb::Patch, path, options)
	}

	/// `HEAD path`.
	fn head<'a>(&'a self, path: &'a str, options: RequestOptions) -> CallFuture<'a> {
		self.call(Verb::Head, path, options)
	}

	/// `OPTIONS path`.
	fn options<'a>(&'a self, path: &'a str, options: RequestOptions) -> CallFuture<'a> {
		self.call(Verb::Options, path, options)
	}

	/// `TRACE path`.
	fn trace<'a>(&'a self, path: &'a str, options: RequestOptions) -> CallFuture<'a> {
		self.call(Verb::Trace, path, options)
	}
}

/// Beds24 API client bound to an explicitly injected transport.
///
/// Clones share the same configuration, so a token set through one clone is used by every
/// other clone from its next call on.
pub struct Beds24Client<T>
where
	T: ?Sized + HttpTransport,
{
	transport: Arc<T>,
	state: Arc<RwLock<ClientConfig>>,
}
impl<T> Beds24Client<T>
where
	T: ?Sized + HttpTransport,
{
	/// Validates `options` and binds the resulting configuration to `transport`.
	pub fn with_transport(options: Beds24ClientOptions, transport: Arc<T>) -> Result<Self> {
		let config = options.build()?;

		Ok(Self { transport, state: Arc::new(RwLock::new(config)) })
	}

	/// Transport used for every call.
	pub fn transport(&self) -> &Arc<T> {
		&self.transport
	}
}
impl<T> RequestClient for Beds24Client<T>
where
	T: ?Sized + HttpTransport,
{
	fn call<'a>(&'a self, verb: Verb, path: &'a str, options: RequestOptions) -> CallFuture<'a> {
		Box::pin(async move {
			let config = self.config();
			let (url, request) = request::build_request(&config, verb, path, &options)?;
			let response = self.transport.execute(request).await?;

			Ok(ApiResult::from_response(verb, url, response)?)
		})
	}

	fn base_url(&self) -> Url {
		self.state.read().base_url.clone()
	}

	fn set_token(&self, token: TokenSecret) {
		self.state.write().auth.token = Some(token);
	}

	fn set_organization(&self, organization: Option<String>) {
		self.state.write().auth.organization = organization;
	}

	fn set_auth(&self, credentials: Credentials) {
		self.state.write().auth = credentials;
	}

	fn config(&self) -> ClientConfig {
		self.state.read().clone()
	}
}
impl<T> Clone for Beds24Client<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self { transport: Arc::clone(&self.transport), state: Arc::clone(&self.state) }
	}
}
impl<T> Debug for Beds24Client<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let state = self.state.read();

		f.debug_struct("Beds24Client")
			.field("base_url", &state.base_url.as_str())
			.field("token_set", &state.auth.token.is_some())
			.field("organization", &state.auth.organization)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::_preludet::*;

	#[tokio::test]
	async fn call_attaches_credentials_and_defaults() {
		let transport = ScriptedTransport::new([ScriptedReply::json(
			200,
			serde_json::json!({ "success": true, "data": [] }),
		)]);
		let client = build_scripted_client("https://beds24.test/api/v2", "t-1", transport.clone());

		client.set_organization(Some("org-7".into()));

		let result = client
			.get("/properties", RequestOptions::new().query("includeAllRooms", "true"))
			.await
			.expect("Scripted call should succeed.");

		assert!(!result.is_error());
		assert_eq!(result.status(), 200);

		let seen = transport.requests();

		assert_eq!(seen.len(), 1);
		assert_eq!(seen[0].method, "GET");
		assert_eq!(seen[0].url, "https://beds24.test/api/v2/properties?includeAllRooms=true");
		assert_eq!(seen[0].header("token"), Some("t-1"));
		assert_eq!(seen[0].header("organization"), Some("org-7"));
		assert_eq!(seen[0].header("accept"), Some("application/json"));
	}

	#[tokio::test]
	async fn http_errors_come_back_as_error_results() {
		let transport = ScriptedTransport::new([ScriptedReply::json(
			401,
			serde_json::json!({ "success": false, "error": "Token is missing or invalid" }),
		)]);
		let client = build_scripted_client("https://beds24.test/api/v2", "t-1", transport);
		let result = client
			.post("/bookings", RequestOptions::new().body(serde_json::json!([{ "roomId": 1 }])))
			.await
			.expect("HTTP 401 should not surface as an Err.");

		assert!(result.is_error());
		assert!(result.is_auth_failure());
		assert_eq!(
			result.error().and_then(|body| body.get("error")).and_then(|v| v.as_str()),
			Some("Token is missing or invalid")
		);
	}

	#[tokio::test]
	async fn transport_failures_surface_as_errors() {
		let transport = ScriptedTransport::new([ScriptedReply::NetworkFailure]);
		let client = build_scripted_client("https://beds24.test/api/v2", "t-1", transport);
		let err = client
			.get("/properties", RequestOptions::default())
			.await
			.expect_err("Network failures should surface as Err.");

		assert!(matches!(err, Error::Transport(_)));
	}

	#[test]
	fn mutators_are_visible_through_every_clone() {
		let client = build_scripted_client(
			"https://beds24.test/api/v2",
			"t-1",
			ScriptedTransport::default(),
		);
		let twin = client.clone();

		twin.set_token(TokenSecret::new("t-2"));

		assert_eq!(client.config().auth.token.as_ref().map(TokenSecret::expose), Some("t-2"));

		client.set_auth(Credentials::default());

		assert_eq!(twin.config().auth, Credentials::default());
		assert_eq!(twin.base_url().as_str(), "https://beds24.test/api/v2");
		assert!(Arc::ptr_eq(client.transport(), twin.transport()));
	}

	#[test]
	fn config_snapshot_is_detached() {
		let client = build_scripted_client(
			"https://beds24.test/api/v2",
			"t-1",
			ScriptedTransport::default(),
		);
		let mut snapshot = client.config();

		snapshot.auth.token = None;

		assert!(client.config().auth.token.is_some());
		assert!(!format!("{client:?}").contains("t-1"));
	}
}
