//! Client configuration and the builder that validates it.

// crates.io
use http::{HeaderName, HeaderValue};
// self
use crate::{
	_prelude::*,
	auth::{Credentials, TokenSecret},
};

/// Production Beds24 API v2 endpoint.
pub const DEFAULT_BASE_URL: &str = "https://beds24.com/api/v2";

/// Configuration owned by a [`Beds24Client`](crate::client::Beds24Client).
///
/// Clients hand out owned copies through
/// [`RequestClient::config`](crate::client::RequestClient::config); editing a copy never
/// touches the client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
	/// Base URL every request path is appended to.
	pub base_url: Url,
	/// Extra headers sent with every request.
	pub headers: BTreeMap<String, String>,
	/// Credential headers.
	pub auth: Credentials,
}

/// Builder for [`ClientConfig`] values.
#[derive(Clone, Debug, Default)]
pub struct Beds24ClientOptions {
	/// Base URL override; defaults to [`DEFAULT_BASE_URL`].
	pub base_url: Option<Url>,
	/// Extra headers sent with every request.
	pub headers: BTreeMap<String, String>,
	/// Initial credentials.
	pub auth: Credentials,
}
impl Beds24ClientOptions {
	/// Creates a builder targeting the production API without credentials.
	pub fn new() -> Self {
		Self::default()
	}

	/// Overrides the base URL.
	pub fn base_url(mut self, url: Url) -> Self {
		self.base_url = Some(url);

		self
	}

	/// Sets the initial access token.
	pub fn token(mut self, token: impl Into<TokenSecret>) -> Self {
		self.auth.token = Some(token.into());

		self
	}

	/// Sets the initial organization identifier.
	pub fn organization(mut self, organization: impl Into<String>) -> Self {
		self.auth.organization = Some(organization.into());

		self
	}

	/// Replaces both credential halves.
	pub fn auth(mut self, credentials: Credentials) -> Self {
		self.auth = credentials;

		self
	}

	/// Adds a header sent with every request.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let base_url = match self.base_url {
			Some(url) => url,
			None => Url::parse(DEFAULT_BASE_URL)
				.map_err(|source| ConfigError::InvalidBaseUrl { source })?,
		};

		validate_base_url(&base_url)?;

		for (name, value) in &self.headers {
			validate_header(name, value)?;
		}

		Ok(ClientConfig { base_url, headers: self.headers, auth: self.auth })
	}
}

fn validate_base_url(url: &Url) -> Result<(), ConfigError> {
	if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
		Err(ConfigError::UnsupportedBaseUrl { url: url.to_string() })
	} else {
		Ok(())
	}
}

fn validate_header(name: &str, value: &str) -> Result<(), ConfigError> {
	let valid =
		HeaderName::from_bytes(name.as_bytes()).is_ok() && HeaderValue::from_str(value).is_ok();

	if valid { Ok(()) } else { Err(ConfigError::InvalidHeader { name: name.to_owned() }) }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn defaults_target_production_api() {
		let config = Beds24ClientOptions::new().build().expect("Default options should build.");

		assert_eq!(config.base_url.as_str(), DEFAULT_BASE_URL);
		assert!(config.headers.is_empty());
		assert_eq!(config.auth, Credentials::default());
	}

	#[test]
	fn builder_rejects_unusable_urls_and_headers() {
		let err = Beds24ClientOptions::new()
			.base_url(Url::parse("mailto:ops@example.com").expect("Fixture URL should parse."))
			.build()
			.expect_err("Non-HTTP base URLs should be rejected.");

		assert!(matches!(err, ConfigError::UnsupportedBaseUrl { .. }));

		let err = Beds24ClientOptions::new()
			.header("bad header", "value")
			.build()
			.expect_err("Header names with spaces should be rejected.");

		assert!(matches!(err, ConfigError::InvalidHeader { name } if name == "bad header"));
	}

	#[test]
	fn builder_keeps_credentials_and_headers() {
		let config = Beds24ClientOptions::new()
			.token("t-1")
			.organization("org-1")
			.header("x-app", "channel-manager")
			.build()
			.expect("Options with credentials should build.");

		assert_eq!(config.auth, Credentials::with_token("t-1").organization("org-1"));
		assert_eq!(config.headers.get("x-app").map(String::as_str), Some("channel-manager"));
	}
}
