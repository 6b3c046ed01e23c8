//! Verb set, per-call options, and request assembly.

// crates.io
use http::{
	HeaderMap, HeaderName, HeaderValue, Method,
	header::{ACCEPT, CONTENT_TYPE},
};
// self
use crate::{
	_prelude::*,
	auth::Credentials,
	client::ClientConfig,
	transport::HttpRequest,
};

const JSON: &str = "application/json";

/// HTTP verbs exposed as client operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verb {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `DELETE`
	Delete,
	/// `PATCH`
	Patch,
	/// `HEAD`
	Head,
	/// `OPTIONS`
	Options,
	/// `TRACE`
	Trace,
}
impl Verb {
	/// Every verb, in declaration order.
	pub const ALL: [Verb; 8] = [
		Verb::Get,
		Verb::Post,
		Verb::Put,
		Verb::Delete,
		Verb::Patch,
		Verb::Head,
		Verb::Options,
		Verb::Trace,
	];

	/// Returns the upper-case method name, also used as a span and metric label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Verb::Get => "GET",
			Verb::Post => "POST",
			Verb::Put => "PUT",
			Verb::Delete => "DELETE",
			Verb::Patch => "PATCH",
			Verb::Head => "HEAD",
			Verb::Options => "OPTIONS",
			Verb::Trace => "TRACE",
		}
	}

	/// Matching [`Method`].
	pub fn method(self) -> Method {
		match self {
			Verb::Get => Method::GET,
			Verb::Post => Method::POST,
			Verb::Put => Method::PUT,
			Verb::Delete => Method::DELETE,
			Verb::Patch => Method::PATCH,
			Verb::Head => Method::HEAD,
			Verb::Options => Method::OPTIONS,
			Verb::Trace => Method::TRACE,
		}
	}
}
impl Display for Verb {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for Verb {
	type Err = UnknownVerb;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Verb::ALL.into_iter().find(|verb| verb.as_str() == s).ok_or_else(|| UnknownVerb(s.into()))
	}
}

/// Error returned when parsing a name that is not one of the recognized verbs.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("`{0}` is not a recognized HTTP verb.")]
pub struct UnknownVerb(pub String);

/// Arguments for a single call.
///
/// Values are cloneable so a call can be replayed verbatim.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestOptions {
	/// Values substituted into `{name}` placeholders of the path.
	pub path_params: BTreeMap<String, String>,
	/// Query pairs appended in order; repeated keys are allowed.
	pub query: Vec<(String, String)>,
	/// Per-call headers, applied over the client's default headers.
	pub headers: BTreeMap<String, String>,
	/// JSON request body.
	pub body: Option<serde_json::Value>,
}
impl RequestOptions {
	/// Empty options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a path parameter.
	pub fn path_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
		self.path_params.insert(name.into(), value.to_string());

		self
	}

	/// Appends a query pair.
	pub fn query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
		self.query.push((name.into(), value.to_string()));

		self
	}

	/// Adds a per-call header.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());

		self
	}

	/// Sets a JSON body.
	pub fn body(mut self, body: serde_json::Value) -> Self {
		self.body = Some(body);

		self
	}

	/// Serializes `body` and sets it as the JSON body.
	pub fn json<B>(self, body: &B) -> Result<Self, ConfigError>
	where
		B: ?Sized + Serialize,
	{
		let value = serde_json::to_value(body).map_err(ConfigError::BodySerialize)?;

		Ok(self.body(value))
	}
}

/// Joins `path` onto `base`, filling `{name}` placeholders from `params`, and appends `query`.
///
/// Each path segment is percent-encoded on its own, so a parameter value containing `/` stays a
/// single segment.
pub(crate) fn join_endpoint(
	base: &Url,
	path: &str,
	params: &BTreeMap<String, String>,
	query: &[(String, String)],
) -> Result<Url, ConfigError> {
	let mut url = base.clone();
	let relative = path.trim_start_matches('/');

	{
		let mut segments = url
			.path_segments_mut()
			.map_err(|_| ConfigError::UnsupportedBaseUrl { url: base.to_string() })?;

		segments.pop_if_empty();

		if !relative.is_empty() {
			for segment in relative.split('/') {
				segments.push(&expand_segment(segment, path, params)?);
			}
		}
	}

	if !query.is_empty() {
		url.query_pairs_mut().extend_pairs(query);
	}

	Ok(url)
}

/// Assembles the outbound request for one call.
///
/// Header precedence, lowest first: `accept`, client defaults, per-call headers, credentials.
pub(crate) fn build_request(
	config: &ClientConfig,
	verb: Verb,
	path: &str,
	options: &RequestOptions,
) -> Result<(Url, HttpRequest), ConfigError> {
	let url = join_endpoint(&config.base_url, path, &options.path_params, &options.query)?;
	let body = match &options.body {
		Some(value) => serde_json::to_vec(value).map_err(ConfigError::BodySerialize)?,
		None => Vec::new(),
	};
	let mut headers = HeaderMap::new();

	headers.insert(ACCEPT, HeaderValue::from_static(JSON));

	if options.body.is_some() {
		headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
	}
	for (name, value) in config.headers.iter().chain(options.headers.iter()) {
		insert_header(&mut headers, name, value, false)?;
	}

	insert_credentials(&mut headers, &config.auth)?;

	let mut request = HttpRequest::new(body);

	*request.method_mut() = verb.method();
	*request.uri_mut() = url.as_str().parse::<http::Uri>().map_err(http::Error::from)?;
	*request.headers_mut() = headers;

	Ok((url, request))
}

fn insert_credentials(headers: &mut HeaderMap, auth: &Credentials) -> Result<(), ConfigError> {
	for (name, value) in auth.header_pairs() {
		insert_header(headers, name, value, true)?;
	}

	Ok(())
}

fn insert_header(
	headers: &mut HeaderMap,
	name: &str,
	value: &str,
	sensitive: bool,
) -> Result<(), ConfigError> {
	let invalid = || ConfigError::InvalidHeader { name: name.to_owned() };
	let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
	let mut header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;

	header_value.set_sensitive(sensitive);
	headers.insert(header_name, header_value);

	Ok(())
}

fn expand_segment(
	segment: &str,
	template: &str,
	params: &BTreeMap<String, String>,
) -> Result<String, ConfigError> {
	let mut expanded = String::with_capacity(segment.len());
	let mut rest = segment;

	while let Some(open) = rest.find('{') {
		let Some(close) = rest[open..].find('}').map(|offset| open + offset) else {
			break;
		};
		let name = &rest[open + 1..close];
		let value = params.get(name).ok_or_else(|| ConfigError::MissingPathParam {
			path: template.to_owned(),
			name: name.to_owned(),
		})?;

		expanded.push_str(&rest[..open]);
		expanded.push_str(value);

		rest = &rest[close + 1..];
	}

	expanded.push_str(rest);

	Ok(expanded)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::client::Beds24ClientOptions;

	fn config() -> ClientConfig {
		Beds24ClientOptions::new()
			.base_url(Url::parse("https://beds24.test/api/v2/").expect("Fixture URL should parse."))
			.token("t-1")
			.header("x-app", "pms")
			.build()
			.expect("Fixture options should build.")
	}

	#[test]
	fn verbs_round_trip_through_names() {
		for verb in Verb::ALL {
			assert_eq!(verb.as_str().parse::<Verb>(), Ok(verb));
			assert_eq!(verb.method().as_str(), verb.as_str());
		}

		assert_eq!("get".parse::<Verb>(), Err(UnknownVerb("get".into())));
		assert!("config".parse::<Verb>().is_err());
	}

	#[test]
	fn path_params_are_percent_encoded_per_segment() {
		let base = Url::parse("https://beds24.test/api/v2").expect("Fixture URL should parse.");
		let params = RequestOptions::new()
			.path_param("id", 42)
			.path_param("name", "Sea View/2+1")
			.path_params;
		let url = join_endpoint(&base, "/properties/{id}/rooms/{name}", &params, &[])
			.expect("All placeholders have values.");

		assert_eq!(url.path(), "/api/v2/properties/42/rooms/Sea%20View%2F2+1");
		assert_eq!(url.path_segments().map(Iterator::count), Some(6));

		let err = join_endpoint(&base, "/bookings/{bookingId}", &BTreeMap::new(), &[])
			.expect_err("Missing parameters should be rejected.");

		assert!(matches!(err, ConfigError::MissingPathParam { name, .. } if name == "bookingId"));
	}

	#[test]
	fn trailing_slash_on_base_is_not_doubled() {
		let base = Url::parse("https://beds24.test/api/v2/").expect("Fixture URL should parse.");
		let url = join_endpoint(&base, "authentication/token", &BTreeMap::new(), &[])
			.expect("Static paths always join.");

		assert_eq!(url.as_str(), "https://beds24.test/api/v2/authentication/token");
	}

	#[test]
	fn request_carries_body_and_header_precedence() {
		let options = RequestOptions::new()
			.query("id", 1)
			.query("id", 2)
			.header("x-app", "override")
			.header("token", "spoofed")
			.body(serde_json::json!([{ "roomId": 7 }]));
		let (url, request) = build_request(&config(), Verb::Post, "bookings", &options)
			.expect("Request should assemble.");

		assert_eq!(url.as_str(), "https://beds24.test/api/v2/bookings?id=1&id=2");
		assert_eq!(request.method(), Method::POST);
		assert_eq!(request.headers()["x-app"], "override");
		assert_eq!(request.headers()["token"], "t-1");
		assert!(request.headers()["token"].is_sensitive());
		assert_eq!(request.headers()[CONTENT_TYPE], JSON);
		assert_eq!(request.body().as_slice(), b"[{\"roomId\":7}]");
	}

	#[test]
	fn bodiless_requests_skip_content_type() {
		let (_, request) =
			build_request(&config(), Verb::Get, "/properties", &RequestOptions::new())
				.expect("Request should assemble.");

		assert!(request.headers().get(CONTENT_TYPE).is_none());
		assert!(request.body().is_empty());
		assert_eq!(request.uri().to_string(), "https://beds24.test/api/v2/properties");
	}
}
