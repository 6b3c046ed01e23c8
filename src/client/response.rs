//! Call results: a success payload or an error body, each with the response attached.

// crates.io
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, client::Verb, rate_limit::RateLimit, transport::HttpResponse};

/// Response metadata attached to every [`ApiResult`].
#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response headers.
	pub headers: HeaderMap,
	/// Final request URL.
	pub url: Url,
	/// Instant the response was received.
	pub received_at: OffsetDateTime,
}
impl ApiResponse {
	/// Whether the status is 2xx.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Whether the status signals a rejected credential (401 or 403).
	pub fn is_auth_failure(&self) -> bool {
		matches!(self.status, 401 | 403)
	}

	/// Rate-limit headers carried by this response.
	pub fn rate_limit(&self) -> RateLimit {
		RateLimit::from_headers(&self.headers)
	}
}

/// Outcome of a call.
#[derive(Clone, Debug, PartialEq)]
pub enum ApiResult<T = serde_json::Value> {
	/// 2xx response with its decoded body (`null` when the body is empty).
	Data {
		/// Decoded payload.
		data: T,
		/// Originating response.
		response: ApiResponse,
	},
	/// Non-2xx response with its body (JSON when parseable, otherwise the raw text).
	Error {
		/// Error payload.
		error: serde_json::Value,
		/// Originating response.
		response: ApiResponse,
	},
}
impl<T> ApiResult<T> {
	/// Originating response.
	pub fn response(&self) -> &ApiResponse {
		match self {
			Self::Data { response, .. } | Self::Error { response, .. } => response,
		}
	}

	/// HTTP status code.
	pub fn status(&self) -> u16 {
		self.response().status
	}

	/// Whether this is an [`ApiResult::Error`].
	pub fn is_error(&self) -> bool {
		matches!(self, Self::Error { .. })
	}

	/// Whether this is an error carrying status 401 or 403.
	pub fn is_auth_failure(&self) -> bool {
		matches!(self, Self::Error { response, .. } if response.is_auth_failure())
	}

	/// Success payload, if any.
	pub fn data(&self) -> Option<&T> {
		match self {
			Self::Data { data, .. } => Some(data),
			Self::Error { .. } => None,
		}
	}

	/// Error payload, if any.
	pub fn error(&self) -> Option<&serde_json::Value> {
		match self {
			Self::Data { .. } => None,
			Self::Error { error, .. } => Some(error),
		}
	}

	/// Consumes the result, keeping only the success payload.
	pub fn into_data(self) -> Option<T> {
		match self {
			Self::Data { data, .. } => Some(data),
			Self::Error { .. } => None,
		}
	}

	/// Rate-limit headers carried by the response.
	pub fn rate_limit(&self) -> RateLimit {
		self.response().rate_limit()
	}
}
impl ApiResult {
	/// Re-types the success payload; error results pass through untouched.
	pub fn decode<U>(self) -> Result<ApiResult<U>>
	where
		U: DeserializeOwned,
	{
		match self {
			Self::Data { data, response } => {
				let data = serde_path_to_error::deserialize(data).map_err(|source| {
					DecodeError::ResponseBody { source, status: Some(response.status) }
				})?;

				Ok(ApiResult::Data { data, response })
			},
			Self::Error { error, response } => Ok(ApiResult::Error { error, response }),
		}
	}

	pub(crate) fn from_response(
		verb: Verb,
		url: Url,
		response: HttpResponse,
	) -> Result<Self, DecodeError> {
		let (parts, body) = response.into_parts();
		let meta = ApiResponse {
			status: parts.status.as_u16(),
			headers: parts.headers,
			url,
			received_at: OffsetDateTime::now_utc(),
		};

		if !parts.status.is_success() {
			return Ok(Self::Error { error: error_body(&body), response: meta });
		}

		let bodiless =
			body.is_empty() || verb == Verb::Head || parts.status == StatusCode::NO_CONTENT;
		let data = if bodiless {
			serde_json::Value::Null
		} else {
			from_json_slice(&body)
				.map_err(|source| DecodeError::ResponseBody { source, status: Some(meta.status) })?
		};

		Ok(Self::Data { data, response: meta })
	}
}

/// Parses one complete JSON document, rejecting trailing bytes after it.
pub(crate) fn from_json_slice<T>(
	body: &[u8],
) -> Result<T, serde_path_to_error::Error<serde_json::Error>>
where
	T: DeserializeOwned,
{
	let mut de = serde_json::Deserializer::from_slice(body);
	let value = serde_path_to_error::deserialize(&mut de)?;

	de.end().map_err(|e| {
		serde_path_to_error::Error::new(serde_path_to_error::Track::new().path(), e)
	})?;

	Ok(value)
}

fn error_body(body: &[u8]) -> serde_json::Value {
	if body.is_empty() {
		return serde_json::Value::Null;
	}

	serde_json::from_slice(body)
		.unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(body).into_owned()))
}
