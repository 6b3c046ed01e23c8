//! Five-minute credit budget reported by Beds24 on every response.

// crates.io
use http::HeaderMap;
// self
use crate::_prelude::*;

/// Header carrying the credit limit for the current five-minute window.
pub const LIMIT_HEADER: &str = "x-fivemincreditlimit";
/// Header carrying the credits left in the current window.
pub const REMAINING_HEADER: &str = "x-fivemincreditlimit-remaining";
/// Header carrying the seconds until the window resets.
pub const RESETS_IN_HEADER: &str = "x-fivemincreditlimit-resetsin";
/// Header carrying the credit cost of the request that produced the response.
pub const REQUEST_COST_HEADER: &str = "x-requestcost";

/// Rate-limit snapshot derived from a single response.
///
/// Every field is optional: a header that is absent or not an integer leaves its field empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimit {
	/// Credits available per five-minute window.
	pub limit: Option<i64>,
	/// Credits left in the current window.
	pub remaining: Option<i64>,
	/// Seconds until the window resets.
	pub resets_in_seconds: Option<i64>,
	/// Credits charged for the request.
	pub request_cost: Option<i64>,
}
impl RateLimit {
	/// Parses the rate-limit headers out of `headers`.
	pub fn from_headers(headers: &HeaderMap) -> Self {
		Self {
			limit: header_int(headers, LIMIT_HEADER),
			remaining: header_int(headers, REMAINING_HEADER),
			resets_in_seconds: header_int(headers, RESETS_IN_HEADER),
			request_cost: header_int(headers, REQUEST_COST_HEADER),
		}
	}

	/// Time until the window resets, when reported.
	pub fn resets_in(&self) -> Option<Duration> {
		self.resets_in_seconds.map(Duration::seconds)
	}

	/// Instant the window resets, anchored at `observed_at`.
	pub fn resets_at(&self, observed_at: OffsetDateTime) -> Option<OffsetDateTime> {
		self.resets_in().and_then(|delta| observed_at.checked_add(delta))
	}

	/// Whether the server reported no credits left.
	pub fn is_exhausted(&self) -> bool {
		matches!(self.remaining, Some(remaining) if remaining <= 0)
	}

	/// Whether none of the rate-limit headers were present.
	pub fn is_empty(&self) -> bool {
		*self == Self::default()
	}
}

/// Parses the rate-limit headers out of `headers`.
pub fn parse_rate_limit_headers(headers: &HeaderMap) -> RateLimit {
	RateLimit::from_headers(headers)
}

fn header_int(headers: &HeaderMap, name: &str) -> Option<i64> {
	let raw = headers.get(name)?.to_str().ok()?.trim();

	raw.parse::<i64>().ok()
}
