//! Demonstrates plugging a custom [`HttpTransport`] into both the client and the refresh
//! decorator without the reqwest feature.
//!
//! The transport below serves canned Beds24 answers from memory: the first access token is
//! rejected, the refresh endpoint issues a new one, and the replayed call succeeds.

// std
use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};
// crates.io
use color_eyre::Result;
use serde_json::json;
// self
use beds24_client::{
	client::{Beds24Client, Beds24ClientOptions, RequestClient, RequestOptions},
	error::TransportError,
	http::StatusCode,
	refresh::{AutoRefreshClient, REFRESH_PATH},
	transport::{HttpRequest, HttpResponse, HttpTransport, TransportFuture},
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let transport = Arc::new(InMemoryBeds24::default());
	let options = Beds24ClientOptions::new()
		.base_url(Url::parse("https://beds24.invalid/api/v2")?)
		.token("stale");
	let inner = Arc::new(Beds24Client::with_transport(options, Arc::clone(&transport))?);
	let client =
		AutoRefreshClient::new(Arc::clone(&inner), "refresh-1", Arc::clone(inner.transport()));
	let result = client
		.get("/bookings/{bookingId}", RequestOptions::new().path_param("bookingId", 7001))
		.await?;

	println!("Final status: {}.", result.status());
	println!("Requests served in memory: {}.", transport.served.load(Ordering::Relaxed));
	println!("Refresh counters: {:?}.", client.metrics().snapshot());

	Ok(())
}

#[derive(Debug, Default)]
struct InMemoryBeds24 {
	served: AtomicUsize,
}
impl InMemoryBeds24 {
	fn answer(request: &HttpRequest) -> Result<HttpResponse, TransportError> {
		let token = request.headers().get("token").and_then(|value| value.to_str().ok());
		let (status, body) = if request.uri().path().ends_with(REFRESH_PATH) {
			(StatusCode::OK, json!({ "token": "fresh", "expiresIn": 86400 }))
		} else if token == Some("fresh") {
			let booking = json!({ "id": 7001, "status": "confirmed" });

			(StatusCode::OK, json!({ "success": true, "data": [booking] }))
		} else {
			(StatusCode::UNAUTHORIZED, json!({ "success": false, "error": "Token expired" }))
		};
		let mut response = HttpResponse::new(body.to_string().into_bytes());

		*response.status_mut() = status;

		Ok(response)
	}
}
impl HttpTransport for InMemoryBeds24 {
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			self.served.fetch_add(1, Ordering::Relaxed);

			Self::answer(&request)
		})
	}
}
