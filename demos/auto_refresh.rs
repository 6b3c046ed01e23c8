//! Demonstrates wrapping a reqwest-backed client with the refresh decorator against a mock
//! Beds24 server whose first access token has already expired.

// std
use std::{sync::Arc, time::Duration};
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use beds24_client::{
	client::{Beds24Client, Beds24ClientOptions, RequestClient, RequestOptions},
	refresh::AutoRefreshClient,
	transport::ReqwestTransport,
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let _expired = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v2/properties").header("token", "expired-token");
			then.status(401).json_body(json!({ "success": false, "error": "Token expired" }));
		})
		.await;
	let _fresh = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v2/properties").header("token", "fresh-token");
			then.status(200)
				.header("X-FiveMinCreditLimit", "100")
				.header("X-FiveMinCreditLimit-Remaining", "99")
				.header("X-RequestCost", "1")
				.json_body(json!({ "success": true, "data": [{ "id": 1, "name": "Harbour" }] }));
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v2/authentication/token");
			then.status(200).json_body(json!({ "token": "fresh-token", "expiresIn": 86400 }));
		})
		.await;
	let transport = Arc::new(ReqwestTransport::with_timeout(Duration::from_secs(10))?);
	let options = Beds24ClientOptions::new()
		.base_url(Url::parse(&server.url("/api/v2"))?)
		.token("expired-token");
	let inner = Arc::new(Beds24Client::with_transport(options, Arc::clone(&transport))?);
	let client = AutoRefreshClient::new(inner, "demo-refresh-token", transport).with_token_callback(
		|token| println!("Persisting rotated access token ({} bytes).", token.len()),
	);
	let result = client.get("/properties", RequestOptions::new()).await?;

	println!("Status after transparent refresh: {}.", result.status());
	println!("Rate limit snapshot: {:?}.", result.rate_limit());
	println!("Payload: {}.", result.data().cloned().unwrap_or_default());
	println!("Refresh endpoint hits: {}.", refresh.calls_async().await);

	Ok(())
}
