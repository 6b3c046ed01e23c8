//! Credential pair attached to every Beds24 request.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Header carrying the access token.
pub const TOKEN_HEADER: &str = "token";
/// Header carrying the organization identifier.
pub const ORGANIZATION_HEADER: &str = "organization";

/// Access token plus optional organization, as sent in the `token` and `organization` headers.
///
/// Both halves are optional; a missing half simply omits its header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credentials {
	/// Short-lived access token.
	pub token: Option<TokenSecret>,
	/// Organization identifier for multi-account setups.
	pub organization: Option<String>,
}
impl Credentials {
	/// Creates credentials carrying only an access token.
	pub fn with_token(token: impl Into<TokenSecret>) -> Self {
		Self { token: Some(token.into()), organization: None }
	}

	/// Sets the organization identifier.
	pub fn organization(mut self, organization: impl Into<String>) -> Self {
		self.organization = Some(organization.into());

		self
	}

	/// Header pairs derived from the credentials, in send order.
	pub fn header_pairs(&self) -> impl Iterator<Item = (&'static str, &str)> {
		let token = self.token.as_ref().map(|token| (TOKEN_HEADER, token.expose()));
		let organization = self.organization.as_deref().map(|org| (ORGANIZATION_HEADER, org));

		token.into_iter().chain(organization)
	}
}
