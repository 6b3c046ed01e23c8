//! Credentials sent to Beds24 and the redacting wrapper that keeps them out of logs.

pub mod credentials;
pub mod secret;

pub use credentials::*;
pub use secret::*;
