//! Qroom HTTP client
//!
//! An authenticated client for the Qroom study-group backend. Every call
//! carries the stored access token; expired tokens are refreshed once per
//! expiry and the affected calls are replayed transparently.

pub mod client;
pub mod types;

pub use client::{ApiRequest, ClientError, ClientResult, ClientSettings, QroomClient};
pub use types::ApiEnvelope;
