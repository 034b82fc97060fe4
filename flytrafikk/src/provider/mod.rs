//! Data provider abstraction.
//!
//! Every provider is generic over [`AsyncHttpClient`] so tests can inject
//! mock clients, and every outbound call goes through the
//! [`BoundedRequester`] retry/timeout policy.
//!
//! - [`OpenSkyProvider`]: primary surveillance snapshots (auth-tiered)
//! - [`AeroDataBoxProvider`]: secondary per-flight metadata lookups
//! - [`AirLabsProvider`]: fallback live flights when the primary is down

mod aerodatabox;
mod airlabs;
mod auth;
mod http;
mod opensky;
mod types;

pub use aerodatabox::{AeroDataBoxProvider, FlightRecord};
pub use airlabs::{AirLabsFlight, AirLabsProvider};
pub use auth::{resolve_credentials, CredentialTier};
pub use http::{AsyncHttpClient, BoundedRequester, HttpResponse, ReqwestClient};
pub use opensky::OpenSkyProvider;
pub use types::ProviderError;

#[cfg(test)]
pub use http::tests::{MockAsyncHttpClient, SequenceHttpClient};
