//! Provider error taxonomy.

use thiserror::Error;

/// Errors surfaced by outbound provider calls.
///
/// The split matters for retry policy: [`ProviderError::is_transient`]
/// covers connection failures, request timeouts and HTTP 429, which the
/// bounded requester retries with backoff. Everything else fails the call
/// immediately and is handled by fallback at a higher level.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// Non-retryable HTTP status (>= 400, excluding 429).
    #[error("HTTP {status}: {snippet}")]
    Http { status: u16, snippet: String },

    /// Connection error, request timeout or rate limiting.
    #[error("transient failure: {0}")]
    Transient(String),

    /// Body that is not the JSON we asked for (HTML error page, parse failure).
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The credential material this provider needs is not configured.
    #[error("missing credentials for {0}")]
    MissingCredentials(&'static str),
}

impl ProviderError {
    /// Whether a retry with backoff is worthwhile.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::Transient(_) | ProviderError::Http { status: 429, .. }
        )
    }
}
