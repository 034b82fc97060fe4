//! Tiered credential resolution for the primary provider.
//!
//! OpenSky offers three access tiers with different rate limits:
//!
//! 1. OAuth2 token exchange (client-credentials grant, form-encoded POST)
//! 2. Basic auth with account username/password
//! 3. Anonymous access
//!
//! Resolution walks the tiers in that order and falls through on any
//! failure (network, non-2xx, malformed response) rather than failing the
//! request. Resolved once per request; never cached across requests.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tracing::{info, warn};

use super::http::{AsyncHttpClient, BoundedRequester};
use crate::config::OpenSkySettings;

/// The authentication tier selected for this request.
#[derive(Debug, Clone, PartialEq)]
pub enum CredentialTier {
    /// OAuth2 bearer token from the client-credentials exchange.
    Bearer(String),
    /// Static account credentials sent as HTTP basic auth.
    Basic { username: String, password: String },
    /// No credentials; lowest rate limit.
    Anonymous,
}

impl CredentialTier {
    /// Headers this tier adds to primary-provider requests.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        match self {
            CredentialTier::Bearer(token) => {
                vec![("Authorization", format!("Bearer {}", token))]
            }
            CredentialTier::Basic { username, password } => {
                let encoded = BASE64.encode(format!("{}:{}", username, password));
                vec![("Authorization", format!("Basic {}", encoded))]
            }
            CredentialTier::Anonymous => Vec::new(),
        }
    }

    /// Tier name for diagnostics and the response status block.
    pub fn name(&self) -> &'static str {
        match self {
            CredentialTier::Bearer(_) => "bearer",
            CredentialTier::Basic { .. } => "basic",
            CredentialTier::Anonymous => "anonymous",
        }
    }
}

/// Selects exactly one usable tier for this request.
///
/// Never fails: the worst case is [`CredentialTier::Anonymous`].
pub async fn resolve_credentials<C: AsyncHttpClient>(
    requester: &BoundedRequester<C>,
    settings: &OpenSkySettings,
) -> CredentialTier {
    if let (Some(client_id), Some(client_secret)) =
        (settings.client_id.as_deref(), settings.client_secret.as_deref())
    {
        match exchange_token(requester, &settings.token_url, client_id, client_secret).await {
            Some(token) => {
                info!(tier = "bearer", "credential tier selected");
                return CredentialTier::Bearer(token);
            }
            None => {
                warn!("token exchange failed, falling through to next tier");
            }
        }
    }

    if let (Some(username), Some(password)) =
        (settings.username.clone(), settings.password.clone())
    {
        info!(tier = "basic", "credential tier selected");
        return CredentialTier::Basic { username, password };
    }

    info!(tier = "anonymous", "credential tier selected");
    CredentialTier::Anonymous
}

/// Runs the client-credentials grant and extracts the access token.
async fn exchange_token<C: AsyncHttpClient>(
    requester: &BoundedRequester<C>,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
) -> Option<String> {
    let form = [
        ("grant_type", "client_credentials"),
        ("client_id", client_id),
        ("client_secret", client_secret),
    ];

    match requester.post_form_json(token_url, &form).await {
        Ok(body) => match body.get("access_token").and_then(|t| t.as_str()) {
            Some(token) if !token.is_empty() => Some(token.to_string()),
            _ => {
                warn!("token response carried no access_token");
                None
            }
        },
        Err(e) => {
            warn!(error = %e, "token exchange request failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetrySettings;
    use crate::provider::http::tests::MockAsyncHttpClient;
    use crate::provider::ProviderError;

    fn settings_with_oauth() -> OpenSkySettings {
        OpenSkySettings {
            client_id: Some("client".to_string()),
            client_secret: Some("secret".to_string()),
            username: Some("user".to_string()),
            password: Some("pass".to_string()),
            ..OpenSkySettings::default()
        }
    }

    fn requester(client: MockAsyncHttpClient) -> BoundedRequester<MockAsyncHttpClient> {
        BoundedRequester::new(client, RetrySettings::default())
    }

    #[tokio::test]
    async fn token_exchange_wins_when_it_succeeds() {
        let client = MockAsyncHttpClient::ok(200, r#"{"access_token": "tok123"}"#);
        let tier = resolve_credentials(&requester(client), &settings_with_oauth()).await;
        assert_eq!(tier, CredentialTier::Bearer("tok123".to_string()));
        assert_eq!(
            tier.headers(),
            vec![("Authorization", "Bearer tok123".to_string())]
        );
    }

    #[tokio::test]
    async fn failed_exchange_falls_through_to_basic() {
        let client = MockAsyncHttpClient::new(Err(ProviderError::Http {
            status: 401,
            snippet: "bad client".to_string(),
        }));
        let tier = resolve_credentials(&requester(client), &settings_with_oauth()).await;
        assert_eq!(tier.name(), "basic");
    }

    #[tokio::test]
    async fn malformed_token_response_falls_through() {
        let client = MockAsyncHttpClient::ok(200, r#"{"unexpected": true}"#);
        let tier = resolve_credentials(&requester(client), &settings_with_oauth()).await;
        assert_eq!(tier.name(), "basic");
    }

    #[tokio::test]
    async fn no_credentials_resolves_anonymous() {
        let client = MockAsyncHttpClient::ok(200, "{}");
        let tier = resolve_credentials(&requester(client), &OpenSkySettings::default()).await;
        assert_eq!(tier, CredentialTier::Anonymous);
        assert!(tier.headers().is_empty());
    }

    #[tokio::test]
    async fn basic_only_skips_the_exchange() {
        let client = MockAsyncHttpClient::ok(200, r#"{"access_token": "tok"}"#);
        let settings = OpenSkySettings {
            username: Some("user".to_string()),
            password: Some("pass".to_string()),
            ..OpenSkySettings::default()
        };
        let tier = resolve_credentials(&requester(client.clone()), &settings).await;
        assert_eq!(tier.name(), "basic");
        assert_eq!(client.call_count(), 0);
    }

    #[test]
    fn basic_header_is_base64_of_user_colon_pass() {
        let tier = CredentialTier::Basic {
            username: "user".to_string(),
            password: "pass".to_string(),
        };
        // "user:pass" -> dXNlcjpwYXNz
        assert_eq!(
            tier.headers(),
            vec![("Authorization", "Basic dXNlcjpwYXNz".to_string())]
        );
    }
}
