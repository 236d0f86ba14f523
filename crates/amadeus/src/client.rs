//! HTTP client with cached OAuth2 bearer credentials.

use chrono::{NaiveDate, Utc};
use loopfare_core::fingerprint::FilterSet;
use loopfare_core::types::LegQuote;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::offers;

/// Refresh the token once it has less than this long left to live.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// Connection details and credentials for the Amadeus API.
#[derive(Debug, Clone)]
pub struct AmadeusConfig {
    /// Base URL, e.g. `https://test.api.amadeus.com`.
    pub base_url: String,
    pub api_key: String,
    pub api_secret: String,
}

impl AmadeusConfig {
    /// Load from `AMADEUS_BASE_URL` (defaults to the test host),
    /// `AMADEUS_API_KEY`, and `AMADEUS_API_SECRET`.
    pub fn from_env() -> Self {
        let base_url = std::env::var("AMADEUS_BASE_URL")
            .unwrap_or_else(|_| "https://test.api.amadeus.com".into());
        let api_key = std::env::var("AMADEUS_API_KEY").expect("AMADEUS_API_KEY must be set");
        let api_secret =
            std::env::var("AMADEUS_API_SECRET").expect("AMADEUS_API_SECRET must be set");

        Self {
            base_url,
            api_key,
            api_secret,
        }
    }
}

/// One leg to price: route, date, and the job's filters.
#[derive(Debug, Clone)]
pub struct LegSearchRequest {
    pub origin: String,
    pub dest: String,
    pub depart_date: NaiveDate,
    pub currency: String,
    pub filters: FilterSet,
}

/// Errors from the Amadeus API layer.
#[derive(Debug, thiserror::Error)]
pub enum AmadeusError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The token endpoint rejected our credentials.
    #[error("Amadeus auth failed with status {status}")]
    Auth {
        /// HTTP status code.
        status: u16,
    },

    /// The search endpoint returned a non-2xx status code. Callers must
    /// treat this as a pricing failure, never as "no offer exists".
    #[error("Amadeus API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response parsed as JSON but did not have the expected shape.
    #[error("Malformed Amadeus response: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    /// Unix seconds at which the token expires.
    expires_at: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: i64,
}

/// Client for the Amadeus flight-offers API.
///
/// Cheap to share behind an `Arc`; the token cache is guarded by an async
/// mutex so concurrent searches reuse one credential.
pub struct AmadeusClient {
    client: reqwest::Client,
    config: AmadeusConfig,
    token: Mutex<Option<CachedToken>>,
}

impl AmadeusClient {
    pub fn new(config: AmadeusConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            token: Mutex::new(None),
        }
    }

    /// Price one leg, returning the cheapest offer or a null quote when the
    /// provider has no availability.
    ///
    /// A 401 from the search endpoint invalidates the cached token and
    /// triggers exactly one re-authentication before a single retry.
    pub async fn search_leg(&self, req: &LegSearchRequest) -> Result<LegQuote, AmadeusError> {
        let payload = offers::build_search_payload(req);

        let mut response = self.post_offers(&payload).await?;
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            tracing::warn!(
                origin = %req.origin,
                dest = %req.dest,
                "Amadeus search returned 401; re-authenticating once"
            );
            self.invalidate_token().await;
            response = self.post_offers(&payload).await?;
        }

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(AmadeusError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = response.json().await?;
        offers::cheapest_quote(&body, &req.currency)
    }

    async fn post_offers(
        &self,
        payload: &serde_json::Value,
    ) -> Result<reqwest::Response, AmadeusError> {
        let token = self.bearer_token().await?;
        let response = self
            .client
            .post(format!("{}/v2/shopping/flight-offers", self.config.base_url))
            .bearer_auth(token)
            .json(payload)
            .send()
            .await?;
        Ok(response)
    }

    /// Return the cached token, refreshing it when missing or near expiry.
    async fn bearer_token(&self) -> Result<String, AmadeusError> {
        let mut guard = self.token.lock().await;

        let now = Utc::now().timestamp();
        if let Some(cached) = guard.as_ref() {
            if cached.expires_at - now > TOKEN_REFRESH_MARGIN_SECS {
                return Ok(cached.access_token.clone());
            }
        }

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.config.api_key.as_str()),
            ("client_secret", self.config.api_secret.as_str()),
        ];
        let response = self
            .client
            .post(format!(
                "{}/v1/security/oauth2/token",
                self.config.base_url
            ))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AmadeusError::Auth {
                status: status.as_u16(),
            });
        }

        let body: TokenResponse = response.json().await?;
        let token = CachedToken {
            access_token: body.access_token,
            expires_at: Utc::now().timestamp() + body.expires_in,
        };
        let access = token.access_token.clone();
        *guard = Some(token);

        tracing::debug!("Obtained Amadeus access token");
        Ok(access)
    }

    async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }
}
