use reqwest::{header::AUTHORIZATION, Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::oauth::OAuth1Signer;
use crate::config::FoodSearchConfig;
use crate::error::{BodyEchoError, FoodSearchError, Result};

/// Max characters of an upstream body echoed into logs.
const LOG_BODY_LIMIT: usize = 1000;

/// FatSecret `foods.search` client, signed with two-legged OAuth 1.0.
#[derive(Debug, Clone)]
pub struct FoodSearchClient {
    http: Client,
    base_url: String,
    max_results: u32,
    signer: Option<OAuth1Signer>,
}

impl FoodSearchClient {
    pub fn new(config: &FoodSearchConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("bodyecho/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                BodyEchoError::Internal(format!("failed to build food search HTTP client: {}", e))
            })?;

        let signer = match (&config.consumer_key, &config.consumer_secret) {
            (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty() => {
                Some(OAuth1Signer::new(key.clone(), secret.clone()))
            }
            _ => None,
        };

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            max_results: config.max_results,
            signer,
        })
    }

    pub fn has_credentials(&self) -> bool {
        self.signer.is_some()
    }

    /// Search foods by free text and return the upstream JSON unchanged.
    pub async fn search(&self, query: &str) -> std::result::Result<Value, FoodSearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(FoodSearchError::MissingQuery);
        }
        let signer = self
            .signer
            .as_ref()
            .ok_or(FoodSearchError::MissingCredentials)?;

        let params = vec![
            ("method", "foods.search".to_string()),
            ("search_expression", query.to_string()),
            ("format", "json".to_string()),
            ("max_results", self.max_results.to_string()),
        ];
        let authorization = signer
            .authorization_header("POST", &self.base_url, &params)
            .map_err(|e| FoodSearchError::Unexpected(e.to_string()))?;

        info!(query, "Searching foods");
        let response = self
            .http
            .post(&self.base_url)
            .header(AUTHORIZATION, authorization)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(
            status = status.as_u16(),
            body = %truncate(&body, LOG_BODY_LIMIT),
            "Food search response"
        );

        classify_response(status, &body)
    }
}

/// Map an upstream status and body to the proxy's outcome.
pub fn classify_response(
    status: StatusCode,
    body: &str,
) -> std::result::Result<Value, FoodSearchError> {
    let details = body.to_string();
    match status {
        StatusCode::OK => serde_json::from_str(body).map_err(|e| {
            warn!(error = %e, "Food search response is not JSON");
            FoodSearchError::Parse {
                details: e.to_string(),
            }
        }),
        StatusCode::UNAUTHORIZED => Err(FoodSearchError::AuthFailed { details }),
        StatusCode::FORBIDDEN => Err(FoodSearchError::Forbidden { details }),
        StatusCode::TOO_MANY_REQUESTS => Err(FoodSearchError::RateLimited { details }),
        other => {
            warn!(status = other.as_u16(), "Food search upstream error");
            Err(FoodSearchError::Api {
                status: other.as_u16(),
                details,
            })
        }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
