//! OAuth 1.0 request signing (HMAC-SHA1), as required by FatSecret's REST API.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha1::Sha1;
use url::Url;

use crate::error::{BodyEchoError, Result};

type HmacSha1 = Hmac<Sha1>;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";

/// RFC 3986 percent-encoding (unreserved characters pass through).
fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Consumer credentials, plus an optional access token for three-legged flows.
#[derive(Clone)]
pub struct OAuth1Signer {
    consumer_key: String,
    consumer_secret: String,
    token: Option<(String, String)>,
}

impl std::fmt::Debug for OAuth1Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuth1Signer")
            .field("consumer_key", &self.consumer_key)
            .field("has_token", &self.token.is_some())
            .finish()
    }
}

impl OAuth1Signer {
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>, token_secret: impl Into<String>) -> Self {
        self.token = Some((token.into(), token_secret.into()));
        self
    }

    fn nonce() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect()
    }

    /// `Authorization` header value for a request with a fresh nonce and timestamp.
    ///
    /// `params` are the form-body parameters; query parameters are taken from `url`.
    pub fn authorization_header(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<String> {
        self.authorization_header_at(
            method,
            url,
            params,
            &Self::nonce(),
            Utc::now().timestamp(),
        )
    }

    pub fn authorization_header_at(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, String)],
        nonce: &str,
        timestamp: i64,
    ) -> Result<String> {
        let mut oauth: Vec<(&str, String)> = vec![
            ("oauth_consumer_key", self.consumer_key.clone()),
            ("oauth_nonce", nonce.to_string()),
            ("oauth_signature_method", SIGNATURE_METHOD.to_string()),
            ("oauth_timestamp", timestamp.to_string()),
            ("oauth_version", OAUTH_VERSION.to_string()),
        ];
        if let Some((token, _)) = &self.token {
            oauth.push(("oauth_token", token.clone()));
        }

        let base = signature_base_string(method, url, params, &oauth)?;
        let signature = self.sign(&base)?;
        tracing::trace!(base = %base, "OAuth signature base string");

        oauth.push(("oauth_signature", signature));
        let fields: Vec<String> = oauth
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
            .collect();
        Ok(format!("OAuth {}", fields.join(", ")))
    }

    fn sign(&self, base: &str) -> Result<String> {
        let token_secret = self
            .token
            .as_ref()
            .map(|(_, secret)| secret.as_str())
            .unwrap_or("");
        let key = format!("{}&{}", encode(&self.consumer_secret), encode(token_secret));

        let mut mac = HmacSha1::new_from_slice(key.as_bytes())
            .map_err(|e| BodyEchoError::Internal(format!("HMAC init failed: {}", e)))?;
        mac.update(base.as_bytes());
        Ok(BASE64.encode(mac.finalize().into_bytes()))
    }
}

/// `METHOD&enc(base_url)&enc(normalized_params)`
pub fn signature_base_string(
    method: &str,
    url: &str,
    params: &[(&str, String)],
    oauth: &[(&str, String)],
) -> Result<String> {
    let parsed =
        Url::parse(url).map_err(|e| BodyEchoError::Internal(format!("invalid URL {url}: {e}")))?;

    let host = parsed
        .host_str()
        .ok_or_else(|| BodyEchoError::Internal(format!("URL has no host: {url}")))?;
    let base_url = match parsed.port() {
        Some(port) => format!("{}://{}:{}{}", parsed.scheme(), host, port, parsed.path()),
        None => format!("{}://{}{}", parsed.scheme(), host, parsed.path()),
    };

    let mut pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| (encode(&k), encode(&v)))
        .chain(
            params
                .iter()
                .chain(oauth)
                .map(|(k, v)| (encode(k), encode(v))),
        )
        .collect();
    pairs.sort();

    let normalized = pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    Ok(format!(
        "{}&{}&{}",
        method.to_uppercase(),
        encode(&base_url),
        encode(&normalized)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_params(query: &str) -> Vec<(&'static str, String)> {
        vec![
            ("method", "foods.search".to_string()),
            ("search_expression", query.to_string()),
            ("format", "json".to_string()),
            ("max_results", "20".to_string()),
        ]
    }

    #[test]
    fn test_base_string_sorts_and_double_encodes() {
        let oauth = vec![
            ("oauth_consumer_key", "ck".to_string()),
            ("oauth_nonce", "abc123".to_string()),
            ("oauth_signature_method", "HMAC-SHA1".to_string()),
            ("oauth_timestamp", "1700000000".to_string()),
            ("oauth_version", "1.0".to_string()),
        ];
        let base = signature_base_string(
            "post",
            "https://platform.fatsecret.com/rest/server.api",
            &search_params("apple pie"),
            &oauth,
        )
        .unwrap();
        assert_eq!(
            base,
            "POST&https%3A%2F%2Fplatform.fatsecret.com%2Frest%2Fserver.api&format%3Djson\
             %26max_results%3D20%26method%3Dfoods.search%26oauth_consumer_key%3Dck\
             %26oauth_nonce%3Dabc123%26oauth_signature_method%3DHMAC-SHA1\
             %26oauth_timestamp%3D1700000000%26oauth_version%3D1.0\
             %26search_expression%3Dapple%2520pie"
        );
    }

    #[test]
    fn test_consumer_only_signature() {
        let header = OAuth1Signer::new("ck", "cs")
            .authorization_header_at(
                "POST",
                "https://platform.fatsecret.com/rest/server.api",
                &search_params("apple pie"),
                "abc123",
                1_700_000_000,
            )
            .unwrap();
        assert!(header.starts_with("OAuth "));
        assert!(header.contains(r#"oauth_signature="MkBBsLANttsApsnMDHOeix%2B%2B8ek%3D""#));
        assert!(!header.contains("oauth_token"));
    }

    #[test]
    fn test_published_reference_vector() {
        let signer = OAuth1Signer::new(
            "xvz1evFS4wEEPTGEFPHBog",
            "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
        )
        .with_token(
            "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
            "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE",
        );
        let header = signer
            .authorization_header_at(
                "POST",
                "https://api.twitter.com/1.1/statuses/update.json?include_entities=true",
                &[(
                    "status",
                    "Hello Ladies + Gentlemen, a signed OAuth request!".to_string(),
                )],
                "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg",
                1_318_622_958,
            )
            .unwrap();
        // hCtSmYh+iHYCEqBWrE7C7hYmtUk=
        assert!(
            header.contains(r#"oauth_signature="hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D""#),
            "{header}"
        );
    }

    #[test]
    fn test_fresh_nonce_per_header() {
        let signer = OAuth1Signer::new("ck", "cs");
        let url = "https://platform.fatsecret.com/rest/server.api";
        let a = signer.authorization_header("POST", url, &[]).unwrap();
        let b = signer.authorization_header("POST", url, &[]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_non_default_port_is_kept() {
        let base = signature_base_string("GET", "http://127.0.0.1:8081/api", &[], &[]).unwrap();
        assert!(base.starts_with("GET&http%3A%2F%2F127.0.0.1%3A8081%2Fapi&"));
    }
}
