//! Service-account authentication.
//!
//! Signs an RS256 JWT assertion with the key from the service-account file and
//! exchanges it at the key's token endpoint for a bearer token. Tokens are
//! cached until shortly before they expire.

use crate::types::{Error, Result};
use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Scopes requested on every token grant.
pub const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive.readonly",
];

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Supplies bearer tokens for API requests.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

/// Fixed token, for emulators and tests.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

// =============================================================================
// Service-account key
// =============================================================================

/// The fields of a service-account JSON key that the token flow needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type", default)]
    pub key_type: Option<String>,
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self> {
        let key: Self = serde_json::from_str(json)
            .map_err(|e| Error::credentials(format!("invalid service account key: {}", e)))?;
        if let Some(kind) = key.key_type.as_deref() {
            if kind != "service_account" {
                return Err(Error::credentials(format!(
                    "expected a service_account key, got '{}'",
                    kind
                )));
            }
        }
        Ok(key)
    }

    pub async fn from_file(path: &Path) -> Result<Self> {
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::credentials(format!(
                "cannot read service account file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&json)
    }
}

// =============================================================================
// Token exchange
// =============================================================================

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    ASSERTION_LIFETIME_SECS as u64
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Token source backed by a service-account key.
pub struct ServiceAccountTokenSource {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    scope: String,
    http: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl fmt::Debug for ServiceAccountTokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountTokenSource")
            .field("key", &self.key)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountTokenSource {
    pub fn new(key: ServiceAccountKey, http: reqwest::Client) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| Error::credentials(format!("invalid private key: {}", e)))?;
        Ok(Self {
            key,
            encoding_key,
            scope: SCOPES.join(" "),
            http,
            cached: Mutex::new(None),
        })
    }

    fn signed_assertion(&self) -> Result<String> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            iss: &self.key.client_email,
            scope: &self.scope,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        jsonwebtoken::encode(&header, &claims, &self.encoding_key)
            .map_err(|e| Error::auth(format!("failed to sign assertion: {}", e)))
    }

    async fn fetch_token(&self) -> Result<CachedToken> {
        let assertion = self.signed_assertion()?;
        tracing::debug!(token_uri = %self.key.token_uri, "requesting access token");

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| Error::auth(format!("token request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::auth(format!("token response unreadable: {}", e)))?;

        if !status.is_success() {
            let detail = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(desc) => format!("{}: {}", err.error, desc),
                    None => err.error,
                },
                Err(_) => body.trim().to_string(),
            };
            return Err(Error::auth(format!(
                "token endpoint returned {}: {}",
                status.as_u16(),
                detail
            )));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| Error::auth(format!("invalid token response: {}", e)))?;

        Ok(CachedToken {
            token: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        })
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokenSource {
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() + REFRESH_MARGIN < token.expires_at {
                return Ok(token.token.clone());
            }
        }

        let fresh = self.fetch_token().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::POST;
    use httpmock::MockServer;
    use serde_json::json;

    const TEST_KEY_PEM: &str = include_str!("testdata/test_key.pem");

    fn key_json(token_uri: &str) -> String {
        json!({
            "type": "service_account",
            "project_id": "test-project",
            "private_key_id": "kid-1",
            "private_key": TEST_KEY_PEM,
            "client_email": "sheets@test-project.iam.gserviceaccount.com",
            "token_uri": token_uri,
        })
        .to_string()
    }

    #[test]
    fn test_key_parses_and_defaults_token_uri() {
        let key = ServiceAccountKey::from_json(
            &json!({
                "type": "service_account",
                "private_key": TEST_KEY_PEM,
                "client_email": "a@b.iam.gserviceaccount.com",
            })
            .to_string(),
        )
        .unwrap();
        assert_eq!(key.token_uri, DEFAULT_TOKEN_URI);
        assert!(key.private_key_id.is_none());
    }

    #[test]
    fn test_wrong_key_type_rejected() {
        let err = ServiceAccountKey::from_json(
            &json!({
                "type": "authorized_user",
                "private_key": "x",
                "client_email": "a@b",
            })
            .to_string(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Credentials(_)));
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let key = ServiceAccountKey::from_json(&key_json(DEFAULT_TOKEN_URI)).unwrap();
        let dbg = format!("{:?}", key);
        assert!(!dbg.contains("PRIVATE KEY"));
        assert!(dbg.contains("sheets@test-project"));
    }

    #[test]
    fn test_invalid_pem_is_credentials_error() {
        let mut key = ServiceAccountKey::from_json(&key_json(DEFAULT_TOKEN_URI)).unwrap();
        key.private_key = "not a pem".to_string();
        let err = ServiceAccountTokenSource::new(key, reqwest::Client::new()).unwrap_err();
        assert!(matches!(err, Error::Credentials(_)));
    }

    #[tokio::test]
    async fn test_missing_file_is_credentials_error() {
        let err = ServiceAccountKey::from_file(Path::new("/nonexistent/key.json"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("cannot read service account file"));
    }

    #[tokio::test]
    async fn test_token_exchange_is_cached() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/token")
                    .body_contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer")
                    .body_contains("assertion=");
                then.status(200).json_body(json!({
                    "access_token": "ya29.test-token",
                    "expires_in": 3599,
                    "token_type": "Bearer"
                }));
            })
            .await;

        let key = ServiceAccountKey::from_json(&key_json(&server.url("/token"))).unwrap();
        let source = ServiceAccountTokenSource::new(key, reqwest::Client::new()).unwrap();

        assert_eq!(source.access_token().await.unwrap(), "ya29.test-token");
        assert_eq!(source.access_token().await.unwrap(), "ya29.test-token");
        mock.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn test_token_inside_refresh_margin_is_refetched() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/token");
                then.status(200).json_body(json!({
                    "access_token": "ya29.short-lived",
                    "expires_in": 30
                }));
            })
            .await;

        let key = ServiceAccountKey::from_json(&key_json(&server.url("/token"))).unwrap();
        let source = ServiceAccountTokenSource::new(key, reqwest::Client::new()).unwrap();

        source.access_token().await.unwrap();
        source.access_token().await.unwrap();
        mock.assert_hits_async(2).await;
    }

    #[tokio::test]
    async fn test_key_file_is_read_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, key_json(DEFAULT_TOKEN_URI).as_bytes()).unwrap();

        let key = ServiceAccountKey::from_file(file.path()).await.unwrap();
        assert_eq!(key.client_email, "sheets@test-project.iam.gserviceaccount.com");
        assert_eq!(key.private_key_id.as_deref(), Some("kid-1"));
    }

    #[tokio::test]
    async fn test_token_endpoint_rejection_is_auth_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/token");
                then.status(400).json_body(json!({
                    "error": "invalid_grant",
                    "error_description": "Invalid JWT Signature."
                }));
            })
            .await;

        let key = ServiceAccountKey::from_json(&key_json(&server.url("/token"))).unwrap();
        let source = ServiceAccountTokenSource::new(key, reqwest::Client::new()).unwrap();

        let err = source.access_token().await.unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
        assert!(err
            .to_string()
            .contains("token endpoint returned 400: invalid_grant: Invalid JWT Signature."));
    }
}
