//! Bearer tokens for the Google APIs.
//!
//! Three sources are supported: a fixed access token from the environment, a service
//! account key whose signed JWT assertion is exchanged at the token endpoint, or an OAuth
//! refresh token. Exchanged tokens are cached until shortly before they expire.

use crate::errors::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

/// Refresh this long before the reported expiry.
const REFRESH_MARGIN_SECS: i64 = 60;
/// Lifetime requested for a service account assertion (Google's maximum).
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Scopes requested for service account tokens.
pub const SCOPES: &str =
    "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive";
/// OAuth grant type for a signed JWT assertion.
pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// Environment variable naming a service account JSON key file.
pub const SERVICE_ACCOUNT_VAR: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// The fields of a service account JSON key that the token exchange needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    /// Account the token is issued for
    pub client_email: String,
    /// PEM-encoded RSA private key
    pub private_key: String,
    /// Key id, sent as the JWT `kid`
    #[serde(default)]
    pub private_key_id: Option<String>,
}

impl ServiceAccountKey {
    /// Parses the JSON key downloaded from the Cloud console.
    pub fn from_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).map_err(|e| Error::Config {
            message: format!("Invalid service account key: {e}"),
        })
    }

    /// Reads and parses a JSON key file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("Failed to read service account key {}: {e}", path.display()),
        })?;
        Self::from_json(&contents)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct AssertionClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

/// Signs the RS256 assertion exchanged for a service account token at `token_url`.
fn sign_assertion(key: &ServiceAccountKey, token_url: &str, now: DateTime<Utc>) -> Result<String> {
    let claims = AssertionClaims {
        iss: key.client_email.clone(),
        scope: SCOPES.to_string(),
        aud: token_url.to_string(),
        iat: now.timestamp(),
        exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
    };
    let mut header = Header::new(Algorithm::RS256);
    header.kid.clone_from(&key.private_key_id);

    let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| Error::Auth {
        message: format!("service account private key is not a valid RSA PEM: {e}"),
    })?;
    jsonwebtoken::encode(&header, &claims, &signing_key).map_err(|e| Error::Auth {
        message: format!("failed to sign service account assertion: {e}"),
    })
}

/// Where access tokens come from.
#[derive(Clone)]
pub enum Credentials {
    /// A pre-issued access token, used as-is
    Static(String),
    /// A service account key; tokens come from a signed JWT assertion
    ServiceAccount(ServiceAccountKey),
    /// OAuth client credentials plus a long-lived refresh token
    RefreshToken {
        /// OAuth client id
        client_id: String,
        /// OAuth client secret
        client_secret: String,
        /// Refresh token granted for the Sheets and Drive scopes
        refresh_token: String,
    },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(_) => f.write_str("Credentials::Static(..)"),
            Self::ServiceAccount(key) => f
                .debug_struct("Credentials::ServiceAccount")
                .field("client_email", &key.client_email)
                .finish_non_exhaustive(),
            Self::RefreshToken { client_id, .. } => f
                .debug_struct("Credentials::RefreshToken")
                .field("client_id", client_id)
                .finish_non_exhaustive(),
        }
    }
}

impl Credentials {
    /// Reads `GOOGLE_ACCESS_TOKEN`, else the key file named by
    /// `GOOGLE_APPLICATION_CREDENTIALS`, else `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET`
    /// and `GOOGLE_REFRESH_TOKEN`.
    pub fn from_env() -> Result<Self> {
        let non_blank = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        if let Some(token) = non_blank("GOOGLE_ACCESS_TOKEN") {
            return Ok(Self::Static(token));
        }
        if let Some(path) = non_blank(SERVICE_ACCOUNT_VAR) {
            return ServiceAccountKey::from_file(path.trim()).map(Self::ServiceAccount);
        }

        let var = |name: &str| {
            std::env::var(name).map_err(|_| Error::Config {
                message: format!(
                    "{name} is not set; provide GOOGLE_ACCESS_TOKEN, {SERVICE_ACCOUNT_VAR} or the OAuth client/refresh token triple"
                ),
            })
        };
        Ok(Self::RefreshToken {
            client_id: var("GOOGLE_CLIENT_ID")?,
            client_secret: var("GOOGLE_CLIENT_SECRET")?,
            refresh_token: var("GOOGLE_REFRESH_TOKEN")?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .is_none_or(|expires_at| now + Duration::seconds(REFRESH_MARGIN_SECS) < expires_at)
    }
}

/// Hands out access tokens, refreshing them when needed.
#[derive(Debug)]
pub struct GoogleAuth {
    http: reqwest::Client,
    token_url: String,
    credentials: Credentials,
    cached: Mutex<Option<CachedToken>>,
}

impl GoogleAuth {
    /// Creates an authenticator that exchanges grants at `token_url`.
    #[must_use]
    pub fn new(http: reqwest::Client, token_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            http,
            token_url: token_url.into(),
            credentials,
            cached: Mutex::new(None),
        }
    }

    /// A valid access token.
    #[instrument(skip(self))]
    pub async fn access_token(&self) -> Result<String> {
        if let Credentials::Static(token) = &self.credentials {
            return Ok(token.clone());
        }

        // held across the refresh so concurrent callers wait for one exchange
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Utc::now())) {
            return Ok(token.access_token.clone());
        }

        debug!("refreshing Google access token");
        let form = self.grant_form()?;
        let response = self.http.post(&self.token_url).form(&form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth {
                message: format!("token endpoint returned {status}: {body}"),
            });
        }

        let token: TokenResponse = response.json().await?;
        let fresh = CachedToken {
            access_token: token.access_token,
            expires_at: token
                .expires_in
                .map(|secs| Utc::now() + Duration::seconds(secs)),
        };
        let access_token = fresh.access_token.clone();
        *cached = Some(fresh);
        Ok(access_token)
    }

    fn grant_form(&self) -> Result<Vec<(&'static str, String)>> {
        Ok(match &self.credentials {
            Credentials::Static(_) => {
                return Err(Error::Auth {
                    message: "a static access token has no grant to exchange".to_string(),
                });
            }
            Credentials::ServiceAccount(key) => vec![
                ("grant_type", JWT_BEARER_GRANT.to_string()),
                ("assertion", sign_assertion(key, &self.token_url, Utc::now())?),
            ],
            Credentials::RefreshToken {
                client_id,
                client_secret,
                refresh_token,
            } => vec![
                ("grant_type", "refresh_token".to_string()),
                ("client_id", client_id.clone()),
                ("client_secret", client_secret.clone()),
                ("refresh_token", refresh_token.clone()),
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use jsonwebtoken::{DecodingKey, Validation};
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEST_PRIVATE_KEY: &str = include_str!("../../testdata/service_account_key.pem");
    const TEST_PUBLIC_KEY: &str = include_str!("../../testdata/service_account_key.pub.pem");

    fn service_account_key() -> ServiceAccountKey {
        let json = serde_json::json!({
            "type": "service_account",
            "project_id": "ledger-test",
            "private_key_id": "key-1",
            "private_key": TEST_PRIVATE_KEY,
            "client_email": "ledger@ledger-test.iam.gserviceaccount.com",
            "token_uri": "https://oauth2.googleapis.com/token"
        });
        ServiceAccountKey::from_json(&json.to_string()).unwrap()
    }

    fn refresh_credentials() -> Credentials {
        Credentials::RefreshToken {
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            refresh_token: "refresh".to_string(),
        }
    }

    #[tokio::test]
    async fn test_static_token_is_returned_as_is() -> Result<()> {
        let auth = GoogleAuth::new(
            reqwest::Client::new(),
            "http://unused.invalid/token",
            Credentials::Static("abc".to_string()),
        );
        assert_eq!(auth.access_token().await?, "abc");
        Ok(())
    }

    #[tokio::test]
    async fn test_refresh_token_is_exchanged_once_and_cached() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "fresh-token",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let auth = GoogleAuth::new(
            reqwest::Client::new(),
            format!("{}/token", server.uri()),
            refresh_credentials(),
        );
        assert_eq!(auth.access_token().await?, "fresh-token");
        assert_eq!(auth.access_token().await?, "fresh-token");
        Ok(())
    }

    #[tokio::test]
    async fn test_rejected_refresh_is_an_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
            .mount(&server)
            .await;

        let auth = GoogleAuth::new(
            reqwest::Client::new(),
            format!("{}/token", server.uri()),
            refresh_credentials(),
        );
        let err = auth.access_token().await.unwrap_err();
        assert!(matches!(&err, Error::Auth { message } if message.contains("invalid_grant")));
    }

    #[test]
    fn test_token_near_expiry_is_stale() {
        let now = Utc::now();
        let token = CachedToken {
            access_token: "t".to_string(),
            expires_at: Some(now + Duration::seconds(30)),
        };
        assert!(!token.is_fresh(now));

        let token = CachedToken {
            access_token: "t".to_string(),
            expires_at: Some(now + Duration::seconds(600)),
        };
        assert!(token.is_fresh(now));
    }

    #[test]
    fn test_service_account_assertion_is_signed_for_the_token_endpoint() -> Result<()> {
        let key = service_account_key();
        let token_url = "https://oauth2.test/token";
        let now = Utc::now();
        let assertion = sign_assertion(&key, token_url, now)?;

        let header = jsonwebtoken::decode_header(&assertion).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);
        assert_eq!(header.kid.as_deref(), Some("key-1"));

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[token_url]);
        let decoding_key = DecodingKey::from_rsa_pem(TEST_PUBLIC_KEY.as_bytes()).unwrap();
        let claims = jsonwebtoken::decode::<AssertionClaims>(&assertion, &decoding_key, &validation)
            .unwrap()
            .claims;
        assert_eq!(claims.iss, "ledger@ledger-test.iam.gserviceaccount.com");
        assert_eq!(claims.scope, SCOPES);
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp - claims.iat, ASSERTION_LIFETIME_SECS);
        Ok(())
    }

    #[tokio::test]
    async fn test_service_account_exchanges_jwt_bearer_grant() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains(
                "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer",
            ))
            .and(body_string_contains("assertion=ey"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "sa-token",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let auth = GoogleAuth::new(
            reqwest::Client::new(),
            format!("{}/token", server.uri()),
            Credentials::ServiceAccount(service_account_key()),
        );
        assert_eq!(auth.access_token().await?, "sa-token");
        assert_eq!(auth.access_token().await?, "sa-token");
        Ok(())
    }

    #[tokio::test]
    async fn test_service_account_with_bad_key_fails_before_posting() {
        let mut key = service_account_key();
        key.private_key = "not a pem".to_string();
        let auth = GoogleAuth::new(
            reqwest::Client::new(),
            "http://unused.invalid/token",
            Credentials::ServiceAccount(key),
        );
        let err = auth.access_token().await.unwrap_err();
        assert!(matches!(err, Error::Auth { .. }));
    }

    #[test]
    fn test_service_account_key_parsing() {
        assert!(matches!(
            ServiceAccountKey::from_json(r#"{"client_email": "a@b.test"}"#),
            Err(Error::Config { .. })
        ));
        assert!(matches!(
            ServiceAccountKey::from_file("testdata/does-not-exist.json"),
            Err(Error::Config { .. })
        ));

        let debug = format!("{:?}", Credentials::ServiceAccount(service_account_key()));
        assert!(debug.contains("ledger@ledger-test.iam.gserviceaccount.com"));
        assert!(!debug.contains("PRIVATE KEY"));
    }
}
