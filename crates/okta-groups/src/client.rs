//! Okta API client for listing a user's groups.
//!
//! The provider only needs one capability from Okta: "list the groups of
//! this user". That capability is the [`GroupListing`] trait; [`OktaClient`]
//! is the production implementation, authenticating with the OAuth 2.0
//! client-credentials flow and a `private_key_jwt` client assertion per
//! RFC 7523.
//!
//! # Token handling
//!
//! Access tokens are cached in-process and refreshed shortly before expiry.
//! This is the minimum a working client needs; refresh tokens, rotation, and
//! other lifecycle concerns are out of scope.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::Header;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::RwLock;
use url::Url;
use uuid::Uuid;

use crate::config::OktaProviderConfig;
use crate::error::ListingError;
use crate::key::SigningKey;

/// Client assertion type for `private_key_jwt` authentication (RFC 7523).
const CLIENT_ASSERTION_TYPE: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";

/// Org-authorization-server token endpoint path.
const TOKEN_ENDPOINT_PATH: &str = "/oauth2/v1/token";

/// Client assertion lifetime (5 minutes per RFC 7523 guidance).
const ASSERTION_LIFETIME: Duration = Duration::from_secs(300);

/// Refresh margin so a token is never used right at its expiry.
const TOKEN_EXPIRY_SKEW: Duration = Duration::from_secs(30);

/// Token TTL assumed when Okta omits `expires_in`.
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);

/// A group record as returned by the Okta Users API.
///
/// Profile and name can each be absent; that is valid data, not an error,
/// and such records simply contribute no group name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OktaGroup {
    /// Okta group id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Group profile, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<GroupProfile>,
}

/// The profile section of an Okta group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupProfile {
    /// Display name of the group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Group description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl OktaGroup {
    /// The group's display name, when both profile and name are present.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.profile.as_ref()?.name.as_deref()
    }
}

/// The single capability the provider requires from an identity provider
/// backend.
#[async_trait]
pub trait GroupListing: Send + Sync {
    /// Lists the groups the given user belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`ListingError`] on any transport, authentication, or
    /// response-decoding failure.
    async fn list_user_groups(&self, user: &str) -> Result<Vec<OktaGroup>, ListingError>;
}

/// JWT claims for the client assertion per RFC 7523.
#[derive(Debug, Serialize)]
struct AssertionClaims {
    /// Issuer - must be the client id.
    iss: String,
    /// Subject - must be the client id.
    sub: String,
    /// Audience - the org token endpoint.
    aud: String,
    /// Expiration time as Unix timestamp.
    exp: i64,
    /// Issued-at time as Unix timestamp.
    iat: i64,
    /// Unique JWT id to prevent replay.
    jti: String,
}

/// Successful token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// OAuth error body returned by Okta on failures.
#[derive(Debug, Deserialize)]
struct OAuthErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        self.expires_at > Instant::now()
    }
}

/// Okta implementation of [`GroupListing`].
pub struct OktaClient {
    http_client: reqwest::Client,
    org_url: Url,
    client_id: String,
    scopes: Vec<String>,
    signing_key: SigningKey,
    token: RwLock<Option<CachedToken>>,
}

impl OktaClient {
    /// Creates a client for the configured Okta org.
    ///
    /// # Errors
    ///
    /// Returns [`ListingError`] when the org URL is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: &OktaProviderConfig, signing_key: SigningKey) -> Result<Self, ListingError> {
        let scheme = if config.allow_http { "http" } else { "https" };
        let org_url = Url::parse(&format!("{scheme}://{}", config.domain))?;

        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http_client,
            org_url,
            client_id: config.client_id.clone(),
            scopes: config.scopes.clone(),
            signing_key,
            token: RwLock::new(None),
        })
    }

    /// The org base URL this client talks to.
    #[must_use]
    pub fn org_url(&self) -> &Url {
        &self.org_url
    }

    /// Builds the signed client assertion for the token endpoint.
    fn build_assertion(&self, token_endpoint: &str) -> Result<String, ListingError> {
        let now = OffsetDateTime::now_utc();
        let claims = AssertionClaims {
            iss: self.client_id.clone(),
            sub: self.client_id.clone(),
            aud: token_endpoint.to_string(),
            exp: (now + ASSERTION_LIFETIME).unix_timestamp(),
            iat: now.unix_timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let header = Header::new(self.signing_key.algorithm());
        let assertion = jsonwebtoken::encode(&header, &claims, self.signing_key.encoding_key())?;
        Ok(assertion)
    }

    /// Returns a valid access token, requesting a fresh one when the cached
    /// token is absent or about to expire.
    async fn access_token(&self) -> Result<String, ListingError> {
        {
            let cached = self.token.read().await;
            if let Some(token) = cached.as_ref() {
                if token.is_fresh() {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let mut cached = self.token.write().await;
        // Another caller may have refreshed while we waited for the lock.
        if let Some(token) = cached.as_ref() {
            if token.is_fresh() {
                return Ok(token.access_token.clone());
            }
        }

        let fresh = self.request_token().await?;
        let access_token = fresh.access_token.clone();
        *cached = Some(fresh);
        Ok(access_token)
    }

    async fn request_token(&self) -> Result<CachedToken, ListingError> {
        let token_endpoint = self.org_url.join(TOKEN_ENDPOINT_PATH)?;
        let assertion = self.build_assertion(token_endpoint.as_str())?;
        let scope = self.scopes.join(" ");

        tracing::debug!(
            "Requesting Okta access token from {} for client {}",
            token_endpoint,
            self.client_id
        );

        let response = self
            .http_client
            .post(token_endpoint.as_str())
            .form(&[
                ("grant_type", "client_credentials"),
                ("scope", scope.as_str()),
                ("client_assertion_type", CLIENT_ASSERTION_TYPE),
                ("client_assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if let Ok(oauth_error) = serde_json::from_str::<OAuthErrorResponse>(&body) {
                return Err(ListingError::oauth(
                    oauth_error.error,
                    oauth_error.error_description.unwrap_or_default(),
                ));
            }

            return Err(ListingError::TokenRequestFailed(format!(
                "HTTP {status} - {body}"
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            ListingError::MalformedResponse(format!("Failed to parse token response: {e}"))
        })?;

        let ttl = token
            .expires_in
            .filter(|secs| *secs > 0)
            .map_or(DEFAULT_TOKEN_TTL, |secs| Duration::from_secs(secs as u64));

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: Instant::now() + ttl.saturating_sub(TOKEN_EXPIRY_SKEW),
        })
    }
}

#[async_trait]
impl GroupListing for OktaClient {
    async fn list_user_groups(&self, user: &str) -> Result<Vec<OktaGroup>, ListingError> {
        let access_token = self.access_token().await?;
        let url = self.org_url.join(&format!("/api/v1/users/{user}/groups"))?;

        let response = self
            .http_client
            .get(url.as_str())
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if let Ok(oauth_error) = serde_json::from_str::<OAuthErrorResponse>(&body) {
                return Err(ListingError::oauth(
                    oauth_error.error,
                    oauth_error.error_description.unwrap_or_default(),
                ));
            }

            return Err(ListingError::ListingFailed(format!(
                "HTTP {status} - {body}"
            )));
        }

        let groups: Vec<OktaGroup> = response.json().await.map_err(|e| {
            ListingError::MalformedResponse(format!("Failed to parse group listing: {e}"))
        })?;

        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{Algorithm, DecodingKey, Validation};
    use rand::rngs::OsRng;
    use rsa::RsaPrivateKey;
    use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
    use serde::Deserialize;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::key::load_signing_key;

    // -------------------------------------------------------------------------
    // Test Helpers
    // -------------------------------------------------------------------------

    struct TestKey {
        signing_key: SigningKey,
        public_pem: String,
    }

    fn generate_test_key() -> TestKey {
        let private_key = RsaPrivateKey::new(&mut OsRng, 2048).expect("key generation");
        let public_pem = private_key
            .to_public_key()
            .to_public_key_pem(LineEnding::LF)
            .expect("public pem");

        let private_pem = private_key.to_pkcs8_pem(LineEnding::LF).expect("pkcs8 pem");
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        std::io::Write::write_all(&mut file, private_pem.as_bytes()).expect("write key");
        let signing_key = load_signing_key(file.path()).expect("load key");

        TestKey {
            signing_key,
            public_pem,
        }
    }

    fn test_config(domain: &str) -> OktaProviderConfig {
        OktaProviderConfig::new(domain, "0oabc123", "/unused/private.key").with_allow_http(true)
    }

    fn mock_client(server: &MockServer, key: &TestKey) -> OktaClient {
        let domain = server.uri().trim_start_matches("http://").to_string();
        OktaClient::new(&test_config(&domain), key.signing_key.clone()).expect("client")
    }

    fn token_body() -> serde_json::Value {
        serde_json::json!({
            "access_token": "test-access-token",
            "token_type": "Bearer",
            "expires_in": 3600,
            "scope": "okta.users.read"
        })
    }

    fn group_body(names: &[&str]) -> serde_json::Value {
        serde_json::Value::Array(
            names
                .iter()
                .map(|name| {
                    serde_json::json!({
                        "id": format!("00g-{name}"),
                        "profile": { "name": name, "description": "" }
                    })
                })
                .collect(),
        )
    }

    // -------------------------------------------------------------------------
    // Assertion Tests
    // -------------------------------------------------------------------------

    #[derive(Debug, Deserialize)]
    struct DecodedAssertion {
        iss: String,
        sub: String,
        aud: String,
        exp: i64,
        iat: i64,
        jti: String,
    }

    #[test]
    fn test_client_assertion_claims() {
        let key = generate_test_key();
        let client =
            OktaClient::new(&test_config("dev-123456.okta.com"), key.signing_key.clone())
                .expect("client");

        let token_endpoint = "https://dev-123456.okta.com/oauth2/v1/token";
        let assertion = client.build_assertion(token_endpoint).expect("assertion");

        let decoding_key = DecodingKey::from_rsa_pem(key.public_pem.as_bytes()).expect("public");
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[token_endpoint]);

        let decoded =
            jsonwebtoken::decode::<DecodedAssertion>(&assertion, &decoding_key, &validation)
                .expect("assertion should verify")
                .claims;

        assert_eq!(decoded.iss, "0oabc123");
        assert_eq!(decoded.sub, "0oabc123");
        assert_eq!(decoded.aud, token_endpoint);
        assert!(!decoded.jti.is_empty());
        assert_eq!(decoded.exp - decoded.iat, 300);
    }

    #[test]
    fn test_distinct_assertions_get_distinct_jti() {
        let key = generate_test_key();
        let client =
            OktaClient::new(&test_config("dev-123456.okta.com"), key.signing_key)
                .expect("client");

        let first = client.build_assertion("https://x/token").unwrap();
        let second = client.build_assertion("https://x/token").unwrap();
        assert_ne!(first, second);
    }

    // -------------------------------------------------------------------------
    // Wire Format Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_group_listing_tolerates_absent_profile_and_name() {
        let json = r#"[
            {"id": "00g1", "profile": {"name": "admins"}},
            {"id": "00g2", "profile": {}},
            {"id": "00g3"}
        ]"#;

        let groups: Vec<OktaGroup> = serde_json::from_str(json).unwrap();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].name(), Some("admins"));
        assert_eq!(groups[1].name(), None);
        assert_eq!(groups[2].name(), None);
    }

    #[test]
    fn test_oauth_error_body_parses() {
        let json = r#"{"error": "invalid_client", "error_description": "bad assertion"}"#;
        let error: OAuthErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(error.error, "invalid_client");
        assert_eq!(error.error_description.as_deref(), Some("bad assertion"));
    }

    // -------------------------------------------------------------------------
    // HTTP Tests
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_list_user_groups_end_to_end() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(TOKEN_ENDPOINT_PATH))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("client_assertion_type="))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v1/users/alice/groups"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(group_body(&["trino_group_admins", "Everyone"])),
            )
            .mount(&server)
            .await;

        let key = generate_test_key();
        let client = mock_client(&server, &key);

        let groups = client.list_user_groups("alice").await.expect("listing");
        let names: Vec<_> = groups.iter().filter_map(OktaGroup::name).collect();
        assert_eq!(names, vec!["trino_group_admins", "Everyone"]);
    }

    #[tokio::test]
    async fn test_access_token_is_cached_across_calls() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(TOKEN_ENDPOINT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v1/users/alice/groups"))
            .respond_with(ResponseTemplate::new(200).set_body_json(group_body(&["admins"])))
            .expect(2)
            .mount(&server)
            .await;

        let key = generate_test_key();
        let client = mock_client(&server, &key);

        client.list_user_groups("alice").await.expect("first call");
        client.list_user_groups("alice").await.expect("second call");
    }

    #[tokio::test]
    async fn test_token_endpoint_oauth_error_is_surfaced() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(TOKEN_ENDPOINT_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": "invalid_client",
                "error_description": "The client_assertion signature is invalid."
            })))
            .mount(&server)
            .await;

        let key = generate_test_key();
        let client = mock_client(&server, &key);

        let error = client.list_user_groups("alice").await.unwrap_err();
        assert!(matches!(error, ListingError::OAuth { ref error, .. } if error == "invalid_client"));
    }

    #[tokio::test]
    async fn test_listing_non_success_is_surfaced() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(TOKEN_ENDPOINT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v1/users/missing/groups"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not found: missing"))
            .mount(&server)
            .await;

        let key = generate_test_key();
        let client = mock_client(&server, &key);

        let error = client.list_user_groups("missing").await.unwrap_err();
        assert!(matches!(error, ListingError::ListingFailed(_)));
    }
}
