//! Supabase auth client and the session check the sync engine gates on.

use std::fmt;

use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::{compact_text, is_http_url};

/// Sessions this close to expiry are refreshed before use.
const EXPIRY_SKEW_SECONDS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

/// A signed-in administrator session.
///
/// The access token authorizes PostgREST requests under row-level security.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp (seconds)
    pub expires_at: i64,
    pub user: AuthUser,
}

impl AuthSession {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now().timestamp() + EXPIRY_SKEW_SECONDS
    }

    /// Expiry as a UTC time, if the stored timestamp is representable.
    #[must_use]
    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.expires_at, 0)
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthSession")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid auth configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Auth API error: {0}")]
    Api(String),
    #[error("Secure storage error: {0}")]
    SecureStorage(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Durable storage for the signed-in session (OS keychain in the CLI).
pub trait SessionPersistence: Clone + Send + Sync + 'static {
    fn load_session(&self) -> AuthResult<Option<AuthSession>>;
    fn save_session(&self, session: &AuthSession) -> AuthResult<()>;
    fn clear_session(&self) -> AuthResult<()>;
}

/// Source of the authenticated session a sync cycle runs under.
#[allow(async_fn_in_trait)]
pub trait SessionProvider {
    /// The current session, or `None` when nobody is signed in.
    async fn active_session(&self) -> AuthResult<Option<AuthSession>>;
}

#[derive(Clone)]
pub struct SupabaseAuthClient<S: SessionPersistence> {
    auth_url: String,
    anon_key: String,
    client: Client,
    store: S,
}

impl<S: SessionPersistence> SupabaseAuthClient<S> {
    pub fn new(url: impl AsRef<str>, anon_key: impl Into<String>, store: S) -> AuthResult<Self> {
        let auth_url = normalize_auth_url(url.as_ref())?;
        let anon_key = anon_key.into().trim().to_string();
        if anon_key.is_empty() {
            return Err(AuthError::InvalidConfiguration(
                "Supabase anon key must not be empty",
            ));
        }

        Ok(Self {
            auth_url,
            anon_key,
            client: Client::builder().build()?,
            store,
        })
    }

    /// Load the persisted session, refreshing it when it is about to expire.
    ///
    /// A session whose refresh is rejected is cleared so the next cycle does
    /// not retry it. When the auth server cannot be reached the stored session
    /// is left in place but `None` is returned, so the caller runs without a
    /// session until a later refresh succeeds.
    pub async fn restore_session(&self) -> AuthResult<Option<AuthSession>> {
        let Some(stored) = self.store.load_session()? else {
            return Ok(None);
        };

        if !stored.is_expired() {
            return Ok(Some(stored));
        }

        tracing::debug!("Persisted session expired, refreshing");
        match self.refresh_session(&stored.refresh_token).await {
            Ok(refreshed) => Ok(Some(refreshed)),
            Err(AuthError::Http(error)) if error.is_connect() || error.is_timeout() => {
                // Offline: no session for this call, stored one kept for a later refresh
                tracing::info!("Could not reach auth server to refresh session: {error}");
                Ok(None)
            }
            Err(error) => {
                tracing::warn!("Failed to refresh persisted session: {error}");
                self.store.clear_session()?;
                Ok(None)
            }
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        if email.trim().is_empty() {
            return Err(AuthError::Api("Email is required".to_string()));
        }
        if password.trim().is_empty() {
            return Err(AuthError::Api("Password is required".to_string()));
        }

        let payload = serde_json::json!({
            "email": email.trim(),
            "password": password,
        });
        self.token_grant("password", &payload).await
    }

    pub async fn refresh_session(&self, refresh_token: &str) -> AuthResult<AuthSession> {
        if refresh_token.trim().is_empty() {
            return Err(AuthError::InvalidConfiguration(
                "Refresh token must not be empty",
            ));
        }

        let payload = serde_json::json!({ "refresh_token": refresh_token });
        self.token_grant("refresh_token", &payload).await
    }

    /// Revoke the session server-side and forget it locally.
    ///
    /// An already-invalid token still clears the local copy.
    pub async fn sign_out(&self, session: &AuthSession) -> AuthResult<()> {
        let response = self
            .client
            .post(format!("{}/logout", self.auth_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await?;

        let status = response.status();
        if !(status.is_success() || status == StatusCode::UNAUTHORIZED) {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Api(parse_api_error(status, &body)));
        }

        self.store.clear_session()
    }

    /// The persisted session without refreshing or contacting the server.
    pub fn stored_session(&self) -> AuthResult<Option<AuthSession>> {
        self.store.load_session()
    }

    async fn token_grant(
        &self,
        grant_type: &str,
        payload: &serde_json::Value,
    ) -> AuthResult<AuthSession> {
        let request = self.public_request(
            self.client
                .post(format!("{}/token", self.auth_url))
                .query(&[("grant_type", grant_type)])
                .json(payload),
        );

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Api(parse_api_error(status, &body)));
        }

        let session = response
            .json::<TokenResponse>()
            .await?
            .into_session(Utc::now().timestamp())?;
        self.store.save_session(&session)?;
        Ok(session)
    }

    fn public_request(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }
}

impl<S: SessionPersistence> SessionProvider for SupabaseAuthClient<S> {
    async fn active_session(&self) -> AuthResult<Option<AuthSession>> {
        self.restore_session().await
    }
}

/// Normalize a Supabase project URL to its auth base (`.../auth/v1`).
pub fn normalize_auth_url(url: &str) -> AuthResult<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(AuthError::InvalidConfiguration(
            "Supabase URL must not be empty",
        ));
    }
    if !is_http_url(trimmed) {
        return Err(AuthError::InvalidConfiguration(
            "Supabase URL must include http:// or https://",
        ));
    }
    if trimmed.ends_with("/auth/v1") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{trimmed}/auth/v1"))
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
    expires_in: Option<i64>,
    user: Option<TokenUser>,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: String,
    email: Option<String>,
}

impl TokenResponse {
    fn into_session(self, now: i64) -> AuthResult<AuthSession> {
        let expires_at = self
            .expires_at
            .or_else(|| self.expires_in.map(|seconds| now.saturating_add(seconds)));

        match (self.access_token, self.refresh_token, expires_at, self.user) {
            (Some(access_token), Some(refresh_token), Some(expires_at), Some(user)) => {
                Ok(AuthSession {
                    access_token,
                    refresh_token,
                    expires_at,
                    user: AuthUser {
                        id: user.id,
                        email: user.email,
                    },
                })
            }
            _ => Err(AuthError::Api(
                "Token response did not include a complete session".to_string(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SupabaseErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
    message: Option<String>,
    msg: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<SupabaseErrorResponse>(body) {
        if let Some(message) = payload
            .error_description
            .or(payload.msg)
            .or(payload.message)
            .or(payload.error)
        {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{trimmed} ({})", status.as_u16())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct MemorySessions(Arc<Mutex<Option<AuthSession>>>);

    impl SessionPersistence for MemorySessions {
        fn load_session(&self) -> AuthResult<Option<AuthSession>> {
            Ok(self.0.lock().unwrap().clone())
        }

        fn save_session(&self, session: &AuthSession) -> AuthResult<()> {
            *self.0.lock().unwrap() = Some(session.clone());
            Ok(())
        }

        fn clear_session(&self) -> AuthResult<()> {
            *self.0.lock().unwrap() = None;
            Ok(())
        }
    }

    fn session(expires_at: i64) -> AuthSession {
        AuthSession {
            access_token: "secret-access-token".to_string(),
            refresh_token: "secret-refresh-token".to_string(),
            expires_at,
            user: AuthUser {
                id: "admin".to_string(),
                email: Some("ada@acme.test".to_string()),
            },
        }
    }

    #[test]
    fn normalize_auth_url_appends_auth_path() {
        let normalized = normalize_auth_url("https://demo.supabase.co/").unwrap();
        assert_eq!(normalized, "https://demo.supabase.co/auth/v1");

        let normalized = normalize_auth_url("https://demo.supabase.co/auth/v1").unwrap();
        assert_eq!(normalized, "https://demo.supabase.co/auth/v1");
    }

    #[test]
    fn normalize_auth_url_rejects_missing_scheme() {
        assert!(normalize_auth_url("demo.supabase.co").is_err());
        assert!(normalize_auth_url("").is_err());
    }

    #[test]
    fn token_response_uses_expires_in_when_needed() {
        let response: TokenResponse = serde_json::from_str(
            r#"{
                "access_token": "a",
                "refresh_token": "r",
                "expires_in": 3600,
                "user": {"id": "admin", "email": "ada@acme.test"}
            }"#,
        )
        .unwrap();

        let session = response.into_session(1_700_000_000).unwrap();
        assert_eq!(session.expires_at, 1_700_003_600);
        assert_eq!(session.user.email.as_deref(), Some("ada@acme.test"));
    }

    #[test]
    fn token_response_without_tokens_is_an_error() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"user": {"id": "admin"}}"#).unwrap();
        assert!(matches!(
            response.into_session(0),
            Err(AuthError::Api(_))
        ));
    }

    #[test]
    fn api_error_prefers_description() {
        let message = parse_api_error(
            StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        );
        assert_eq!(message, "Invalid login credentials (400)");
    }

    #[test]
    fn session_debug_redacts_tokens() {
        let rendered = format!("{:?}", session(1_700_000_000));
        assert!(!rendered.contains("secret-access-token"));
        assert!(!rendered.contains("secret-refresh-token"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn active_session_returns_fresh_stored_session() {
        let store = MemorySessions::default();
        let fresh = session(Utc::now().timestamp() + 3600);
        store.save_session(&fresh).unwrap();

        let client = SupabaseAuthClient::new("https://demo.supabase.co", "anon", store).unwrap();
        assert_eq!(client.active_session().await.unwrap(), Some(fresh));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn active_session_is_none_when_signed_out() {
        let client = SupabaseAuthClient::new(
            "https://demo.supabase.co",
            "anon",
            MemorySessions::default(),
        )
        .unwrap();
        assert_eq!(client.active_session().await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unreachable_auth_server_keeps_expired_session_stored() {
        let store = MemorySessions::default();
        let expired = session(Utc::now().timestamp() - 60);
        store.save_session(&expired).unwrap();

        let client = SupabaseAuthClient::new("http://127.0.0.1:9", "anon", store.clone()).unwrap();
        assert_eq!(client.restore_session().await.unwrap(), None);
        assert_eq!(store.load_session().unwrap(), Some(expired));
    }
}
