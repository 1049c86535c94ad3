//! Auth configuration and shared state for the admin gate.

use super::{
    context::AuthContext,
    provider::AuthProvider,
    session::AuthSession,
    store::SessionStore,
};
use axum::http::{HeaderMap, header::COOKIE};
use std::{fmt, sync::Arc, time::Duration};

pub const SESSION_COOKIE_NAME: &str = "hemsida_session";

const DEFAULT_SESSION_TTL_SECONDS: u64 = 8 * 60 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    site_url: String,
    session_ttl_seconds: u64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(site_url: String) -> Self {
        Self {
            site_url,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: u64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> u64 {
        self.session_ttl_seconds
    }

    /// Only mark cookies secure when the site is served over HTTPS.
    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        self.site_url.starts_with("https://")
    }
}

pub struct AuthState {
    config: AuthConfig,
    provider: Arc<dyn AuthProvider>,
    sessions: Arc<SessionStore>,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, provider: Arc<dyn AuthProvider>) -> Self {
        let sessions = Arc::new(SessionStore::new(Duration::from_secs(
            config.session_ttl_seconds(),
        )));
        Self {
            config,
            provider,
            sessions,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn provider(&self) -> &dyn AuthProvider {
        self.provider.as_ref()
    }

    #[must_use]
    pub fn sessions(&self) -> Arc<SessionStore> {
        self.sessions.clone()
    }

    /// Auth context scoped to the caller's session cookie.
    ///
    /// Callers without a (live) session get a resolved anonymous context.
    pub async fn context_for(&self, headers: &HeaderMap) -> AuthContext {
        if let Some(token) = extract_session_token(headers)
            && let Some(context) = self.sessions.lookup(&token).await
        {
            return context;
        }
        AuthContext::with_session(AuthSession::anonymous())
    }
}

impl fmt::Debug for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthState")
            .field("config", &self.config)
            .field("provider_enabled", &self.provider.is_enabled())
            .field("sessions", &self.sessions)
            .finish()
    }
}

pub(crate) fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let (Some(key), Some(val)) = (parts.next(), parts.next()) else {
                continue;
            };
            let val = val.trim();
            if key.trim() == SESSION_COOKIE_NAME && !val.is_empty() {
                return Some(val.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::{provider::DisabledAuthProvider, session::UserId};
    use axum::http::HeaderValue;

    fn headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(cookie) {
            headers.insert(COOKIE, value);
        }
        headers
    }

    #[test]
    fn extract_session_token_finds_cookie() {
        assert_eq!(
            extract_session_token(&headers("theme=dark; hemsida_session=abc123")),
            Some("abc123".to_string())
        );
        assert_eq!(extract_session_token(&headers("theme=dark")), None);
        assert_eq!(extract_session_token(&headers("hemsida_session=")), None);
        assert_eq!(extract_session_token(&HeaderMap::new()), None);
    }

    #[test]
    fn cookie_secure_follows_scheme() {
        assert!(AuthConfig::new("https://www.example.se".to_string()).session_cookie_secure());
        assert!(!AuthConfig::new("http://localhost:8080".to_string()).session_cookie_secure());
    }

    #[tokio::test]
    async fn context_for_scopes_by_cookie() -> anyhow::Result<()> {
        let state = AuthState::new(
            AuthConfig::new("http://localhost:8080".to_string()),
            Arc::new(DisabledAuthProvider),
        );

        let anonymous = state.context_for(&HeaderMap::new()).await;
        assert_eq!(anonymous.current(), AuthSession::anonymous());

        let (token, context) = state.sessions().create().await?;
        context.sign_in(UserId::new("admin@example.se"));

        let scoped = state
            .context_for(&headers(&format!("{SESSION_COOKIE_NAME}={token}")))
            .await;
        assert!(scoped.current().is_authenticated());
        Ok(())
    }
}
