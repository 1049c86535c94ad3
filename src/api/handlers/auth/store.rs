//! In-memory session store mapping cookie tokens to auth contexts.
//!
//! Nothing is persisted: a restart signs every admin out. Expired entries are
//! dropped on lookup and by the periodic reaper.

use super::{context::AuthContext, utils::generate_session_token};
use anyhow::Result;
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::{sync::RwLock, time::sleep};
use tracing::{debug, info};

#[derive(Debug)]
struct SessionEntry {
    context: AuthContext,
    expires_at: Instant,
}

impl SessionEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug)]
pub struct SessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Register a fresh session. The returned context is still `loading`;
    /// the caller resolves it once the provider has answered.
    ///
    /// # Errors
    /// Returns an error if no session token could be generated.
    pub async fn create(&self) -> Result<(String, AuthContext)> {
        let token = generate_session_token()?;
        let context = AuthContext::new();
        let entry = SessionEntry {
            context: context.clone(),
            expires_at: Instant::now() + self.ttl,
        };
        self.sessions.write().await.insert(token.clone(), entry);
        Ok((token, context))
    }

    /// Context for `token`, unless it is unknown or expired.
    pub async fn lookup(&self, token: &str) -> Option<AuthContext> {
        let now = Instant::now();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(token) {
                None => return None,
                Some(entry) if !entry.is_expired(now) => return Some(entry.context.clone()),
                Some(_) => {}
            }
        }

        debug!("dropping expired session");
        self.remove(token).await;
        None
    }

    /// Remove the session and tear its context down.
    pub async fn remove(&self, token: &str) -> Option<AuthContext> {
        let entry = self.sessions.write().await.remove(token)?;
        entry.context.sign_out();
        Some(entry.context)
    }

    /// Drop every expired session; returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| {
            let keep = !entry.is_expired(now);
            if !keep {
                entry.context.sign_out();
            }
            keep
        });
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Spawn a background task that periodically purges expired sessions.
pub fn spawn_session_reaper(
    store: Arc<SessionStore>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            sleep(interval).await;
            let removed = store.purge_expired().await;
            if removed > 0 {
                info!("purged {removed} expired sessions");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::session::UserId;

    #[tokio::test]
    async fn create_and_lookup() -> Result<()> {
        let store = SessionStore::new(Duration::from_secs(60));
        let (token, context) = store.create().await?;
        assert!(context.current().is_loading());

        context.sign_in(UserId::new("admin@example.se"));

        let found = store.lookup(&token).await;
        assert!(found.is_some_and(|context| context.current().is_authenticated()));
        assert!(store.lookup("unknown").await.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn remove_tears_context_down() -> Result<()> {
        let store = SessionStore::new(Duration::from_secs(60));
        let (token, context) = store.create().await?;
        context.sign_in(UserId::new("admin@example.se"));

        assert!(store.remove(&token).await.is_some());
        assert!(!context.current().is_authenticated());
        assert!(!context.current().is_loading());
        assert!(store.lookup(&token).await.is_none());
        assert_eq!(store.len().await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn expired_sessions_are_dropped() -> Result<()> {
        let store = SessionStore::new(Duration::ZERO);
        let (token, context) = store.create().await?;
        context.sign_in(UserId::new("admin@example.se"));

        assert!(store.lookup(&token).await.is_none());
        assert!(!context.current().is_authenticated());
        assert_eq!(store.len().await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn purge_only_removes_expired() -> Result<()> {
        let expired = SessionStore::new(Duration::ZERO);
        expired.create().await?;
        expired.create().await?;
        assert_eq!(expired.purge_expired().await, 2);

        let live = SessionStore::new(Duration::from_secs(60));
        live.create().await?;
        assert_eq!(live.purge_expired().await, 0);
        assert_eq!(live.len().await, 1);
        Ok(())
    }
}
