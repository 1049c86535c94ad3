//! Per-visitor auth context.
//!
//! Each browser session owns one `AuthContext`. It starts out `loading`, is
//! refreshed on auth events and is torn down on sign-out. Consumers (the route
//! guard, the session endpoint) only read it through `current` or `subscribe`.

use super::session::{AuthSession, UserId};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

#[derive(Clone, Debug)]
pub struct AuthContext {
    tx: Arc<watch::Sender<AuthSession>>,
}

impl AuthContext {
    /// New context whose session is still being resolved.
    #[must_use]
    pub fn new() -> Self {
        Self::with_session(AuthSession::loading())
    }

    /// Context that is already resolved to `session`.
    #[must_use]
    pub fn with_session(session: AuthSession) -> Self {
        let (tx, _rx) = watch::channel(session);
        Self { tx: Arc::new(tx) }
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn current(&self) -> AuthSession {
        self.tx.borrow().clone()
    }

    /// Receiver that observes every later change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthSession> {
        self.tx.subscribe()
    }

    pub fn sign_in(&self, user: UserId) {
        debug!(user = %user, "auth context signed in");
        self.tx.send_replace(AuthSession::authenticated(user));
    }

    /// Re-resolve after an auth event; `None` means the provider no longer
    /// knows the user.
    pub fn refresh(&self, user: Option<UserId>) {
        let session = user.map_or_else(AuthSession::anonymous, AuthSession::authenticated);
        self.tx.send_replace(session);
    }

    pub fn sign_out(&self) {
        debug!("auth context signed out");
        self.tx.send_replace(AuthSession::anonymous());
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}
