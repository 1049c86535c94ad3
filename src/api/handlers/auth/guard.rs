//! Admin route guard.
//!
//! Three states: `Loading` until the caller's auth context resolves, then
//! either `Authenticated` (render the protected route unchanged) or
//! `Unauthenticated` (navigate to the login page). Only presence of a user is
//! checked; there are no roles. This is a UX gate, not a security boundary.

use super::{
    context::AuthContext,
    session::{AuthSession, UserId},
    state::AuthState,
};
use crate::api::handlers::pages;
use axum::{
    extract::{Extension, Request},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::debug;

pub const LOGIN_PATH: &str = "/admin/login";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardState {
    Loading,
    Authenticated(UserId),
    Unauthenticated,
}

impl GuardState {
    #[must_use]
    pub fn from_session(session: &AuthSession) -> Self {
        if session.is_loading() {
            return Self::Loading;
        }
        session
            .user()
            .map_or(Self::Unauthenticated, |user| Self::Authenticated(user.clone()))
    }
}

/// User resolved by the guard, available to protected handlers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentUser(pub UserId);

#[derive(Clone, Copy, Debug)]
pub struct RouteGuard {
    login_path: &'static str,
}

impl RouteGuard {
    #[must_use]
    pub const fn new(login_path: &'static str) -> Self {
        Self { login_path }
    }

    #[must_use]
    pub const fn login_path(&self) -> &'static str {
        self.login_path
    }

    /// State right now, without waiting.
    #[must_use]
    pub fn current(&self, context: &AuthContext) -> GuardState {
        GuardState::from_session(&context.current())
    }

    /// Wait until the context leaves `loading`. There is no timeout: a context
    /// that never resolves keeps the caller waiting.
    pub async fn resolve(&self, context: &AuthContext) -> GuardState {
        let mut rx = context.subscribe();
        match rx.wait_for(|session| !session.is_loading()).await {
            Ok(session) => GuardState::from_session(&session),
            // The sender lives inside `context`, so this only happens on teardown.
            Err(_) => GuardState::Unauthenticated,
        }
    }
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(LOGIN_PATH)
    }
}

/// Speculative loads (link prefetch, prerender) announce themselves with
/// `Sec-Purpose` or the older `Purpose` header.
fn is_prefetch(headers: &HeaderMap) -> bool {
    ["sec-purpose", "purpose"].iter().any(|name| {
        headers
            .get(*name)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.to_ascii_lowercase().contains("prefetch"))
    })
}

/// Middleware for protected admin routes.
///
/// Navigations wait for the caller's context to resolve. Prefetches take the
/// state as it is now, so a context that is still loading gets the spinner.
pub async fn require_session(
    auth_state: Extension<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let guard = RouteGuard::default();
    let context = auth_state.context_for(request.headers()).await;

    let state = if is_prefetch(request.headers()) {
        guard.current(&context)
    } else {
        guard.resolve(&context).await
    };

    match state {
        GuardState::Authenticated(user) => {
            request.extensions_mut().insert(CurrentUser(user));
            next.run(request).await
        }
        GuardState::Unauthenticated => {
            debug!(path = %request.uri().path(), "no session, redirecting to login");
            Redirect::to(guard.login_path()).into_response()
        }
        GuardState::Loading => pages::loading().into_response(),
    }
}
