//! Admin gate: per-visitor auth contexts, the route guard and the endpoints
//! that open and close sessions.
//!
//! Session state is never ambient. Each request resolves its own
//! `AuthContext` from the session cookie through `AuthState`, and the guard
//! only reads that context.

pub mod context;
pub mod guard;
pub mod login;
pub mod provider;
pub mod session;
pub mod state;
pub mod store;
pub mod types;
mod utils;

pub use context::AuthContext;
pub use guard::{CurrentUser, GuardState, LOGIN_PATH, RouteGuard, require_session};
pub use provider::{AuthProvider, DisabledAuthProvider, StaticAdminProvider};
pub use session::{AuthSession, UserId};
pub use state::{AuthConfig, AuthState, SESSION_COOKIE_NAME};
pub use store::{SessionStore, spawn_session_reaper};
