//! Auth session snapshot shared between the auth context and its consumers.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Identifier of a signed-in user. For the static admin provider this is the
/// normalized admin email.
#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read-only view of a session: who is signed in, and whether that is known yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthSession {
    user: Option<UserId>,
    loading: bool,
}

impl AuthSession {
    /// Session whose user is not resolved yet.
    #[must_use]
    pub const fn loading() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }

    /// Resolved session without a user.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            user: None,
            loading: false,
        }
    }

    #[must_use]
    pub const fn authenticated(user: UserId) -> Self {
        Self {
            user: Some(user),
            loading: false,
        }
    }

    #[must_use]
    pub fn user(&self) -> Option<&UserId> {
        self.user.as_ref()
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        !self.loading && self.user.is_some()
    }
}
