//! Credential verification behind the admin login.
//!
//! Provider internals are deliberately thin: the site has one admin account
//! configured through the environment. Other backends plug in through
//! `AuthProvider`.

use super::{
    session::UserId,
    utils::{constant_time_eq, normalize_email},
};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

pub trait AuthProvider: Send + Sync {
    /// Return the user for valid credentials, `None` otherwise.
    fn authenticate(&self, email: &str, password: &str) -> Option<UserId>;

    /// Whether any login can succeed at all.
    fn is_enabled(&self) -> bool;
}

/// Single admin account from configuration.
pub struct StaticAdminProvider {
    email: String,
    password: SecretString,
}

impl StaticAdminProvider {
    #[must_use]
    pub fn new(email: &str, password: SecretString) -> Self {
        Self {
            email: normalize_email(email),
            password,
        }
    }
}

impl fmt::Debug for StaticAdminProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticAdminProvider")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl AuthProvider for StaticAdminProvider {
    fn authenticate(&self, email: &str, password: &str) -> Option<UserId> {
        if !self.is_enabled() {
            return None;
        }
        let email = normalize_email(email);
        // Evaluate both comparisons so timing does not reveal which one failed.
        let email_ok = constant_time_eq(email.as_bytes(), self.email.as_bytes());
        let password_ok = constant_time_eq(
            password.as_bytes(),
            self.password.expose_secret().as_bytes(),
        );

        (email_ok && password_ok).then(|| UserId::new(self.email.clone()))
    }

    fn is_enabled(&self) -> bool {
        !self.email.is_empty() && !self.password.expose_secret().is_empty()
    }
}

/// Used when no admin account is configured; every login fails.
#[derive(Clone, Copy, Debug)]
pub struct DisabledAuthProvider;

impl AuthProvider for DisabledAuthProvider {
    fn authenticate(&self, _email: &str, _password: &str) -> Option<UserId> {
        None
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> StaticAdminProvider {
        StaticAdminProvider::new("Admin@Example.se", SecretString::from("hemligt"))
    }

    #[test]
    fn accepts_configured_credentials() {
        let user = provider().authenticate(" admin@example.se ", "hemligt");
        assert_eq!(user, Some(UserId::new("admin@example.se")));
    }

    #[test]
    fn rejects_wrong_password_or_email() {
        assert!(provider().authenticate("admin@example.se", "fel").is_none());
        assert!(provider().authenticate("annan@example.se", "hemligt").is_none());
    }

    #[test]
    fn empty_password_disables_provider() {
        let provider = StaticAdminProvider::new("admin@example.se", SecretString::from(""));
        assert!(!provider.is_enabled());
        assert!(provider.authenticate("admin@example.se", "").is_none());
        assert!(DisabledAuthProvider.authenticate("a@x.se", "x").is_none());
        assert!(!DisabledAuthProvider.is_enabled());
    }

    #[test]
    fn debug_redacts_password() {
        assert!(!format!("{:?}", provider()).contains("hemligt"));
    }
}
