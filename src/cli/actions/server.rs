use crate::api::{
    self,
    email::{MailConfig, MailTransport, SmtpSecurity},
    handlers::{
        auth::{AuthConfig, AuthProvider, AuthState, DisabledAuthProvider, StaticAdminProvider},
        site::SiteConfig,
    },
};
use anyhow::Result;
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub site: SiteConfig,
    pub mail_transport: MailTransport,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_security: SmtpSecurity,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<SecretString>,
    pub mail_from: String,
    pub mail_to: String,
    pub admin: Option<(String, SecretString)>,
    pub session_ttl_seconds: u64,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    if args.mail_transport == MailTransport::Smtp && args.smtp_host.is_none() {
        warn!("No SMTP host configured; contact submissions will fail until one is set");
    }

    let provider: Arc<dyn AuthProvider> = match args.admin {
        Some((email, password)) => Arc::new(StaticAdminProvider::new(&email, password)),
        None => {
            warn!("No admin account configured; admin login is disabled");
            Arc::new(DisabledAuthProvider)
        }
    };

    let mail_config = MailConfig::new()
        .with_transport(args.mail_transport)
        .with_smtp_host(args.smtp_host)
        .with_smtp_port(args.smtp_port)
        .with_smtp_security(args.smtp_security)
        .with_smtp_user(args.smtp_user)
        .with_smtp_password(args.smtp_password)
        .with_from(args.mail_from)
        .with_to(args.mail_to);

    let auth_config = AuthConfig::new(args.site.base_url().to_string())
        .with_session_ttl_seconds(args.session_ttl_seconds);

    api::new(
        args.port,
        mail_config,
        AuthState::new(auth_config, provider),
        args.site,
    )
    .await
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("site_url", args.site.base_url().to_string()),
        ("mail_transport", args.mail_transport.as_str().to_string()),
        (
            "smtp_host",
            args.smtp_host
                .as_ref()
                .map_or_else(|| "none".to_string(), |host| format!("{host}:{}", args.smtp_port)),
        ),
        ("smtp_tls", args.smtp_security.as_str().to_string()),
        (
            "smtp_user",
            args.smtp_user.clone().unwrap_or_else(|| "n/a".to_string()),
        ),
        ("smtp_password_set", args.smtp_password.is_some().to_string()),
        ("mail_from", args.mail_from.clone()),
        ("mail_to", args.mail_to.clone()),
        (
            "admin_email",
            args.admin
                .as_ref()
                .map_or_else(|| "disabled".to_string(), |(email, _)| email.clone()),
        ),
        ("session_ttl_seconds", args.session_ttl_seconds.to_string()),
    ];
    info!("{}", startup_message("Startup configuration", &entries));
}

fn startup_message(title: &str, entries: &[(&str, String)]) -> String {
    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!("{}\n\n{title}:", banner());
    for (key, value) in entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        message.push_str(&format!("\n  {key}:{padding} {value}"));
    }
    message
}

fn banner() -> String {
    let short_hash = short_commit(crate::GIT_COMMIT_HASH);
    BANNER.replace(
        "{VERSION}",
        &format!(" - {} - {}", env!("CARGO_PKG_VERSION"), short_hash),
    )
}

fn short_commit(hash: &str) -> String {
    let trimmed = hash.trim();
    trimmed.get(..7).unwrap_or(trimmed).to_string()
}

const BANNER: &str = r"
   _________
  /  _____  \
 /  /     \  \
 |  | [ ] |  |   H E M S I D A {VERSION}
 |  |_____|  |
 |___________|";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_commit_truncates() {
        assert_eq!(short_commit("0123456789abcdef"), "0123456");
        assert_eq!(short_commit("abc"), "abc");
        assert_eq!(short_commit(" unknown "), "unknown");
    }

    #[test]
    fn startup_message_aligns_keys() {
        let entries = [
            ("listen", "tcp:8080".to_string()),
            ("smtp_password_set", "true".to_string()),
        ];
        let message = startup_message("Startup configuration", &entries);
        assert!(message.contains("H E M S I D A"));
        assert!(message.contains("\n  listen:            tcp:8080"));
        assert!(message.contains("\n  smtp_password_set: true"));
    }
}
