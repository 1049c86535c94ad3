//! Outbound mail message and delivery abstractions.
//!
//! Handlers format an `EmailMessage` and hand it to an `EmailSender`. The sender
//! decides how to deliver (SMTP, log, ...) and returns `Ok`/`Err`; there is no
//! queue and no retry, a failed send is reported straight back to the caller.
//!
//! `SmtpEmailSender` builds its transport from `MailConfig` on every send. A
//! malformed configuration (missing host, bad addresses, half-set credentials)
//! therefore never blocks startup; it surfaces as a send error instead.
//!
//! The default sender for local dev is `LogEmailSender`, which logs and returns `Ok(())`.
use anyhow::{Context, Result, anyhow};
use lettre::{
    Message, SmtpTransport, Transport,
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
};
use secrecy::{ExposeSecret, SecretString};
use std::{fmt, str::FromStr, sync::Arc, time::Duration};
use tracing::{debug, info, instrument};

const SMTP_TIMEOUT_SECONDS: u64 = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub html: String,
    pub text: String,
}

impl EmailMessage {
    /// Build the MIME message (plain text + HTML alternatives).
    ///
    /// `reply_to` is best effort: an address that is not a valid mailbox is
    /// left out and the message is built without it.
    ///
    /// # Errors
    /// Returns an error if `from` or `to` does not parse as a mailbox.
    pub fn to_mime(&self) -> Result<Message> {
        let from = parse_mailbox("from", &self.from)?;
        let to = parse_mailbox("to", &self.to)?;

        let mut builder = Message::builder()
            .from(from)
            .to(to)
            .subject(self.subject.as_str());

        if let Some(reply_to) = &self.reply_to {
            match reply_to.trim().parse::<Mailbox>() {
                Ok(mailbox) => builder = builder.reply_to(mailbox),
                Err(err) => debug!("Skipping Reply-To {reply_to:?}: {err}"),
            }
        }

        builder
            .multipart(MultiPart::alternative_plain_html(
                self.text.clone(),
                self.html.clone(),
            ))
            .context("failed to build email message")
    }
}

fn parse_mailbox(field: &str, address: &str) -> Result<Mailbox> {
    address
        .trim()
        .parse::<Mailbox>()
        .with_context(|| format!("invalid {field} address: {address}"))
}

/// Email delivery abstraction used by the contact handler.
pub trait EmailSender: Send + Sync {
    /// Deliver a message or return an error describing why it was not sent.
    fn send(&self, message: &EmailMessage) -> Result<()>;

    /// Short transport name reported by `/health`.
    fn kind(&self) -> &'static str;
}

/// Local dev sender that logs the message instead of sending real email.
#[derive(Clone, Debug)]
pub struct LogEmailSender;

impl EmailSender for LogEmailSender {
    fn send(&self, message: &EmailMessage) -> Result<()> {
        info!(
            to_email = %message.to,
            reply_to = message.reply_to.as_deref().unwrap_or("none"),
            subject = %message.subject,
            body = %message.text,
            "email send stub"
        );
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "log"
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MailTransport {
    #[default]
    Smtp,
    Log,
}

impl MailTransport {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Smtp => "smtp",
            Self::Log => "log",
        }
    }
}

impl FromStr for MailTransport {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "smtp" => Ok(Self::Smtp),
            "log" => Ok(Self::Log),
            other => Err(format!("unsupported mail transport: {other}")),
        }
    }
}

/// How the SMTP connection is secured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SmtpSecurity {
    /// Plain connection upgraded with `STARTTLS` (usually port 587).
    #[default]
    StartTls,
    /// TLS from the first byte (usually port 465).
    Implicit,
    /// No TLS at all. Local relays and test servers only.
    None,
}

impl SmtpSecurity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StartTls => "starttls",
            Self::Implicit => "implicit",
            Self::None => "none",
        }
    }
}

impl FromStr for SmtpSecurity {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "starttls" => Ok(Self::StartTls),
            "implicit" | "tls" | "ssl" => Ok(Self::Implicit),
            "none" | "plain" => Ok(Self::None),
            other => Err(format!("unsupported SMTP TLS mode: {other}")),
        }
    }
}

#[derive(Clone)]
pub struct MailConfig {
    transport: MailTransport,
    smtp_host: Option<String>,
    smtp_port: u16,
    smtp_security: SmtpSecurity,
    smtp_user: Option<String>,
    smtp_password: Option<SecretString>,
    from: String,
    to: String,
}

impl MailConfig {
    /// Default config: SMTP on port 587 with `STARTTLS`, no host, and the
    /// default site sender/recipient addresses.
    #[must_use]
    pub fn new() -> Self {
        Self {
            transport: MailTransport::Smtp,
            smtp_host: None,
            smtp_port: 587,
            smtp_security: SmtpSecurity::StartTls,
            smtp_user: None,
            smtp_password: None,
            from: "noreply@example.se".to_string(),
            to: "info@example.se".to_string(),
        }
    }

    #[must_use]
    pub fn with_transport(mut self, transport: MailTransport) -> Self {
        self.transport = transport;
        self
    }

    #[must_use]
    pub fn with_smtp_host(mut self, host: Option<String>) -> Self {
        self.smtp_host = host;
        self
    }

    #[must_use]
    pub fn with_smtp_port(mut self, port: u16) -> Self {
        self.smtp_port = port;
        self
    }

    #[must_use]
    pub fn with_smtp_security(mut self, security: SmtpSecurity) -> Self {
        self.smtp_security = security;
        self
    }

    #[must_use]
    pub fn with_smtp_user(mut self, user: Option<String>) -> Self {
        self.smtp_user = user;
        self
    }

    #[must_use]
    pub fn with_smtp_password(mut self, password: Option<SecretString>) -> Self {
        self.smtp_password = password;
        self
    }

    #[must_use]
    pub fn with_from(mut self, from: String) -> Self {
        self.from = from;
        self
    }

    #[must_use]
    pub fn with_to(mut self, to: String) -> Self {
        self.to = to;
        self
    }

    #[must_use]
    pub fn transport(&self) -> MailTransport {
        self.transport
    }

    #[must_use]
    pub fn smtp_host(&self) -> Option<&str> {
        self.smtp_host.as_deref()
    }

    #[must_use]
    pub fn smtp_port(&self) -> u16 {
        self.smtp_port
    }

    #[must_use]
    pub fn smtp_security(&self) -> SmtpSecurity {
        self.smtp_security
    }

    #[must_use]
    pub fn from(&self) -> &str {
        &self.from
    }

    #[must_use]
    pub fn to(&self) -> &str {
        &self.to
    }

    /// Pick the sender for the configured transport.
    #[must_use]
    pub fn sender(&self) -> Arc<dyn EmailSender> {
        match self.transport {
            MailTransport::Smtp => Arc::new(SmtpEmailSender::new(self.clone())),
            MailTransport::Log => Arc::new(LogEmailSender),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("transport", &self.transport)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_security", &self.smtp_security)
            .field("smtp_user", &self.smtp_user)
            .field(
                "smtp_password",
                &self.smtp_password.as_ref().map(|_| "***"),
            )
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}

/// Sends through an SMTP relay using the blocking `lettre` transport.
///
/// Callers on the async runtime must run `send` on the blocking pool.
#[derive(Clone, Debug)]
pub struct SmtpEmailSender {
    config: MailConfig,
}

impl SmtpEmailSender {
    #[must_use]
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    fn transport(&self) -> Result<SmtpTransport> {
        let host = self
            .config
            .smtp_host()
            .map(str::trim)
            .filter(|host| !host.is_empty())
            .ok_or_else(|| anyhow!("SMTP host is not configured"))?;

        let builder = match self.config.smtp_security() {
            SmtpSecurity::Implicit => SmtpTransport::relay(host)
                .with_context(|| format!("invalid SMTP relay host: {host}"))?,
            SmtpSecurity::StartTls => SmtpTransport::starttls_relay(host)
                .with_context(|| format!("invalid SMTP relay host: {host}"))?,
            SmtpSecurity::None => SmtpTransport::builder_dangerous(host),
        };

        let builder = builder
            .port(self.config.smtp_port())
            .timeout(Some(Duration::from_secs(SMTP_TIMEOUT_SECONDS)));

        let builder = match (&self.config.smtp_user, &self.config.smtp_password) {
            (Some(user), Some(password)) => builder.credentials(Credentials::new(
                user.clone(),
                password.expose_secret().to_string(),
            )),
            (None, None) => builder,
            _ => return Err(anyhow!("SMTP user and password must be set together")),
        };

        Ok(builder.build())
    }
}

impl EmailSender for SmtpEmailSender {
    #[instrument(skip_all, fields(smtp.host = self.config.smtp_host().unwrap_or("none"), smtp.port = self.config.smtp_port()))]
    fn send(&self, message: &EmailMessage) -> Result<()> {
        let transport = self.transport()?;
        let mime = message.to_mime()?;

        let response = transport
            .send(&mime)
            .context("SMTP delivery failed")?;

        debug!(code = %response.code(), "SMTP relay accepted message");

        Ok(())
    }

    fn kind(&self) -> &'static str {
        MailTransport::Smtp.as_str()
    }
}
