use crate::api::email::{MailTransport, SmtpSecurity};
use anyhow::{Result, anyhow, bail};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_MAIL_TRANSPORT: &str = "mail-transport";
pub const ARG_SMTP_HOST: &str = "smtp-host";
pub const ARG_SMTP_PORT: &str = "smtp-port";
pub const ARG_SMTP_TLS: &str = "smtp-tls";
pub const ARG_SMTP_USER: &str = "smtp-user";
pub const ARG_SMTP_PASSWORD: &str = "smtp-password";
pub const ARG_MAIL_FROM: &str = "mail-from";
pub const ARG_MAIL_TO: &str = "mail-to";

#[derive(Debug, Clone)]
pub struct Options {
    pub transport: MailTransport,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_security: SmtpSecurity,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<SecretString>,
    pub from: String,
    pub to: String,
}

impl Options {
    /// Parse mail arguments from matches.
    ///
    /// A missing SMTP host is not an error here; it surfaces as a failed
    /// delivery on the first submission.
    ///
    /// # Errors
    /// Returns an error if the transport or TLS mode is unknown.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let get_non_empty = |id: &str| {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
        };

        let transport = get_non_empty(ARG_MAIL_TRANSPORT)
            .unwrap_or_else(|| "smtp".to_string())
            .parse::<MailTransport>()
            .map_err(|e| anyhow!(e))?;
        let smtp_security = get_non_empty(ARG_SMTP_TLS)
            .unwrap_or_else(|| "starttls".to_string())
            .parse::<SmtpSecurity>()
            .map_err(|e| anyhow!(e))?;

        let Some(from) = get_non_empty(ARG_MAIL_FROM) else {
            bail!("missing required argument: --{ARG_MAIL_FROM}");
        };
        let Some(to) = get_non_empty(ARG_MAIL_TO) else {
            bail!("missing required argument: --{ARG_MAIL_TO}");
        };

        Ok(Self {
            transport,
            smtp_host: get_non_empty(ARG_SMTP_HOST),
            smtp_port: matches.get_one::<u16>(ARG_SMTP_PORT).copied().unwrap_or(587),
            smtp_security,
            smtp_user: get_non_empty(ARG_SMTP_USER),
            smtp_password: get_non_empty(ARG_SMTP_PASSWORD).map(SecretString::from),
            from,
            to,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_MAIL_TRANSPORT)
                .long(ARG_MAIL_TRANSPORT)
                .help("Outbound mail transport: smtp or log")
                .long_help(
                    "Outbound mail transport.\n\n`smtp` relays contact messages through the configured SMTP server.\n`log` writes them to the log instead, for local development.",
                )
                .env("HEMSIDA_MAIL_TRANSPORT")
                .default_value("smtp"),
        )
        .arg(
            Arg::new(ARG_SMTP_HOST)
                .long(ARG_SMTP_HOST)
                .help("SMTP server host")
                .env("HEMSIDA_SMTP_HOST"),
        )
        .arg(
            Arg::new(ARG_SMTP_PORT)
                .long(ARG_SMTP_PORT)
                .help("SMTP server port")
                .env("HEMSIDA_SMTP_PORT")
                .default_value("587")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_SMTP_TLS)
                .long(ARG_SMTP_TLS)
                .help("SMTP TLS mode: starttls, implicit or none")
                .env("HEMSIDA_SMTP_TLS")
                .default_value("starttls"),
        )
        .arg(
            Arg::new(ARG_SMTP_USER)
                .long(ARG_SMTP_USER)
                .help("SMTP username")
                .env("HEMSIDA_SMTP_USER"),
        )
        .arg(
            Arg::new(ARG_SMTP_PASSWORD)
                .long(ARG_SMTP_PASSWORD)
                .help("SMTP password")
                .env("HEMSIDA_SMTP_PASSWORD")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_MAIL_FROM)
                .long(ARG_MAIL_FROM)
                .help("Sender address for contact messages")
                .env("HEMSIDA_MAIL_FROM")
                .default_value("noreply@example.se"),
        )
        .arg(
            Arg::new(ARG_MAIL_TO)
                .long(ARG_MAIL_TO)
                .help("Recipient address for contact messages")
                .env("HEMSIDA_MAIL_TO")
                .default_value("info@example.se"),
        )
}
