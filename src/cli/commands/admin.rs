use anyhow::{Result, bail};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_ADMIN_EMAIL: &str = "admin-email";
pub const ARG_ADMIN_PASSWORD: &str = "admin-password";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";

#[derive(Debug, Clone)]
pub struct Options {
    /// `None` when no admin account is configured; the login form then
    /// rejects every attempt.
    pub credentials: Option<(String, SecretString)>,
    pub session_ttl_seconds: u64,
}

impl Options {
    /// Parse admin arguments from matches.
    ///
    /// # Errors
    /// Returns an error if only one of email and password is set, or the TTL is zero.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let get_non_empty = |id: &str| {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
        };

        let credentials = match (
            get_non_empty(ARG_ADMIN_EMAIL),
            get_non_empty(ARG_ADMIN_PASSWORD),
        ) {
            (Some(email), Some(password)) => Some((email, SecretString::from(password))),
            (None, None) => None,
            (Some(_), None) => bail!("missing required argument: --{ARG_ADMIN_PASSWORD}"),
            (None, Some(_)) => bail!("missing required argument: --{ARG_ADMIN_EMAIL}"),
        };

        let session_ttl_seconds = matches
            .get_one::<u64>(ARG_SESSION_TTL_SECONDS)
            .copied()
            .unwrap_or(28_800);
        if session_ttl_seconds == 0 {
            bail!("--{ARG_SESSION_TTL_SECONDS} must be greater than zero");
        }

        Ok(Self {
            credentials,
            session_ttl_seconds,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_ADMIN_EMAIL)
                .long(ARG_ADMIN_EMAIL)
                .help("Email of the admin account")
                .env("HEMSIDA_ADMIN_EMAIL"),
        )
        .arg(
            Arg::new(ARG_ADMIN_PASSWORD)
                .long(ARG_ADMIN_PASSWORD)
                .help("Password of the admin account")
                .env("HEMSIDA_ADMIN_PASSWORD")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Admin session lifetime in seconds")
                .env("HEMSIDA_SESSION_TTL_SECONDS")
                .default_value("28800")
                .value_parser(clap::value_parser!(u64)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 3] = [
        "HEMSIDA_ADMIN_EMAIL",
        "HEMSIDA_ADMIN_PASSWORD",
        "HEMSIDA_SESSION_TTL_SECONDS",
    ];

    fn matches(args: &[&str]) -> ArgMatches {
        let mut argv = vec!["hemsida"];
        argv.extend_from_slice(args);
        with_args(Command::new("hemsida")).get_matches_from(argv)
    }

    #[test]
    fn no_admin_configured() -> Result<()> {
        temp_env::with_vars_unset(VARS, || {
            let options = Options::parse(&matches(&[]))?;
            assert!(options.credentials.is_none());
            assert_eq!(options.session_ttl_seconds, 28_800);
            Ok(())
        })
    }

    #[test]
    fn email_without_password_fails() {
        temp_env::with_vars_unset(VARS, || {
            let result = Options::parse(&matches(&["--admin-email", "admin@example.se"]));
            assert!(
                result
                    .err()
                    .is_some_and(|err| err.to_string().contains("--admin-password"))
            );
        });
    }

    #[test]
    fn credentials_from_env() -> Result<()> {
        temp_env::with_vars(
            [
                ("HEMSIDA_ADMIN_EMAIL", Some("admin@example.se")),
                ("HEMSIDA_ADMIN_PASSWORD", Some("s3cret")),
                ("HEMSIDA_SESSION_TTL_SECONDS", Some("600")),
            ],
            || {
                let options = Options::parse(&matches(&[]))?;
                let email = options.credentials.as_ref().map(|(email, _)| email.as_str());
                assert_eq!(email, Some("admin@example.se"));
                assert_eq!(options.session_ttl_seconds, 600);
                Ok(())
            },
        )
    }

    #[test]
    fn zero_ttl_fails() {
        temp_env::with_vars_unset(VARS, || {
            let result = Options::parse(&matches(&["--session-ttl-seconds", "0"]));
            assert!(result.is_err());
        });
    }
}
