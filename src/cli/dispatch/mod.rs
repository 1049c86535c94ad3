//! Map validated CLI arguments to the action to run.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{ARG_PORT, admin, mail, site};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);

    let site_opts = site::Options::parse(matches)?;
    let mail_opts = mail::Options::parse(matches)?;
    let admin_opts = admin::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        site: site_opts.site,
        mail_transport: mail_opts.transport,
        smtp_host: mail_opts.smtp_host,
        smtp_port: mail_opts.smtp_port,
        smtp_security: mail_opts.smtp_security,
        smtp_user: mail_opts.smtp_user,
        smtp_password: mail_opts.smtp_password,
        mail_from: mail_opts.from,
        mail_to: mail_opts.to,
        admin: admin_opts.credentials,
        session_ttl_seconds: admin_opts.session_ttl_seconds,
    }))
}
