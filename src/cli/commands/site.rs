use crate::api::handlers::site::SiteConfig;
use anyhow::Result;
use clap::{Arg, ArgMatches, Command};

pub const ARG_SITE_URL: &str = "site-url";

#[derive(Debug, Clone)]
pub struct Options {
    pub site: SiteConfig,
}

impl Options {
    /// # Errors
    /// Returns an error if the site URL is not an absolute http(s) URL.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let url = matches
            .get_one::<String>(ARG_SITE_URL)
            .map_or("https://www.example.se", String::as_str);
        Ok(Self {
            site: SiteConfig::parse(url)?,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_SITE_URL)
            .long(ARG_SITE_URL)
            .help("Public base URL of the site")
            .long_help(
                "Public base URL of the site. Used for sitemap and robots.txt links and to decide whether the session cookie is marked Secure.",
            )
            .env("HEMSIDA_SITE_URL")
            .default_value("https://www.example.se"),
    )
}
