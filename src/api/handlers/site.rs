//! Generated `robots.txt` and `sitemap.xml`.
//!
//! The route registry is static; priorities and change frequencies do not
//! depend on content.

use anyhow::{Context, Result, anyhow};
use axum::{
    extract::Extension,
    http::header::CONTENT_TYPE,
    response::IntoResponse,
};
use std::sync::Arc;
use url::Url;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeFrequency {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFrequency {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Never => "never",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SiteRoute {
    pub path: &'static str,
    pub change_frequency: ChangeFrequency,
    /// Sitemap priority in tenths (10 = 1.0).
    pub priority_tenths: u8,
}

impl SiteRoute {
    #[must_use]
    pub fn priority(&self) -> String {
        format!("{}.{}", self.priority_tenths / 10, self.priority_tenths % 10)
    }
}

pub const ROUTES: [SiteRoute; 6] = [
    SiteRoute {
        path: "/",
        change_frequency: ChangeFrequency::Weekly,
        priority_tenths: 10,
    },
    SiteRoute {
        path: "/tjanster",
        change_frequency: ChangeFrequency::Monthly,
        priority_tenths: 9,
    },
    SiteRoute {
        path: "/kontakt",
        change_frequency: ChangeFrequency::Monthly,
        priority_tenths: 8,
    },
    SiteRoute {
        path: "/integritetspolicy",
        change_frequency: ChangeFrequency::Yearly,
        priority_tenths: 3,
    },
    SiteRoute {
        path: "/admin",
        change_frequency: ChangeFrequency::Monthly,
        priority_tenths: 1,
    },
    SiteRoute {
        path: "/admin/login",
        change_frequency: ChangeFrequency::Yearly,
        priority_tenths: 1,
    },
];

#[derive(Clone, Debug)]
pub struct SiteConfig {
    base_url: Url,
}

impl SiteConfig {
    /// # Errors
    /// Returns an error unless `site_url` is an absolute http(s) URL with a host.
    pub fn parse(site_url: &str) -> Result<Self> {
        let base_url =
            Url::parse(site_url).with_context(|| format!("Invalid site URL: {site_url}"))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(anyhow!("Site URL must use http or https: {site_url}"));
        }
        if base_url.host_str().is_none() {
            return Err(anyhow!("Site URL must include a valid host: {site_url}"));
        }
        Ok(Self { base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Absolute URL for a site path.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.as_str().trim_end_matches('/'))
    }
}

#[must_use]
pub fn sitemap_xml(config: &SiteConfig) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for route in &ROUTES {
        xml.push_str(&format!(
            "  <url>\n    <loc>{}</loc>\n    <changefreq>{}</changefreq>\n    <priority>{}</priority>\n  </url>\n",
            xml_escape(&config.url_for(route.path)),
            route.change_frequency.as_str(),
            route.priority(),
        ));
    }
    xml.push_str("</urlset>\n");
    xml
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[must_use]
pub fn robots_txt(config: &SiteConfig) -> String {
    format!(
        "User-agent: *\nAllow: /\nDisallow: /admin\nDisallow: /api/\n\nSitemap: {}\n",
        config.url_for("/sitemap.xml")
    )
}

pub async fn sitemap(config: Extension<Arc<SiteConfig>>) -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "application/xml; charset=utf-8")],
        sitemap_xml(&config),
    )
}

pub async fn robots(config: Extension<Arc<SiteConfig>>) -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        robots_txt(&config),
    )
}
