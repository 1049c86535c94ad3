//! # Hemsida (company website backend)
//!
//! `hemsida` serves the dynamic parts of the company website:
//!
//! - **Contact form relay:** `POST /api/contact-email` formats a visitor's
//!   inquiry and hands it to an outbound mail transport (SMTP in production,
//!   a logging sender for local development). Nothing is persisted.
//! - **Admin gate:** every visitor session owns an explicit auth context. A
//!   route guard waits for that context to resolve and either renders the
//!   admin area or redirects to `/admin/login`. The gate is UX only; it is not
//!   a security boundary for anything beyond the admin shell.
//! - **Site metadata:** `robots.txt` and `sitemap.xml` generated from a static
//!   route registry.
//!
//! Page layout, styling and animation live in the frontend and have no
//! counterpart here beyond minimal HTML shells.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
