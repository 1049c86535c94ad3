//! API handlers for the website backend.
//!
//! Each submodule owns one area of the public surface: the contact relay,
//! the admin gate and its session endpoints, generated site metadata, and the
//! minimal HTML shells for the route map.

pub mod auth;
pub mod contact;
pub mod health;
pub mod pages;
pub mod site;
