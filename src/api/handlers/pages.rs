//! Minimal HTML shells for the route map.
//!
//! Layout and styling belong to the frontend; these pages only carry a title,
//! a heading and whatever form the route needs.

use super::auth::{AuthState, CurrentUser};
use axum::{
    extract::{Extension, Query},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;

const SITE_NAME: &str = "Företaget";

fn document(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"sv\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title} | {SITE_NAME}</title>\n</head>\n<body>\n{body}\n</body>\n</html>\n"
    ))
}

pub async fn home() -> Html<String> {
    document("Hem", "<main><h1>Välkommen</h1></main>")
}

pub async fn services() -> Html<String> {
    document("Tjänster", "<main><h1>Våra tjänster</h1></main>")
}

pub async fn contact() -> Html<String> {
    document(
        "Kontakt",
        "<main><h1>Kontakta oss</h1>\
         <form id=\"contact\" data-endpoint=\"/api/contact-email\">\
         <input name=\"name\" required><input name=\"email\" type=\"email\" required>\
         <input name=\"phone\"><input name=\"company\">\
         <textarea name=\"message\" required></textarea>\
         <button type=\"submit\">Skicka</button></form></main>",
    )
}

pub async fn privacy() -> Html<String> {
    document("Integritetspolicy", "<main><h1>Integritetspolicy</h1></main>")
}

/// Protected admin page; only reachable through the route guard.
pub async fn admin(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Html<String> {
    document(
        "Admin",
        &format!(
            "<main><h1>Admin</h1><p>Inloggad som {user}</p>\
             <form method=\"post\" action=\"/admin/logout\">\
             <button type=\"submit\">Logga ut</button></form></main>"
        ),
    )
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    error: Option<String>,
}

pub async fn login(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    Query(query): Query<LoginQuery>,
) -> Response {
    // Already signed in: nothing to do here.
    if auth_state
        .context_for(&headers)
        .await
        .current()
        .is_authenticated()
    {
        return Redirect::to("/admin").into_response();
    }

    let error = if query.error.is_some() {
        "<p role=\"alert\">Fel e-postadress eller lösenord.</p>"
    } else {
        ""
    };

    document(
        "Logga in",
        &format!(
            "<main><h1>Logga in</h1>{error}\
             <form method=\"post\" action=\"/admin/login\">\
             <input name=\"email\" type=\"email\" required>\
             <input name=\"password\" type=\"password\" required>\
             <button type=\"submit\">Logga in</button></form></main>"
        ),
    )
    .into_response()
}

/// Placeholder shown while the auth context is still resolving.
#[must_use]
pub fn loading() -> Html<String> {
    document(
        "Laddar",
        "<main aria-busy=\"true\"><div class=\"spinner\" role=\"status\">Laddar…</div></main>",
    )
}

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        document("Sidan hittades inte", "<main><h1>404</h1></main>"),
    )
}
