//! Login, logout and session endpoints for the admin gate.
//!
//! The JSON endpoints under `/api/auth` serve script-driven clients; the
//! `/admin/login` and `/admin/logout` form posts answer with redirects so the
//! plain HTML shells work without JavaScript.

use super::{
    guard::LOGIN_PATH,
    session::UserId,
    state::{AuthState, SESSION_COOKIE_NAME, extract_session_token},
    types::{AuthErrorResponse, LoginRequest, SessionResponse},
};
use anyhow::Result;
use axum::{
    Form, Json,
    extract::Extension,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{InvalidHeaderValue, SET_COOKIE},
    },
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

const ADMIN_PATH: &str = "/admin";
const INVALID_CREDENTIALS: &str = "Fel e-postadress eller lösenord.";

/// Open a session for the given credentials.
///
/// The session is registered while still `loading` and resolved by the
/// provider's answer; rejected attempts are torn down again.
async fn open_session(
    auth_state: &AuthState,
    email: &str,
    password: &str,
) -> Result<Option<(String, UserId)>> {
    let sessions = auth_state.sessions();
    let (token, context) = sessions.create().await?;

    if let Some(user) = auth_state.provider().authenticate(email, password) {
        context.sign_in(user.clone());
        info!(user = %user, "admin signed in");
        Ok(Some((token, user)))
    } else {
        sessions.remove(&token).await;
        warn!("rejected admin login");
        Ok(None)
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in; session cookie set", body = SessionResponse),
        (status = 401, description = "Invalid credentials", body = AuthErrorResponse),
        (status = 500, description = "Session could not be created")
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    auth_state: Extension<Arc<AuthState>>,
    Json(request): Json<LoginRequest>,
) -> Response {
    match open_session(&auth_state, &request.email, &request.password).await {
        Ok(Some((token, user))) => {
            let mut headers = HeaderMap::new();
            match session_cookie(&auth_state, &token) {
                Ok(cookie) => {
                    headers.insert(SET_COOKIE, cookie);
                }
                Err(err) => {
                    error!("Failed to build session cookie: {err}");
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
            }
            (StatusCode::OK, headers, Json(SessionResponse { user })).into_response()
        }
        Ok(None) => (
            StatusCode::UNAUTHORIZED,
            Json(AuthErrorResponse {
                message: INVALID_CREDENTIALS.to_string(),
            }),
        )
            .into_response(),
        Err(err) => {
            error!("Failed to create session: {err:#}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Form post from the login page.
#[instrument(skip_all)]
pub async fn login_form(
    auth_state: Extension<Arc<AuthState>>,
    Form(request): Form<LoginRequest>,
) -> Response {
    match open_session(&auth_state, &request.email, &request.password).await {
        Ok(Some((token, _user))) => match session_cookie(&auth_state, &token) {
            Ok(cookie) => ([(SET_COOKIE, cookie)], Redirect::to(ADMIN_PATH)).into_response(),
            Err(err) => {
                error!("Failed to build session cookie: {err}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        },
        Ok(None) => Redirect::to(&format!("{LOGIN_PATH}?error=1")).into_response(),
        Err(err) => {
            error!("Failed to create session: {err:#}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 204, description = "Session cleared")
    ),
    tag = "auth"
)]
pub async fn logout(headers: HeaderMap, auth_state: Extension<Arc<AuthState>>) -> Response {
    end_session(&headers, &auth_state).await;

    // Always clear the cookie, even if the session was already gone.
    let mut response_headers = HeaderMap::new();
    if let Ok(cookie) = clear_session_cookie(&auth_state) {
        response_headers.insert(SET_COOKIE, cookie);
    }
    (StatusCode::NO_CONTENT, response_headers).into_response()
}

/// Form post from the admin page.
pub async fn logout_form(headers: HeaderMap, auth_state: Extension<Arc<AuthState>>) -> Response {
    end_session(&headers, &auth_state).await;

    let mut response_headers = HeaderMap::new();
    if let Ok(cookie) = clear_session_cookie(&auth_state) {
        response_headers.insert(SET_COOKIE, cookie);
    }
    (response_headers, Redirect::to(LOGIN_PATH)).into_response()
}

async fn end_session(headers: &HeaderMap, auth_state: &AuthState) {
    if let Some(token) = extract_session_token(headers)
        && auth_state.sessions().remove(&token).await.is_some()
    {
        info!("admin signed out");
    }
}

#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses(
        (status = 200, description = "Session is active", body = SessionResponse),
        (status = 204, description = "No active session")
    ),
    tag = "auth"
)]
pub async fn session(headers: HeaderMap, auth_state: Extension<Arc<AuthState>>) -> Response {
    let context = auth_state.context_for(&headers).await;
    let current = context.current();
    match current.user() {
        Some(user) if current.is_authenticated() => (
            StatusCode::OK,
            Json(SessionResponse { user: user.clone() }),
        )
            .into_response(),
        _ => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Build an `HttpOnly` cookie for the session token.
fn session_cookie(auth_state: &AuthState, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = auth_state.config().session_ttl_seconds();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    if auth_state.config().session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_session_cookie(auth_state: &AuthState) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if auth_state.config().session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::{provider::StaticAdminProvider, state::AuthConfig};
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{
            Request,
            header::{CONTENT_TYPE, COOKIE, LOCATION},
        },
        routing::{get, post},
    };
    use secrecy::SecretString;
    use tower::ServiceExt;

    fn state(site_url: &str) -> Arc<AuthState> {
        Arc::new(AuthState::new(
            AuthConfig::new(site_url.to_string()).with_session_ttl_seconds(3600),
            Arc::new(StaticAdminProvider::new(
                "admin@example.se",
                SecretString::from("hemligt"),
            )),
        ))
    }

    fn app(state: Arc<AuthState>) -> Router {
        Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/logout", post(logout))
            .route("/api/auth/session", get(session))
            .route("/admin/login", post(login_form))
            .layer(Extension(state))
    }

    fn login_request(password: &str) -> Result<Request<Body>> {
        Ok(Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(format!(
                r#"{{"email":"admin@example.se","password":"{password}"}}"#
            )))?)
    }

    fn session_token(response: &Response) -> Option<String> {
        let cookie = response.headers().get(SET_COOKIE)?.to_str().ok()?;
        let pair = cookie.split(';').next()?;
        let token = pair.strip_prefix(&format!("{SESSION_COOKIE_NAME}="))?;
        Some(token.to_string())
    }

    #[tokio::test]
    async fn login_sets_cookie_and_session_resolves() -> Result<()> {
        let state = state("https://www.example.se");
        let response = app(state.clone()).oneshot(login_request("hemligt")?).await?;
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = response
            .headers()
            .get(SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(cookie.ends_with("; Secure"));

        let token = session_token(&response).unwrap_or_default();
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        let payload: SessionResponse = serde_json::from_slice(&body)?;
        assert_eq!(payload.user, UserId::new("admin@example.se"));

        let response = app(state)
            .oneshot(
                Request::builder()
                    .uri("/api/auth/session")
                    .header(COOKIE, format!("{SESSION_COOKIE_NAME}={token}"))
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn wrong_password_is_rejected_and_leaves_no_session() -> Result<()> {
        let state = state("http://localhost:8080");
        let response = app(state.clone()).oneshot(login_request("fel")?).await?;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(SET_COOKIE).is_none());
        assert_eq!(state.sessions().len().await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn session_without_cookie_is_no_content() -> Result<()> {
        let response = app(state("http://localhost:8080"))
            .oneshot(
                Request::builder()
                    .uri("/api/auth/session")
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        Ok(())
    }

    #[tokio::test]
    async fn logout_tears_down_session() -> Result<()> {
        let state = state("http://localhost:8080");
        let response = app(state.clone()).oneshot(login_request("hemligt")?).await?;
        let token = session_token(&response).unwrap_or_default();
        assert!(!token.is_empty());

        let response = app(state.clone())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/logout")
                    .header(COOKIE, format!("{SESSION_COOKIE_NAME}={token}"))
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(
            response
                .headers()
                .get(SET_COOKIE)
                .and_then(|value| value.to_str().ok())
                .is_some_and(|cookie| cookie.contains("Max-Age=0"))
        );
        assert!(state.sessions().lookup(&token).await.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn login_form_redirects() -> Result<()> {
        let state = state("http://localhost:8080");
        let form = |password: &str| -> Result<Request<Body>> {
            Ok(Request::builder()
                .method("POST")
                .uri("/admin/login")
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(format!(
                    "email=admin%40example.se&password={password}"
                )))?)
        };

        let response = app(state.clone()).oneshot(form("hemligt")?).await?;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok()),
            Some(ADMIN_PATH)
        );
        assert!(session_token(&response).is_some());

        let response = app(state).oneshot(form("fel")?).await?;
        assert_eq!(
            response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok()),
            Some("/admin/login?error=1")
        );
        Ok(())
    }
}
