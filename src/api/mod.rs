use crate::api::{
    email::{EmailSender, MailConfig},
    handlers::{
        auth::{self, AuthState, require_session},
        health, pages,
        site::{self, SiteConfig},
    },
};
use anyhow::{Context, Result};
use axum::{
    Extension, Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware::from_fn,
    routing::{get, options, post},
};
use std::{sync::Arc, time::Duration};
use tokio::{net::TcpListener, signal};
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{Span, info, info_span};
use ulid::Ulid;
use utoipa_axum::router::OpenApiRouter;

pub mod email;
pub mod handlers;
// OpenAPI router wiring and route registration live in openapi.rs.
mod openapi;

pub use openapi::openapi;

const SESSION_REAP_INTERVAL: Duration = Duration::from_secs(60);

/// Build the API router with all documented routes registered.
#[must_use]
pub fn router() -> OpenApiRouter {
    openapi::api_router()
}

/// Assemble the full application: documented API routes, page shells, site
/// metadata and the guarded admin area, with shared state as extensions.
pub fn app(
    sender: Arc<dyn EmailSender>,
    mail_config: Arc<MailConfig>,
    auth_state: Arc<AuthState>,
    site_config: Arc<SiteConfig>,
) -> Router {
    let admin = Router::new()
        .route("/admin", get(pages::admin))
        .route_layer(from_fn(require_session));

    let (router, _openapi) = router().split_for_parts();
    router
        .route("/", get(pages::home))
        .route("/tjanster", get(pages::services))
        .route("/kontakt", get(pages::contact))
        .route("/integritetspolicy", get(pages::privacy))
        .route(
            "/admin/login",
            get(pages::login).post(auth::login::login_form),
        )
        .route("/admin/logout", post(auth::login::logout_form))
        .route("/robots.txt", get(site::robots))
        .route("/sitemap.xml", get(site::sitemap))
        .route("/health", options(health::health))
        .merge(admin)
        .fallback(pages::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(sender))
                .layer(Extension(mail_config))
                .layer(Extension(auth_state))
                .layer(Extension(site_config)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(
    port: u16,
    mail_config: MailConfig,
    auth_state: AuthState,
    site_config: SiteConfig,
) -> Result<()> {
    let sender = mail_config.sender();
    let auth_state = Arc::new(auth_state);

    auth::spawn_session_reaper(auth_state.sessions(), SESSION_REAP_INTERVAL);

    let app = app(
        sender,
        Arc::new(mail_config),
        auth_state,
        Arc::new(site_config),
    );

    let listener = TcpListener::bind(format!("::0:{port}"))
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if let Err(err) = shutdown_signal().await {
                tracing::error!("Failed to listen for shutdown signal: {err:#}");
            }
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => res,
        res = terminate => res,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{email::LogEmailSender, handlers::auth::AuthConfig};
    use auth::DisabledAuthProvider;
    use axum::http::{StatusCode, header::LOCATION};
    use tower::ServiceExt;

    fn test_app() -> Result<Router> {
        let site = SiteConfig::parse("https://www.example.se")?;
        let auth_state = AuthState::new(
            AuthConfig::new(site.base_url().to_string()),
            Arc::new(DisabledAuthProvider),
        );
        Ok(app(
            Arc::new(LogEmailSender),
            Arc::new(MailConfig::new()),
            Arc::new(auth_state),
            Arc::new(site),
        ))
    }

    #[tokio::test]
    async fn request_id_is_propagated() -> Result<()> {
        let response = test_app()?
            .oneshot(Request::builder().uri("/").body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        assert!(Ulid::from_string(request_id).is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn admin_redirects_without_session() -> Result<()> {
        let response = test_app()?
            .oneshot(Request::builder().uri("/admin").body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
            Some("/admin/login")
        );
        Ok(())
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() -> Result<()> {
        let response = test_app()?
            .oneshot(Request::builder().uri("/saknas").body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn site_metadata_is_served() -> Result<()> {
        let app = test_app()?;
        let robots = app
            .clone()
            .oneshot(Request::builder().uri("/robots.txt").body(Body::empty())?)
            .await?;
        assert_eq!(robots.status(), StatusCode::OK);

        let sitemap = app
            .oneshot(Request::builder().uri("/sitemap.xml").body(Body::empty())?)
            .await?;
        assert_eq!(sitemap.status(), StatusCode::OK);
        assert!(
            sitemap
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.starts_with("application/xml"))
        );
        Ok(())
    }
}
