use axum::{Json, Router, routing::get};
use core_config::AppInfo;
use domain_emails::{
    EmailRepository, EmailService, InMemoryEmailRepository, PgEmailRepository, handlers,
};
use serde_json::{Value, json};
use std::path::Path;
use tower_http::services::ServeDir;

use crate::state::AppState;

pub mod health;

/// Creates the API routes without the `/api` prefix.
/// The `/api` prefix will be added by the `create_router` helper.
pub fn routes(state: &AppState) -> Router {
    Router::new().nest("/emails", emails_router(state))
}

/// Email routes over Postgres when a pool is configured, otherwise in memory.
fn emails_router(state: &AppState) -> Router {
    match &state.db {
        Some(db) => handlers::router(email_service(PgEmailRepository::new(db.clone()), state)),
        None => {
            tracing::warn!("No database configured, email records are kept in memory");
            handlers::router(email_service(InMemoryEmailRepository::new(), state))
        }
    }
}

fn email_service<R: EmailRepository>(repository: R, state: &AppState) -> EmailService<R> {
    EmailService::new(repository, state.sender.clone()).with_templates(state.templates.clone())
}

/// `GET /` welcome message.
pub fn root_router(app: AppInfo) -> Router {
    Router::new().route(
        "/",
        get(move || async move { Json(welcome(app)) }),
    )
}

fn welcome(app: AppInfo) -> Value {
    json!({
        "message": format!("Welcome to {}", app.name),
        "version": app.version,
        "docs": "/swagger-ui"
    })
}

/// Serves `dir` under `/public` when it exists.
pub fn static_router(dir: &Path) -> Option<Router> {
    if !dir.is_dir() {
        tracing::info!(static_dir = %dir.display(), "Static directory not found, /public disabled");
        return None;
    }

    Some(Router::new().nest_service("/public", ServeDir::new(dir)))
}

/// Creates a router with the /ready endpoint that performs actual health checks.
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use domain_emails::{InMemoryTemplateRenderer, MockSender};
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn state() -> AppState {
        let config = temp_env::with_vars_unset(
            ["DATABASE_URL", "PGDATABASE", "PORT", "APP_ENV", "ENVIRONMENT"],
            || Config::from_env().unwrap(),
        );
        AppState {
            config,
            db: None,
            sender: Arc::new(MockSender::new()),
            templates: Arc::new(InMemoryTemplateRenderer::with_defaults()),
        }
    }

    async fn json_body(body: Body) -> Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_root_welcome() {
        let app = root_router(core_config::app_info!());
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response.into_body()).await;
        assert_eq!(body["message"], "Welcome to mailer_api");
    }

    #[tokio::test]
    async fn test_email_routes_use_in_memory_store_without_db() {
        let app = routes(&state());
        let response = app
            .oneshot(Request::get("/emails").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response.into_body()).await;
        assert_eq!(body["total"], 0);
        assert_eq!(body["pageSize"], 10);
    }

    #[tokio::test]
    async fn test_ready_without_db() {
        let app = ready_router(state());
        let response = app
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response.into_body()).await;
        assert_eq!(body["status"], "ready");
    }

    #[tokio::test]
    async fn test_static_router_serves_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hello.txt"), "hi").unwrap();

        assert!(static_router(&dir.path().join("missing")).is_none());

        let app = static_router(dir.path()).unwrap();
        let response = app
            .oneshot(Request::get("/public/hello.txt").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"hi");
    }
}
