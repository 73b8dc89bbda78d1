//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: repositories, seed data and token issuer
//! - `routes/`: handlers, one file per area
//! - `dto.rs`: response DTOs
//! - `errors.rs`: consistent JSON error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::context::PageLocale;
use crate::middleware;
use crate::views::i18n::Locale;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::{AppServices, StartupError};

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: AppConfig) -> Result<Router, StartupError> {
    let services = services::build_services(config).await?;
    Ok(build_app_with(Arc::new(services)))
}

/// Router over already-built services.
pub fn build_app_with(services: Arc<AppServices>) -> Router {
    let session_state = middleware::SessionState {
        tokens: Arc::new(services.tokens.clone()),
    };

    let mut app = Router::new()
        .merge(routes::api_router())
        .merge(routes::pages_router(PageLocale::unprefixed(services.config.default_locale)));
    for locale in Locale::ALL {
        app = app.nest(
            &format!("/{}", locale.code()),
            routes::pages_router(PageLocale::prefixed(locale)),
        );
    }

    app.fallback(routes::pages::not_found).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(Extension(services))
            .layer(axum::middleware::from_fn_with_state(
                session_state,
                middleware::session_middleware,
            )),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app() -> Router {
        build_app_with(Arc::new(AppServices::in_memory(AppConfig::for_tests("secret"))))
    }

    async fn get(path: &str) -> axum::response::Response {
        app()
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn unknown_locale_renders_not_found_page() {
        let res = get("/fr/tags").await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body = res.into_body().collect().await.unwrap().to_bytes();
        assert!(String::from_utf8_lossy(&body).contains("Page not found"));
    }

    #[tokio::test]
    async fn gate_keeps_query_in_callback() {
        let res = get("/admin?page=2").await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        let location = res.headers().get(header::LOCATION).unwrap().to_str().unwrap();
        assert!(location.ends_with("callbackUrl=%2Fadmin%3Fpage%3D2"));
    }

    #[tokio::test]
    async fn locale_pages_are_mounted() {
        assert_eq!(get("/en/tags").await.status(), StatusCode::OK);
        assert_eq!(get("/ja/tags").await.status(), StatusCode::OK);
        assert_eq!(get("/tags").await.status(), StatusCode::OK);
    }
}
