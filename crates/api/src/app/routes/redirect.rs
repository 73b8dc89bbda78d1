//! Affiliate redirects: `/go/:page_id` and its JSON twin.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use axum::{
    Json,
    extract::{Extension, Path},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};

use shopwise_catalog::AffiliateTags;
use shopwise_client::{
    Destination, Navigator, RedirectError, RedirectGate, RedirectObserver, RedirectOutcome,
    TokenService,
};
use shopwise_infra::AffiliateLinkRepository;

use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::{CurrentSession, PageLocale};
use crate::views::{Head, pages};

/// Resolves page ids from the affiliate link store and applies partner tags.
pub struct AffiliateTokenService {
    links: Arc<dyn AffiliateLinkRepository>,
    tags: AffiliateTags,
}

impl AffiliateTokenService {
    pub fn new(services: &AppServices) -> Self {
        Self {
            links: services.links.clone(),
            tags: services.config.affiliate.clone(),
        }
    }
}

#[async_trait]
impl TokenService for AffiliateTokenService {
    async fn resolve(&self, page_id: u64) -> Result<Destination, RedirectError> {
        match self.links.get(page_id).await {
            Ok(Some(link)) => Ok(Destination {
                page_id,
                url: self.tags.decorate(&link.destination),
            }),
            Ok(None) => Err(RedirectError::NotFound(page_id)),
            Err(e) => Err(RedirectError::Unavailable(e.to_string())),
        }
    }
}

/// Collects the gate's navigation or failure for the HTTP response.
#[derive(Debug, Default)]
struct HttpRedirect {
    location: OnceLock<String>,
    failure: OnceLock<StatusCode>,
}

impl Navigator for HttpRedirect {
    fn navigate(&self, url: &str) {
        let _ = self.location.set(url.to_string());
    }
}

impl RedirectObserver for HttpRedirect {
    fn on_redirect_start(&self, page_id: u64) {
        tracing::debug!(page_id, "redirect start");
    }

    fn on_redirect_error(&self, _page_id: u64, error: &RedirectError) {
        let status = match error {
            RedirectError::NotFound(_) => StatusCode::NOT_FOUND,
            RedirectError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            RedirectError::InvalidDestination(_) => StatusCode::BAD_GATEWAY,
        };
        let _ = self.failure.set(status);
    }
}

fn parse_page_id(raw: &str) -> Result<u64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid page id '{raw}'")))
}

/// `GET /go/:page_id`: 302 to the decorated partner URL.
pub async fn go(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentSession>,
    Path(raw): Path<String>,
) -> Response {
    let page = PageLocale::unprefixed(services.config.default_locale);
    let session = current.session();

    let Ok(page_id) = parse_page_id(&raw) else {
        let body = pages::bad_request(&page, session, "Invalid link");
        return (StatusCode::BAD_REQUEST, Html(body)).into_response();
    };

    let gate = RedirectGate::new(AffiliateTokenService::new(&services));
    let http = HttpRedirect::default();

    match (gate.redirect(page_id, &http, &http).await, http.location.get()) {
        (RedirectOutcome::Navigated(_), Some(location)) => (
            StatusCode::FOUND,
            [
                (header::LOCATION, location.clone()),
                (header::CACHE_CONTROL, "no-store".to_string()),
            ],
        )
            .into_response(),
        _ => match http.failure.get().copied().unwrap_or(StatusCode::BAD_GATEWAY) {
            StatusCode::NOT_FOUND => {
                (StatusCode::NOT_FOUND, Html(pages::not_found(&page, session, None))).into_response()
            }
            status => {
                let head = Head::titled(page.locale().messages().unavailable);
                (status, Html(pages::unavailable(&page, session, head))).into_response()
            }
        },
    }
}

/// `GET /api/redirect/:page_id`.
pub async fn resolve(
    Extension(services): Extension<Arc<AppServices>>,
    Path(raw): Path<String>,
) -> Result<Json<Destination>, ApiError> {
    let page_id = parse_page_id(&raw)?;
    let dest = AffiliateTokenService::new(&services).resolve(page_id).await?;
    Ok(Json(dest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use chrono::Utc;
    use shopwise_catalog::NewAffiliateLink;

    async fn services_with_link(destination: &str) -> AppServices {
        let mut config = AppConfig::for_tests("secret");
        config.affiliate.amazon_associate_tag = Some("shopwise-22".to_string());
        let services = AppServices::in_memory(config);
        let link = NewAffiliateLink {
            page_id: 5,
            destination: destination.to_string(),
            product_id: None,
            label: None,
        }
        .into_link(Utc::now())
        .unwrap();
        services.links.upsert(link).await.unwrap();
        services
    }

    #[tokio::test]
    async fn token_service_decorates_destination() {
        let services = services_with_link("https://www.amazon.co.jp/dp/B0001").await;
        let dest = AffiliateTokenService::new(&services).resolve(5).await.unwrap();
        assert_eq!(dest.url, "https://www.amazon.co.jp/dp/B0001?tag=shopwise-22");
    }

    #[tokio::test]
    async fn unknown_page_is_not_found() {
        let services = services_with_link("https://example.com/").await;
        let err = AffiliateTokenService::new(&services).resolve(6).await.unwrap_err();
        assert!(matches!(err, RedirectError::NotFound(6)));
    }

    #[test]
    fn page_ids_must_be_numeric() {
        assert_eq!(parse_page_id("42").unwrap(), 42);
        assert!(parse_page_id("abc").is_err());
        assert!(parse_page_id("-1").is_err());
    }
}
