//! Public HTML pages.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, rejection::QueryRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};

use shopwise_catalog::{ProductMetadata, SearchParams, id_from_slug};

use crate::app::services::AppServices;
use crate::context::{CurrentSession, PageLocale};
use crate::views::{Head, pages};

/// `/` sends visitors to search.
pub async fn home(Extension(page): Extension<PageLocale>) -> Redirect {
    Redirect::to(&page.href("/search"))
}

pub async fn search(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(page): Extension<PageLocale>,
    Extension(current): Extension<CurrentSession>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Response {
    let session = current.session();
    let Ok(Query(params)) = params else {
        let body = pages::bad_request(&page, session, "Invalid search parameters");
        return (StatusCode::BAD_REQUEST, Html(body)).into_response();
    };

    match services.products.search(&params).await {
        Ok(results) => Html(pages::search(&page, session, &params, &results)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "search failed");
            unavailable(&page, &current, Head::titled(page.locale().messages().search))
        }
    }
}

pub async fn tags(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(page): Extension<PageLocale>,
    Extension(current): Extension<CurrentSession>,
) -> Response {
    match services.products.tags().await {
        Ok(tags) => Html(pages::tags(&page, current.session(), &tags)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "tag listing failed");
            unavailable(&page, &current, Head::titled(page.locale().messages().tags))
        }
    }
}

pub async fn tag(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(page): Extension<PageLocale>,
    Extension(current): Extension<CurrentSession>,
    Path(tag): Path<String>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Response {
    let params = match params {
        Ok(Query(p)) => SearchParams {
            tag: Some(tag.clone()),
            ..p
        },
        Err(_) => SearchParams::for_tag(tag.clone()),
    };

    match services.products.search(&params).await {
        Ok(results) => Html(pages::tag(&page, current.session(), &tag, &params, &results)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, tag = %tag, "tag search failed");
            unavailable(&page, &current, Head::titled(format!("#{tag}")))
        }
    }
}

/// `/products/:slug`.
///
/// The id is the slug's trailing UUID; the text before it is cosmetic. Page
/// metadata falls back to a slug-derived title when the product cannot be
/// loaded.
pub async fn product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(page): Extension<PageLocale>,
    Extension(current): Extension<CurrentSession>,
    Path(slug): Path<String>,
) -> Response {
    let session = current.session();
    let fallback = || Head::from(ProductMetadata::fallback(&slug));

    let Some(id) = id_from_slug(&slug) else {
        return (StatusCode::NOT_FOUND, Html(pages::not_found(&page, session, Some(fallback())))).into_response();
    };

    match services.products.get(id).await {
        Ok(Some(product)) => {
            let buy_url = services.config.affiliate.decorate(&product.url);
            let head = Head::from(ProductMetadata::from_product(&product));
            Html(pages::product(&page, session, &product, head, &buy_url)).into_response()
        }
        Ok(None) => {
            (StatusCode::NOT_FOUND, Html(pages::not_found(&page, session, Some(fallback())))).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, %id, "product lookup failed");
            unavailable(&page, &current, fallback())
        }
    }
}

/// Fallback for unmatched paths, including unknown locale prefixes.
pub async fn not_found(
    Extension(services): Extension<Arc<AppServices>>,
    current: Option<Extension<CurrentSession>>,
) -> Response {
    let page = PageLocale::unprefixed(services.config.default_locale);
    let session = current.as_ref().and_then(|Extension(c)| c.session());
    (StatusCode::NOT_FOUND, Html(pages::not_found(&page, session, None))).into_response()
}

fn unavailable(page: &PageLocale, current: &CurrentSession, head: Head) -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Html(pages::unavailable(page, current.session(), head)),
    )
        .into_response()
}
