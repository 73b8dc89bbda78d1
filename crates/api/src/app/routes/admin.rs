//! Admin area: HTML dashboard plus JSON catalog maintenance.
//!
//! Everything here sits behind the admin gate in the session middleware, so
//! handlers can assume an admin session.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, rejection::JsonRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{post, put},
};
use chrono::Utc;

use shopwise_catalog::{AffiliateLink, NewAffiliateLink, NewProduct, SearchParams};
use shopwise_core::ProductId;

use crate::app::dto::ProductView;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::{CurrentSession, PageLocale};
use crate::views::{Head, pages};

/// JSON routes, nested under `/admin/api`.
pub fn api_router() -> Router {
    Router::new()
        .route("/products", post(create_product))
        .route("/products/:id", put(replace_product).delete(delete_product))
        .route("/affiliate-links", post(upsert_affiliate_link))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(v)| v).map_err(|e| ApiError::BadRequest(e.body_text()))
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentSession>,
    body: Result<Json<NewProduct>, JsonRejection>,
) -> Result<(StatusCode, Json<ProductView>), ApiError> {
    let product = json_body(body)?.into_product(ProductId::new(), None, Utc::now())?;
    services.products.upsert(product.clone()).await?;

    tracing::info!(
        product_id = %product.id,
        by = current.session().map(|s| s.username.as_str()).unwrap_or_default(),
        "product created"
    );
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// Create or replace the product with the given id.
pub async fn replace_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<NewProduct>, JsonRejection>,
) -> Result<(StatusCode, Json<ProductView>), ApiError> {
    let id: ProductId = id.parse()?;
    let input = json_body(body)?;

    let existing = services.products.get(id).await?;
    let status = if existing.is_some() { StatusCode::OK } else { StatusCode::CREATED };
    let product = input.into_product(id, existing.as_ref(), Utc::now())?;
    services.products.upsert(product.clone()).await?;

    tracing::info!(product_id = %id, "product replaced");
    Ok((status, Json(product.into())))
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: ProductId = id.parse()?;
    if !services.products.delete(id).await? {
        return Err(ApiError::NotFound);
    }
    tracing::info!(product_id = %id, "product deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn upsert_affiliate_link(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<NewAffiliateLink>, JsonRejection>,
) -> Result<(StatusCode, Json<AffiliateLink>), ApiError> {
    let link = json_body(body)?.into_link(Utc::now())?;
    if let Some(product_id) = link.product_id {
        if services.products.get(product_id).await?.is_none() {
            return Err(ApiError::BadRequest(format!("unknown product {product_id}")));
        }
    }
    services.links.upsert(link.clone()).await?;

    tracing::info!(page_id = link.page_id, "affiliate link saved");
    Ok((StatusCode::CREATED, Json(link)))
}

/// `GET /admin`: product table, newest first.
pub async fn dashboard(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(page): Extension<PageLocale>,
    Extension(current): Extension<CurrentSession>,
    params: Option<Query<SearchParams>>,
) -> Response {
    let params = params.map(|Query(p)| p).unwrap_or_default();
    match services.products.search(&params).await {
        Ok(results) => {
            Html(pages::admin_dashboard(&page, current.session(), &params, &results)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "admin product listing failed");
            let head = Head::titled(page.locale().messages().admin);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Html(pages::unavailable(&page, current.session(), head)),
            )
                .into_response()
        }
    }
}

/// `GET /admin/products/:id`.
pub async fn product_page(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(page): Extension<PageLocale>,
    Extension(current): Extension<CurrentSession>,
    Path(id): Path<String>,
) -> Response {
    let session = current.session();
    let found = match id.parse::<ProductId>() {
        Ok(id) => services.products.get(id).await,
        Err(_) => Ok(None),
    };

    match found {
        Ok(Some(product)) => Html(pages::admin_product(&page, session, &product)).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, Html(pages::not_found(&page, session, None))).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "admin product lookup failed");
            let head = Head::titled(page.locale().messages().admin);
            (StatusCode::SERVICE_UNAVAILABLE, Html(pages::unavailable(&page, session, head))).into_response()
        }
    }
}
