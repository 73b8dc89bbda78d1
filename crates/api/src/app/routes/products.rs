//! Public catalog JSON endpoints.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, Query, rejection::QueryRejection},
};

use shopwise_catalog::{Product, SearchParams, SearchResponse, TagCount};
use shopwise_core::ProductId;

use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub async fn public_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let id: ProductId = id.parse()?;
    services
        .products
        .get(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

pub async fn search(
    Extension(services): Extension<Arc<AppServices>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    Ok(Json(services.products.search(&params).await?))
}

pub async fn tags(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<TagCount>>, ApiError> {
    Ok(Json(services.products.tags().await?))
}
