use axum::{
    Extension, Router,
    routing::{get, post},
};

use crate::context::PageLocale;

pub mod admin;
pub mod auth;
pub mod pages;
pub mod products;
pub mod redirect;
pub mod system;

/// JSON endpoints, the affiliate redirect and sign-out. Not localised.
pub fn api_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/api/session", get(system::session))
        .route("/api/products/public/:id", get(products::public_product))
        .route("/api/products/search", get(products::search))
        .route("/api/tags", get(products::tags))
        .route("/api/redirect/:page_id", get(redirect::resolve))
        .route("/go/:page_id", get(redirect::go))
        .route("/signout", post(auth::sign_out))
        .nest("/admin/api", admin::api_router())
}

/// HTML pages for one locale, mounted at `/` or `/<locale>`.
pub fn pages_router(page: PageLocale) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/search", get(pages::search))
        .route("/tags", get(pages::tags))
        .route("/tags/:tag", get(pages::tag))
        .route("/products/:slug", get(pages::product))
        .route("/admin", get(admin::dashboard))
        .route("/admin/products/:id", get(admin::product_page))
        .route("/signin", get(auth::sign_in_form).post(auth::sign_in))
        .layer(Extension(page))
}
