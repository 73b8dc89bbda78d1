use shopwise_catalog::{ProductMetadata, id_from_slug};

use crate::ApiClient;

/// Build page metadata for `/products/:slug` from the public product API.
///
/// Any failure (slug without an id, transport error, non-OK status, bad
/// body) falls back to placeholder text derived from the slug.
pub async fn generate_product_metadata(client: &ApiClient, slug: &str) -> ProductMetadata {
    let Some(id) = id_from_slug(slug) else {
        return ProductMetadata::fallback(slug);
    };

    match client.public_product(id).await {
        Ok(product) => ProductMetadata::from_product(&product),
        Err(err) => {
            tracing::warn!(slug, error = %err, "product metadata fetch failed, using fallback");
            ProductMetadata::fallback(slug)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClientConfig, MockSessionStore};
    use axum::{Json, Router, http::StatusCode, routing::get};
    use chrono::Utc;
    use shopwise_catalog::{Price, Product, Source};
    use shopwise_core::ProductId;
    use std::sync::Arc;

    async fn spawn(router: Router) -> ApiClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        ApiClient::new(ClientConfig::new(format!("http://{addr}")), Arc::new(MockSessionStore::new())).unwrap()
    }

    fn lamp(id: ProductId) -> Product {
        let now = Utc::now();
        Product {
            id,
            title: "Desk Lamp".to_string(),
            price: Price::new(2980, "JPY"),
            description: "Warm light".to_string(),
            images: vec![],
            source: Source::Rakuten,
            url: "https://item.rakuten.co.jp/shop/lamp/".to_string(),
            category: None,
            tags: vec![],
            rating: None,
            review_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn uses_product_when_backend_answers() {
        let id = ProductId::new();
        let product = lamp(id);
        let router = Router::new().route(
            "/api/products/public/:id",
            get(move || {
                let product = product.clone();
                async move { Json(product) }
            }),
        );
        let client = spawn(router).await;

        let meta = generate_product_metadata(&client, &format!("desk-lamp-{id}")).await;
        assert_eq!(meta.title, "Desk Lamp | Shopwise");
        assert_eq!(meta.description, "Warm light");
    }

    #[tokio::test]
    async fn non_ok_falls_back_to_slug_title() {
        let router = Router::new().route(
            "/api/products/public/:id",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let client = spawn(router).await;

        let id = ProductId::new();
        let meta = generate_product_metadata(&client, &format!("usb-c-hub-{id}")).await;
        assert_eq!(meta.title, "Usb C Hub | Shopwise");
    }

    #[tokio::test]
    async fn unreachable_backend_falls_back() {
        // Bind then drop to get a port with nothing listening.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = ApiClient::new(
            ClientConfig::new(format!("http://{addr}")),
            Arc::new(MockSessionStore::new()),
        )
        .unwrap();

        let id = ProductId::new();
        let meta = generate_product_metadata(&client, &format!("desk-lamp-{id}")).await;
        assert_eq!(meta.title, "Desk Lamp | Shopwise");
    }

    #[tokio::test]
    async fn slug_without_id_skips_the_fetch() {
        let client = ApiClient::new(ClientConfig::new("http://unused.invalid"), Arc::new(MockSessionStore::new())).unwrap();
        let meta = generate_product_metadata(&client, "mystery-box").await;
        assert_eq!(meta.title, "Mystery Box | Shopwise");
    }
}
