use serde::Serialize;

use shopwise_catalog::Product;

/// Admin response body: the stored product plus its public slug.
#[derive(Debug, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub slug: String,
    pub path: String,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        let slug = product.slug();
        Self {
            path: format!("/products/{slug}"),
            slug,
            product,
        }
    }
}
