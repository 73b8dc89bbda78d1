//! Per-product page metadata (title, description, preview image).

use serde::{Deserialize, Serialize};

use crate::{Product, slug::title_from_slug};

const SITE_NAME: &str = "Shopwise";
const DESCRIPTION_CHARS: usize = 160;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductMetadata {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub canonical_path: String,
}

impl ProductMetadata {
    pub fn from_product(p: &Product) -> Self {
        let description = if p.description.trim().is_empty() {
            format!("{} from {} at {}", p.title, p.source, p.price.display())
        } else {
            truncate(p.description.trim(), DESCRIPTION_CHARS)
        };

        Self {
            title: format!("{} | {SITE_NAME}", p.title),
            description,
            image: p.primary_image().map(str::to_string),
            canonical_path: format!("/products/{}", p.slug()),
        }
    }

    /// Placeholder used when the product could not be loaded.
    pub fn fallback(slug: &str) -> Self {
        let title = title_from_slug(slug);
        Self {
            description: format!("Compare prices and reviews for {title}."),
            title: format!("{title} | {SITE_NAME}"),
            image: None,
            canonical_path: format!("/products/{slug}"),
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Price, Source};
    use chrono::Utc;
    use shopwise_core::ProductId;

    #[test]
    fn fallback_uses_slug_title() {
        let id = ProductId::new();
        let meta = ProductMetadata::fallback(&format!("desk-lamp-{id}"));
        assert_eq!(meta.title, "Desk Lamp | Shopwise");
        assert!(meta.description.contains("Desk Lamp"));
        assert_eq!(meta.image, None);
    }

    #[test]
    fn long_descriptions_are_truncated() {
        let now = Utc::now();
        let p = Product {
            id: ProductId::new(),
            title: "Lamp".to_string(),
            price: Price::new(1200, "JPY"),
            description: "x".repeat(500),
            images: vec!["https://img.example/a.jpg".to_string()],
            source: Source::Rakuten,
            url: "https://item.rakuten.co.jp/a".to_string(),
            category: None,
            tags: vec![],
            rating: None,
            review_count: 0,
            created_at: now,
            updated_at: now,
        };
        let meta = ProductMetadata::from_product(&p);
        assert_eq!(meta.description.chars().count(), DESCRIPTION_CHARS);
        assert_eq!(meta.image.as_deref(), Some("https://img.example/a.jpg"));
        assert_eq!(meta.canonical_path, format!("/products/lamp-{}", p.id));
    }
}
