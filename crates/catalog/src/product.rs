use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopwise_core::{DomainError, Entity, ProductId};

use crate::slug::product_slug;

/// Marketplace a listing was scraped from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Amazon,
    Rakuten,
    Other,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Amazon => "amazon",
            Source::Rakuten => "rakuten",
            Source::Other => "other",
        }
    }

    /// Best-effort detection from a listing URL's host.
    pub fn from_url(url: &str) -> Self {
        let authority = url
            .split("://")
            .nth(1)
            .unwrap_or(url)
            .split(['/', '?', '#'])
            .next()
            .unwrap_or_default();
        let host = authority.rsplit('@').next().unwrap_or_default();
        let host = host.split(':').next().unwrap_or_default().to_ascii_lowercase();

        if host == "amzn.to" || host == "amzn.asia" || is_marketplace_host(&host, "amazon") {
            Source::Amazon
        } else if is_marketplace_host(&host, "rakuten") {
            Source::Rakuten
        } else {
            Source::Other
        }
    }
}

/// `brand.<tld>` or `*.brand.<tld>`, where `<tld>` is a country or generic
/// suffix such as `com`, `co.jp` or `com.au`.
fn is_marketplace_host(host: &str, brand: &str) -> bool {
    let labels: Vec<&str> = host.split('.').collect();
    let Some(pos) = labels.iter().rposition(|l| *l == brand) else {
        return false;
    };
    let suffix = &labels[pos + 1..];
    (1..=2).contains(&suffix.len()) && suffix.iter().all(|l| (2..=3).contains(&l.len()))
}

impl core::str::FromStr for Source {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "amazon" => Ok(Source::Amazon),
            "rakuten" => Ok(Source::Rakuten),
            "other" => Ok(Source::Other),
            _ => Err(DomainError::validation("source must be one of: amazon, rakuten, other")),
        }
    }
}

impl core::fmt::Display for Source {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listed price in the currency's smallest unit (e.g. yen, cents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub amount: u64,
    pub currency: String,
}

impl Price {
    pub fn new(amount: u64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    fn minor_digits(&self) -> u32 {
        match self.currency.as_str() {
            "JPY" | "KRW" => 0,
            _ => 2,
        }
    }

    /// Human-readable amount, e.g. `¥12,800` or `$19.99`.
    pub fn display(&self) -> String {
        let symbol = match self.currency.as_str() {
            "JPY" => "¥",
            "USD" => "$",
            "EUR" => "€",
            "GBP" => "£",
            _ => "",
        };

        let digits = self.minor_digits();
        let divisor = 10u64.pow(digits);
        let whole = group_thousands(self.amount / divisor);

        let number = if digits == 0 {
            whole
        } else {
            format!("{whole}.{:0width$}", self.amount % divisor, width = digits as usize)
        };

        if symbol.is_empty() {
            format!("{number} {}", self.currency)
        } else {
            format!("{symbol}{number}")
        }
    }
}

fn group_thousands(n: u64) -> String {
    let raw = n.to_string();
    let mut out = String::with_capacity(raw.len() + raw.len() / 3);
    for (i, ch) in raw.chars().enumerate() {
        if i > 0 && (raw.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// A scraped product listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub description: String,
    pub images: Vec<String>,
    pub source: Source,
    /// Listing URL on the source marketplace.
    pub url: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    /// Average star rating, 0.0 to 5.0.
    pub rating: Option<f32>,
    pub review_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn slug(&self) -> String {
        product_slug(&self.title, self.id)
    }

    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = tag.to_lowercase();
        self.tags.iter().any(|t| t.to_lowercase() == tag)
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Admin/scraper input for creating or replacing a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub title: String,
    pub price: Price,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    /// Detected from `url` when omitted.
    #[serde(default)]
    pub source: Option<Source>,
    pub url: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub review_count: u32,
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::validation("title cannot be empty"));
        }
        if !is_http_url(&self.url) {
            return Err(DomainError::validation("url must be an http(s) URL"));
        }
        if self.price.currency.trim().is_empty() {
            return Err(DomainError::validation("price currency cannot be empty"));
        }
        if let Some(r) = self.rating {
            if !(0.0..=5.0).contains(&r) {
                return Err(DomainError::validation("rating must be between 0 and 5"));
            }
        }
        Ok(())
    }

    /// Validate and materialise into a stored product.
    ///
    /// `created_at` is kept from `existing` when replacing.
    pub fn into_product(
        self,
        id: ProductId,
        existing: Option<&Product>,
        now: DateTime<Utc>,
    ) -> Result<Product, DomainError> {
        self.validate()?;

        let source = self.source.unwrap_or_else(|| Source::from_url(&self.url));
        let tags = normalize_tags(self.tags);

        Ok(Product {
            id,
            title: self.title.trim().to_string(),
            price: self.price,
            description: self.description,
            images: self.images,
            source,
            url: self.url,
            category: self.category.filter(|c| !c.trim().is_empty()),
            tags,
            rating: self.rating,
            review_count: self.review_count,
            created_at: existing.map(|p| p.created_at).unwrap_or(now),
            updated_at: now,
        })
    }
}

fn is_http_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    matches!(rest, Some(r) if !r.is_empty())
}

/// Trim, lowercase and dedupe tags, preserving first-seen order.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product() -> NewProduct {
        NewProduct {
            title: "  Noise Cancelling Headphones ".to_string(),
            price: Price::new(39_800, "JPY"),
            description: "Over-ear".to_string(),
            images: vec!["https://img.example/1.jpg".to_string()],
            source: None,
            url: "https://www.amazon.co.jp/dp/B0TEST".to_string(),
            category: Some("  ".to_string()),
            tags: vec!["Audio".to_string(), "audio ".to_string(), "wireless".to_string()],
            rating: Some(4.5),
            review_count: 120,
        }
    }

    #[test]
    fn into_product_normalises_fields() {
        let now = Utc::now();
        let p = new_product().into_product(ProductId::new(), None, now).unwrap();

        assert_eq!(p.title, "Noise Cancelling Headphones");
        assert_eq!(p.source, Source::Amazon);
        assert_eq!(p.tags, vec!["audio", "wireless"]);
        assert_eq!(p.category, None);
        assert_eq!(p.created_at, now);
        assert_eq!(p.updated_at, now);
    }

    #[test]
    fn tag_match_folds_non_ascii_case() {
        let mut input = new_product();
        input.tags = vec!["Éco".to_string()];
        let p = input.into_product(ProductId::new(), None, Utc::now()).unwrap();

        assert_eq!(p.tags, vec!["éco"]);
        assert!(p.has_tag("Éco"));
        assert!(p.has_tag("ÉCO"));
        assert!(!p.has_tag("eco"));
    }

    #[test]
    fn replacing_keeps_created_at() {
        let id = ProductId::new();
        let first = new_product().into_product(id, None, Utc::now()).unwrap();
        let later = first.created_at + chrono::Duration::hours(1);

        let second = new_product().into_product(id, Some(&first), later).unwrap();
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.updated_at, later);
    }

    #[test]
    fn validation_rejects_bad_input() {
        let mut p = new_product();
        p.title = " ".to_string();
        assert!(matches!(p.validate(), Err(DomainError::Validation(_))));

        let mut p = new_product();
        p.url = "ftp://example.com".to_string();
        assert!(p.validate().is_err());

        let mut p = new_product();
        p.rating = Some(5.5);
        assert!(p.validate().is_err());
    }

    #[test]
    fn source_detection_by_host() {
        assert_eq!(Source::from_url("https://www.amazon.co.jp/dp/X"), Source::Amazon);
        assert_eq!(Source::from_url("https://item.rakuten.co.jp/shop/x/"), Source::Rakuten);
        assert_eq!(Source::from_url("https://example.com/amazon.html"), Source::Other);
        assert_eq!(Source::from_url("https://amazon.com/dp/X"), Source::Amazon);
        assert_eq!(Source::from_url("https://smile.amazon.co.uk:443/dp/X"), Source::Amazon);
        assert_eq!(Source::from_url("https://amzn.to/3abc"), Source::Amazon);
    }

    #[test]
    fn lookalike_hosts_are_not_marketplaces() {
        assert_eq!(Source::from_url("https://notamazon.example/dp/X"), Source::Other);
        assert_eq!(Source::from_url("https://amazon.evil.example/dp/X"), Source::Other);
        assert_eq!(Source::from_url("https://myrakuten.co.jp/x"), Source::Other);
        assert_eq!(Source::from_url("https://www.amazon.co.jp@evil.example/dp/X"), Source::Other);
        assert_eq!(Source::from_url("https://user@www.amazon.co.jp/dp/X"), Source::Amazon);
    }

    #[test]
    fn price_display_uses_currency_minor_units() {
        assert_eq!(Price::new(1_234_500, "JPY").display(), "¥1,234,500");
        assert_eq!(Price::new(1999, "USD").display(), "$19.99");
        assert_eq!(Price::new(5, "USD").display(), "$0.05");
        assert_eq!(Price::new(1000, "CHF").display(), "10.00 CHF");
    }
}
