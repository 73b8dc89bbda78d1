//! Product search: filtering, ranking and pagination over an in-memory slice.
//!
//! Persistent repositories push the same filters down to the database; this
//! module is the reference behaviour and what the in-memory repository uses.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Product, Source};

pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Text relevance when a query is present, otherwise newest first.
    #[default]
    Relevance,
    PriceAsc,
    PriceDesc,
    Newest,
    Rating,
}

impl SortOrder {
    /// Query-string value, as accepted by deserialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Relevance => "relevance",
            SortOrder::PriceAsc => "price_asc",
            SortOrder::PriceDesc => "price_desc",
            SortOrder::Newest => "newest",
            SortOrder::Rating => "rating",
        }
    }
}

/// Search request, as parsed from a query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    #[serde(default, alias = "query")]
    pub q: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub source: Option<Source>,
    /// Minor units, inclusive.
    #[serde(default)]
    pub min_price: Option<u64>,
    /// Minor units, inclusive.
    #[serde(default)]
    pub max_price: Option<u64>,
    #[serde(default)]
    pub sort: Option<SortOrder>,
    /// 1-based.
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl SearchParams {
    pub fn query(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }

    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(self.limit())
    }

    pub fn sort(&self) -> SortOrder {
        self.sort.unwrap_or_default()
    }

    pub fn for_tag(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            sort: Some(SortOrder::Newest),
            ..Self::default()
        }
    }

    /// Whether a product passes every filter except the text query.
    pub fn matches_filters(&self, p: &Product) -> bool {
        if let Some(tag) = self.tag() {
            if !p.has_tag(tag) {
                return false;
            }
        }
        if let Some(category) = self.category() {
            let category = category.to_lowercase();
            if !p.category.as_deref().is_some_and(|c| c.to_lowercase() == category) {
                return false;
            }
        }
        if let Some(source) = self.source {
            if p.source != source {
                return false;
            }
        }
        if self.min_price.is_some_and(|min| p.price.amount < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| p.price.amount > max) {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationInfo {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let limit = limit.max(1);
        let total_pages = u32::try_from(total.div_ceil(u64::from(limit))).unwrap_or(u32::MAX);
        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub products: Vec<Product>,
    pub pagination: PaginationInfo,
}

/// Text relevance score; 0 means "does not match".
///
/// Every whitespace-separated term must hit title, tags or description.
fn score(p: &Product, terms: &[String]) -> u32 {
    let title = p.title.to_lowercase();
    let description = p.description.to_lowercase();

    let mut total = 0;
    for term in terms {
        let mut s = 0;
        if title.contains(term.as_str()) {
            s += 3;
        }
        if p.tags.iter().any(|t| t.contains(term.as_str())) {
            s += 2;
        }
        if description.contains(term.as_str()) {
            s += 1;
        }
        if s == 0 {
            return 0;
        }
        total += s;
    }
    total
}

fn newest_first(a: &Product, b: &Product) -> Ordering {
    b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id))
}

/// Filter, rank and paginate `products` according to `params`.
pub fn search<'a, I>(products: I, params: &SearchParams) -> SearchResponse
where
    I: IntoIterator<Item = &'a Product>,
{
    let terms: Vec<String> = params
        .query()
        .map(|q| q.split_whitespace().map(str::to_lowercase).collect())
        .unwrap_or_default();

    let mut hits: Vec<(u32, &Product)> = products
        .into_iter()
        .filter(|p| params.matches_filters(p))
        .filter_map(|p| {
            if terms.is_empty() {
                Some((0, p))
            } else {
                match score(p, &terms) {
                    0 => None,
                    s => Some((s, p)),
                }
            }
        })
        .collect();

    match params.sort() {
        SortOrder::Relevance => {
            hits.sort_by(|(sa, a), (sb, b)| sb.cmp(sa).then_with(|| newest_first(a, b)))
        }
        SortOrder::Newest => hits.sort_by(|(_, a), (_, b)| newest_first(a, b)),
        SortOrder::PriceAsc => hits.sort_by(|(_, a), (_, b)| {
            a.price.amount.cmp(&b.price.amount).then_with(|| newest_first(a, b))
        }),
        SortOrder::PriceDesc => hits.sort_by(|(_, a), (_, b)| {
            b.price.amount.cmp(&a.price.amount).then_with(|| newest_first(a, b))
        }),
        SortOrder::Rating => hits.sort_by(|(_, a), (_, b)| {
            let ra = a.rating.unwrap_or(-1.0);
            let rb = b.rating.unwrap_or(-1.0);
            rb.total_cmp(&ra)
                .then_with(|| b.review_count.cmp(&a.review_count))
                .then_with(|| newest_first(a, b))
        }),
    }

    let total = hits.len() as u64;
    let pagination = PaginationInfo::new(params.page(), params.limit(), total);

    let products = hits
        .into_iter()
        .skip(usize::try_from(params.offset()).unwrap_or(usize::MAX))
        .take(params.limit() as usize)
        .map(|(_, p)| p.clone())
        .collect();

    SearchResponse { products, pagination }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: u64,
}

/// Tag usage counts, most used first, ties broken alphabetically.
pub fn tag_counts<'a, I>(products: I) -> Vec<TagCount>
where
    I: IntoIterator<Item = &'a Product>,
{
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for p in products {
        for tag in &p.tags {
            *counts.entry(tag.as_str()).or_default() += 1;
        }
    }

    let mut out: Vec<TagCount> = counts
        .into_iter()
        .map(|(tag, count)| TagCount {
            tag: tag.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Price;
    use chrono::{Duration, Utc};
    use proptest::prelude::*;
    use shopwise_core::ProductId;

    fn product(title: &str, price: u64, tags: &[&str], age_hours: i64) -> Product {
        let at = Utc::now() - Duration::hours(age_hours);
        Product {
            id: ProductId::new(),
            title: title.to_string(),
            price: Price::new(price, "JPY"),
            description: format!("{title} description"),
            images: vec![],
            source: Source::Amazon,
            url: "https://www.amazon.co.jp/dp/X".to_string(),
            category: Some("electronics".to_string()),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            rating: None,
            review_count: 0,
            created_at: at,
            updated_at: at,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("Wireless Earbuds", 9_800, &["audio", "wireless"], 1),
            product("Studio Headphones", 24_000, &["audio"], 2),
            product("Mechanical Keyboard", 15_500, &["pc"], 3),
            product("Wireless Mouse", 3_200, &["pc", "wireless"], 4),
        ]
    }

    #[test]
    fn empty_query_returns_everything_newest_first() {
        let items = catalog();
        let res = search(&items, &SearchParams::default());
        assert_eq!(res.pagination.total, 4);
        assert_eq!(res.products[0].title, "Wireless Earbuds");
        assert_eq!(res.products[3].title, "Wireless Mouse");
    }

    #[test]
    fn query_is_case_insensitive_and_all_terms_must_match() {
        let items = catalog();
        let params = SearchParams {
            q: Some("WIRELESS mouse".to_string()),
            ..Default::default()
        };
        let res = search(&items, &params);
        assert_eq!(res.products.len(), 1);
        assert_eq!(res.products[0].title, "Wireless Mouse");
    }

    #[test]
    fn tag_and_category_filters_fold_non_ascii_case() {
        let mut items = catalog();
        items[2].tags.push("éco".to_string());
        items[2].category = Some("Électronique".to_string());

        let res = search(&items, &SearchParams::for_tag("Éco"));
        assert_eq!(res.pagination.total, 1);
        assert_eq!(res.products[0].title, "Mechanical Keyboard");

        let params = SearchParams {
            category: Some("ÉLECTRONIQUE".to_string()),
            ..Default::default()
        };
        assert_eq!(search(&items, &params).pagination.total, 1);
    }

    #[test]
    fn query_matches_tags() {
        let items = catalog();
        let params = SearchParams {
            q: Some("audio".to_string()),
            ..Default::default()
        };
        assert_eq!(search(&items, &params).pagination.total, 2);
    }

    #[test]
    fn filters_and_price_sort() {
        let items = catalog();
        let params = SearchParams {
            tag: Some("Wireless".to_string()),
            max_price: Some(10_000),
            sort: Some(SortOrder::PriceAsc),
            ..Default::default()
        };
        let res = search(&items, &params);
        let titles: Vec<_> = res.products.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Wireless Mouse", "Wireless Earbuds"]);
    }

    #[test]
    fn page_past_the_end_is_empty_but_counts_total() {
        let items = catalog();
        let params = SearchParams {
            page: Some(3),
            limit: Some(2),
            ..Default::default()
        };
        let res = search(&items, &params);
        assert!(res.products.is_empty());
        assert_eq!(res.pagination.total, 4);
        assert_eq!(res.pagination.total_pages, 2);
        assert!(!res.pagination.has_next);
        assert!(res.pagination.has_prev);
    }

    #[test]
    fn limit_is_clamped() {
        let params = SearchParams {
            limit: Some(10_000),
            page: Some(0),
            ..Default::default()
        };
        assert_eq!(params.limit(), MAX_LIMIT);
        assert_eq!(params.page(), 1);
    }

    #[test]
    fn tag_counts_are_sorted() {
        let items = catalog();
        let counts = tag_counts(&items);
        let pairs: Vec<_> = counts.iter().map(|c| (c.tag.as_str(), c.count)).collect();
        assert_eq!(pairs, vec![("audio", 2), ("pc", 2), ("wireless", 2)]);
    }

    proptest! {
        #[test]
        fn pagination_is_consistent(total in 0u64..10_000, limit in 1u32..=100, page in 1u32..200) {
            let info = PaginationInfo::new(page, limit, total);
            prop_assert_eq!(u64::from(info.total_pages), total.div_ceil(u64::from(limit)));
            prop_assert_eq!(info.has_next, page < info.total_pages);
            prop_assert_eq!(info.has_prev, page > 1);
        }
    }
}
