//! Catalog domain: scraped product listings, search, slugs, page metadata and
//! affiliate links.
//!
//! Pure, deterministic logic (no IO, no HTTP, no storage).

pub mod affiliate;
pub mod metadata;
pub mod product;
pub mod search;
pub mod slug;

pub use affiliate::{AffiliateLink, AffiliateTags, NewAffiliateLink};
pub use metadata::ProductMetadata;
pub use product::{NewProduct, Price, Product, Source};
pub use search::{PaginationInfo, SearchParams, SearchResponse, SortOrder, TagCount, search, tag_counts};
pub use slug::{id_from_slug, product_slug, slugify, title_from_slug};
