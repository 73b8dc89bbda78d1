//! Postgres-backed repositories.
//!
//! Queries are built at runtime (`QueryBuilder`) so the crate builds without a
//! live database. Filters mirror `shopwise_catalog::search`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use shopwise_catalog::{
    AffiliateLink, PaginationInfo, Price, Product, SearchParams, SearchResponse, SortOrder, TagCount,
};
use shopwise_core::ProductId;

use super::{AffiliateLinkRepository, ProductRepository, RepositoryError};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id UUID PRIMARY KEY,
        title TEXT NOT NULL,
        price_amount BIGINT NOT NULL,
        price_currency TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        images TEXT[] NOT NULL DEFAULT '{}',
        source TEXT NOT NULL,
        url TEXT NOT NULL,
        category TEXT,
        tags TEXT[] NOT NULL DEFAULT '{}',
        rating REAL,
        review_count INTEGER NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS products_created_at_idx ON products (created_at DESC)",
    "CREATE INDEX IF NOT EXISTS products_tags_idx ON products USING GIN (tags)",
    r#"
    CREATE TABLE IF NOT EXISTS affiliate_links (
        page_id BIGINT PRIMARY KEY,
        destination TEXT NOT NULL,
        product_id UUID,
        label TEXT,
        created_at TIMESTAMPTZ NOT NULL
    )
    "#,
];

/// Open a pool; fails fast if the database is unreachable.
pub async fn connect(database_url: &str) -> Result<PgPool, RepositoryError> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Create tables and indexes if missing.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), RepositoryError> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::info!("database schema ready");
    Ok(())
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    title: String,
    price_amount: i64,
    price_currency: String,
    description: String,
    images: Vec<String>,
    source: String,
    url: String,
    category: Option<String>,
    tags: Vec<String>,
    rating: Option<f32>,
    review_count: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let corrupt = |what: &str| RepositoryError::Corrupt(format!("product {}: {what}", row.id));

        let amount = u64::try_from(row.price_amount).map_err(|_| corrupt("negative price"))?;
        let review_count = u32::try_from(row.review_count).map_err(|_| corrupt("negative review_count"))?;
        let source = row.source.parse().map_err(|_| corrupt("unknown source"))?;

        Ok(Product {
            id: ProductId::from_uuid(row.id),
            title: row.title,
            price: Price::new(amount, row.price_currency),
            description: row.description,
            images: row.images,
            source,
            url: row.url,
            category: row.category,
            tags: row.tags,
            rating: row.rating,
            review_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const PRODUCT_COLUMNS: &str = "id, title, price_amount, price_currency, description, images, source, url, \
     category, tags, rating, review_count, created_at, updated_at";

/// `%term%` with LIKE metacharacters escaped.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn query_terms(params: &SearchParams) -> Vec<String> {
    params
        .query()
        .map(|q| q.split_whitespace().map(|t| like_pattern(t)).collect())
        .unwrap_or_default()
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, params: &SearchParams, terms: &[String]) {
    qb.push(" WHERE TRUE");

    for term in terms {
        qb.push(" AND (title ILIKE ")
            .push_bind(term.clone())
            .push(" OR description ILIKE ")
            .push_bind(term.clone())
            .push(" OR EXISTS (SELECT 1 FROM unnest(tags) t WHERE t ILIKE ")
            .push_bind(term.clone())
            .push("))");
    }
    if let Some(tag) = params.tag() {
        qb.push(" AND EXISTS (SELECT 1 FROM unnest(tags) t WHERE lower(t) = lower(")
            .push_bind(tag.to_string())
            .push("))");
    }
    if let Some(category) = params.category() {
        qb.push(" AND lower(category) = lower(")
            .push_bind(category.to_string())
            .push(")");
    }
    if let Some(source) = params.source {
        qb.push(" AND source = ").push_bind(source.as_str());
    }
    if let Some(min) = params.min_price {
        qb.push(" AND price_amount >= ").push_bind(i64::try_from(min).unwrap_or(i64::MAX));
    }
    if let Some(max) = params.max_price {
        qb.push(" AND price_amount <= ").push_bind(i64::try_from(max).unwrap_or(i64::MAX));
    }
}

fn push_order(qb: &mut QueryBuilder<'_, Postgres>, params: &SearchParams, terms: &[String]) {
    match params.sort() {
        SortOrder::Relevance if !terms.is_empty() => {
            qb.push(" ORDER BY (");
            for (i, term) in terms.iter().enumerate() {
                if i > 0 {
                    qb.push(" + ");
                }
                qb.push("(CASE WHEN title ILIKE ")
                    .push_bind(term.clone())
                    .push(" THEN 3 ELSE 0 END + CASE WHEN EXISTS (SELECT 1 FROM unnest(tags) t WHERE t ILIKE ")
                    .push_bind(term.clone())
                    .push(") THEN 2 ELSE 0 END + CASE WHEN description ILIKE ")
                    .push_bind(term.clone())
                    .push(" THEN 1 ELSE 0 END)");
            }
            qb.push(") DESC, created_at DESC, id ASC");
        }
        SortOrder::Relevance | SortOrder::Newest => {
            qb.push(" ORDER BY created_at DESC, id ASC");
        }
        SortOrder::PriceAsc => {
            qb.push(" ORDER BY price_amount ASC, created_at DESC, id ASC");
        }
        SortOrder::PriceDesc => {
            qb.push(" ORDER BY price_amount DESC, created_at DESC, id ASC");
        }
        SortOrder::Rating => {
            qb.push(" ORDER BY rating DESC NULLS LAST, review_count DESC, created_at DESC, id ASC");
        }
    }
}

/// Postgres-backed product catalog (`products` table).
#[derive(Debug, Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> =
            sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;
        row.map(Product::try_from).transpose()
    }

    async fn search(&self, params: &SearchParams) -> Result<SearchResponse, RepositoryError> {
        let terms = query_terms(params);

        let mut count_q = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products");
        push_filters(&mut count_q, params, &terms);
        let total: i64 = count_q.build().fetch_one(&self.pool).await?.try_get(0)?;

        let mut q = QueryBuilder::<Postgres>::new(format!("SELECT {PRODUCT_COLUMNS} FROM products"));
        push_filters(&mut q, params, &terms);
        push_order(&mut q, params, &terms);
        q.push(" LIMIT ")
            .push_bind(i64::from(params.limit()))
            .push(" OFFSET ")
            .push_bind(i64::try_from(params.offset()).unwrap_or(i64::MAX));

        let rows: Vec<ProductRow> = q.build_query_as().fetch_all(&self.pool).await?;
        let products = rows
            .into_iter()
            .map(Product::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SearchResponse {
            products,
            pagination: PaginationInfo::new(params.page(), params.limit(), u64::try_from(total).unwrap_or(0)),
        })
    }

    async fn tags(&self) -> Result<Vec<TagCount>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT t AS tag, COUNT(*) AS count
            FROM products, unnest(tags) AS t
            GROUP BY t
            ORDER BY count DESC, tag ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> Result<TagCount, RepositoryError> {
                let count: i64 = row.try_get("count")?;
                Ok(TagCount {
                    tag: row.try_get("tag")?,
                    count: u64::try_from(count).unwrap_or(0),
                })
            })
            .collect()
    }

    async fn upsert(&self, p: Product) -> Result<(), RepositoryError> {
        let amount = i64::try_from(p.price.amount)
            .map_err(|_| RepositoryError::Corrupt(format!("product {}: price out of range", p.id)))?;
        let review_count = i32::try_from(p.review_count).unwrap_or(i32::MAX);

        sqlx::query(
            r#"
            INSERT INTO products (
                id, title, price_amount, price_currency, description, images, source, url,
                category, tags, rating, review_count, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                price_amount = EXCLUDED.price_amount,
                price_currency = EXCLUDED.price_currency,
                description = EXCLUDED.description,
                images = EXCLUDED.images,
                source = EXCLUDED.source,
                url = EXCLUDED.url,
                category = EXCLUDED.category,
                tags = EXCLUDED.tags,
                rating = EXCLUDED.rating,
                review_count = EXCLUDED.review_count,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(p.id.as_uuid())
        .bind(&p.title)
        .bind(amount)
        .bind(&p.price.currency)
        .bind(&p.description)
        .bind(&p.images)
        .bind(p.source.as_str())
        .bind(&p.url)
        .bind(&p.category)
        .bind(&p.tags)
        .bind(p.rating)
        .bind(review_count)
        .bind(p.created_at)
        .bind(p.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let res = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

/// Postgres-backed affiliate links (`affiliate_links` table).
#[derive(Debug, Clone)]
pub struct PgAffiliateLinkRepository {
    pool: PgPool,
}

impl PgAffiliateLinkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn page_id_to_db(page_id: u64) -> Result<i64, RepositoryError> {
    i64::try_from(page_id).map_err(|_| RepositoryError::Corrupt(format!("page id {page_id} out of range")))
}

#[async_trait]
impl AffiliateLinkRepository for PgAffiliateLinkRepository {
    async fn get(&self, page_id: u64) -> Result<Option<AffiliateLink>, RepositoryError> {
        let Ok(db_id) = i64::try_from(page_id) else {
            return Ok(None);
        };

        let row = sqlx::query(
            "SELECT page_id, destination, product_id, label, created_at FROM affiliate_links WHERE page_id = $1",
        )
        .bind(db_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let product_id: Option<Uuid> = row.try_get("product_id")?;
        Ok(Some(AffiliateLink {
            page_id,
            destination: row.try_get("destination")?,
            product_id: product_id.map(ProductId::from_uuid),
            label: row.try_get("label")?,
            created_at: row.try_get("created_at")?,
        }))
    }

    async fn upsert(&self, link: AffiliateLink) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO affiliate_links (page_id, destination, product_id, label, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (page_id) DO UPDATE SET
                destination = EXCLUDED.destination,
                product_id = EXCLUDED.product_id,
                label = EXCLUDED.label
            "#,
        )
        .bind(page_id_to_db(link.page_id)?)
        .bind(&link.destination)
        .bind(link.product_id.map(Uuid::from))
        .bind(&link.label)
        .bind(link.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
