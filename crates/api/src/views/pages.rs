//! Page bodies.

use shopwise_auth::Session;
use shopwise_catalog::{PaginationInfo, Product, SearchParams, SearchResponse, TagCount};

use super::{Head, escape, layout};
use crate::context::PageLocale;

fn product_card(page: &PageLocale, p: &Product) -> String {
    let image = p
        .primary_image()
        .map(|src| format!(r#"<img src="{}" alt="" loading="lazy">"#, escape(src)))
        .unwrap_or_default();
    format!(
        r#"<li class="product"><a href="{href}">{image}<span class="title">{title}</span></a> <span class="price">{price}</span> <span class="source">{source}</span></li>"#,
        href = escape(&page.href(&format!("/products/{}", p.slug()))),
        title = escape(&p.title),
        price = escape(&p.price.display()),
        source = p.source,
    )
}

fn product_list(page: &PageLocale, results: &SearchResponse) -> String {
    let m = page.locale().messages();
    if results.products.is_empty() {
        return format!(r#"<p class="empty">{}</p>"#, m.no_results);
    }
    let items: String = results.products.iter().map(|p| product_card(page, p)).collect();
    format!(r#"<ul class="products">{items}</ul>"#)
}

/// Query string for `params` on a different page.
fn page_query(params: &SearchParams, target: u32) -> String {
    let mut pairs: Vec<(&str, String)> = Vec::new();
    if let Some(q) = params.query() {
        pairs.push(("q", q.to_string()));
    }
    if let Some(tag) = params.tag() {
        pairs.push(("tag", tag.to_string()));
    }
    if let Some(category) = params.category() {
        pairs.push(("category", category.to_string()));
    }
    if let Some(source) = params.source {
        pairs.push(("source", source.as_str().to_string()));
    }
    if let Some(min) = params.min_price {
        pairs.push(("min_price", min.to_string()));
    }
    if let Some(max) = params.max_price {
        pairs.push(("max_price", max.to_string()));
    }
    if let Some(sort) = params.sort {
        pairs.push(("sort", sort.as_str().to_string()));
    }
    if params.limit.is_some() {
        pairs.push(("limit", params.limit().to_string()));
    }
    pairs.push(("page", target.to_string()));

    pairs
        .iter()
        .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn pager(page: &PageLocale, path: &str, params: &SearchParams, info: &PaginationInfo) -> String {
    let m = page.locale().messages();
    let base = page.href(path);
    let mut out = String::from(r#"<nav class="pager">"#);
    if info.has_prev {
        out.push_str(&format!(
            r#"<a rel="prev" href="{}">{}</a> "#,
            escape(&format!("{base}?{}", page_query(params, info.page - 1))),
            m.previous
        ));
    }
    out.push_str(&format!("<span>{} / {}</span>", info.page, info.total_pages.max(1)));
    if info.has_next {
        out.push_str(&format!(
            r#" <a rel="next" href="{}">{}</a>"#,
            escape(&format!("{base}?{}", page_query(params, info.page + 1))),
            m.next
        ));
    }
    out.push_str("</nav>");
    out
}

pub fn search(
    page: &PageLocale,
    session: Option<&Session>,
    params: &SearchParams,
    results: &SearchResponse,
) -> String {
    let m = page.locale().messages();
    let q = params.query().unwrap_or_default();
    let body = format!(
        r#"<form method="get" action="{action}" role="search">
<input type="search" name="q" value="{q}" placeholder="{placeholder}">
<button type="submit">{search}</button>
</form>
<p class="count">{total} {results_label}</p>
{list}
{pager}"#,
        action = page.href("/search"),
        q = escape(q),
        placeholder = m.search_placeholder,
        search = m.search,
        total = results.pagination.total,
        results_label = m.results,
        list = product_list(page, results),
        pager = pager(page, "/search", params, &results.pagination),
    );

    let title = if q.is_empty() { m.search.to_string() } else { format!("{q} - {}", m.search) };
    layout(page, &Head::titled(title), session, &body)
}

pub fn tags(page: &PageLocale, session: Option<&Session>, tags: &[TagCount]) -> String {
    let m = page.locale().messages();
    let items: String = tags
        .iter()
        .map(|t| {
            format!(
                r#"<li><a href="{}">{}</a> <span class="count">{}</span></li>"#,
                escape(&page.href(&format!("/tags/{}", urlencoding::encode(&t.tag)))),
                escape(&t.tag),
                t.count
            )
        })
        .collect();
    let body = format!(r#"<h1>{}</h1><ul class="tags">{items}</ul>"#, m.tags);
    layout(page, &Head::titled(m.tags), session, &body)
}

pub fn tag(
    page: &PageLocale,
    session: Option<&Session>,
    tag: &str,
    params: &SearchParams,
    results: &SearchResponse,
) -> String {
    let m = page.locale().messages();
    let path = format!("/tags/{}", urlencoding::encode(tag));
    // The tag lives in the path; keep it out of pager query strings.
    let pager_params = SearchParams { tag: None, ..params.clone() };
    let body = format!(
        r#"<h1>#{tag}</h1><p class="count">{total} {results_label}</p>{list}{pager}"#,
        tag = escape(tag),
        total = results.pagination.total,
        results_label = m.results,
        list = product_list(page, results),
        pager = pager(page, &path, &pager_params, &results.pagination),
    );
    let head = Head {
        canonical_path: Some(path),
        ..Head::titled(format!("#{tag}"))
    };
    layout(page, &head, session, &body)
}

pub fn product(
    page: &PageLocale,
    session: Option<&Session>,
    product: &Product,
    head: Head,
    buy_url: &str,
) -> String {
    let m = page.locale().messages();
    let images: String = product
        .images
        .iter()
        .map(|src| format!(r#"<img src="{}" alt="{}">"#, escape(src), escape(&product.title)))
        .collect();
    let rating = product
        .rating
        .map(|r| format!(r#"<p class="rating">★ {r:.1} ({} {})</p>"#, product.review_count, m.reviews))
        .unwrap_or_default();
    let tags: String = product
        .tags
        .iter()
        .map(|t| {
            format!(
                r#"<a class="tag" href="{}">#{}</a> "#,
                escape(&page.href(&format!("/tags/{}", urlencoding::encode(t)))),
                escape(t)
            )
        })
        .collect();

    let body = format!(
        r#"<article class="product-detail">
<h1>{title}</h1>
<div class="gallery">{images}</div>
<p class="price">{price}</p>
{rating}
<p class="description">{description}</p>
<p class="tags">{tags}</p>
<a class="buy" href="{buy}" rel="sponsored nofollow noopener" target="_blank">{buy_label} ({source})</a>
</article>"#,
        title = escape(&product.title),
        price = escape(&product.price.display()),
        description = escape(&product.description),
        buy = escape(buy_url),
        buy_label = m.buy,
        source = product.source,
    );
    layout(page, &head, session, &body)
}

pub fn not_found(page: &PageLocale, session: Option<&Session>, head: Option<Head>) -> String {
    let m = page.locale().messages();
    let head = head.unwrap_or_else(|| Head::titled(m.not_found));
    let body = format!(
        r#"<h1>{}</h1><p><a href="{}">{}</a></p>"#,
        m.not_found,
        page.href("/search"),
        m.search
    );
    layout(page, &head, session, &body)
}

pub fn unavailable(page: &PageLocale, session: Option<&Session>, head: Head) -> String {
    let m = page.locale().messages();
    let body = format!(r#"<p class="error">{}</p>"#, m.unavailable);
    layout(page, &head, session, &body)
}

pub fn bad_request(page: &PageLocale, session: Option<&Session>, message: &str) -> String {
    let body = format!(r#"<p class="error">{}</p>"#, escape(message));
    layout(page, &Head::titled("Bad request"), session, &body)
}

pub fn admin_dashboard(
    page: &PageLocale,
    session: Option<&Session>,
    params: &SearchParams,
    results: &SearchResponse,
) -> String {
    let m = page.locale().messages();
    let rows: String = results
        .products
        .iter()
        .map(|p| {
            format!(
                r#"<tr><td><a href="{href}">{title}</a></td><td>{price}</td><td>{source}</td><td>{updated}</td></tr>"#,
                href = escape(&page.href(&format!("/admin/products/{}", p.id))),
                title = escape(&p.title),
                price = escape(&p.price.display()),
                source = p.source,
                updated = p.updated_at.format("%Y-%m-%d %H:%M"),
            )
        })
        .collect();
    let body = format!(
        r#"<h1>{admin}</h1>
<p class="count">{total} {products}</p>
<table class="admin-products"><tbody>{rows}</tbody></table>
{pager}"#,
        admin = m.admin,
        total = results.pagination.total,
        products = m.products,
        pager = pager(page, "/admin", params, &results.pagination),
    );
    layout(page, &Head::titled(m.admin), session, &body)
}

pub fn admin_product(page: &PageLocale, session: Option<&Session>, product: &Product) -> String {
    let m = page.locale().messages();
    let body = format!(
        r#"<h1>{title}</h1>
<dl>
<dt>id</dt><dd><code>{id}</code></dd>
<dt>source</dt><dd>{source}</dd>
<dt>url</dt><dd><a href="{url}">{url}</a></dd>
<dt>price</dt><dd>{price}</dd>
<dt>category</dt><dd>{category}</dd>
<dt>tags</dt><dd>{tags}</dd>
<dt>created</dt><dd>{created}</dd>
<dt>updated</dt><dd>{updated}</dd>
</dl>
<p><a href="{public}">{public}</a> · <a href="{back}">{products}</a></p>"#,
        title = escape(&product.title),
        id = product.id,
        source = product.source,
        url = escape(&product.url),
        price = escape(&product.price.display()),
        category = escape(product.category.as_deref().unwrap_or("-")),
        tags = escape(&product.tags.join(", ")),
        created = product.created_at.to_rfc3339(),
        updated = product.updated_at.to_rfc3339(),
        public = escape(&page.href(&format!("/products/{}", product.slug()))),
        back = page.href("/admin"),
        products = m.products,
    );
    layout(page, &Head::titled(&product.title), session, &body)
}

pub fn sign_in(page: &PageLocale, message: Option<&str>, callback_url: &str, invalid: bool) -> String {
    let m = page.locale().messages();
    let mut notices = String::new();
    if let Some(message) = message {
        notices.push_str(&format!(r#"<p class="notice">{}</p>"#, escape(message)));
    }
    if invalid {
        notices.push_str(&format!(r#"<p class="error">{}</p>"#, m.invalid_credentials));
    }
    let body = format!(
        r#"<h1>{sign_in}</h1>
{notices}
<form method="post" action="{action}">
<input type="hidden" name="callbackUrl" value="{callback}">
<label>{username} <input name="username" autocomplete="username" required></label>
<label>{password} <input name="password" type="password" autocomplete="current-password" required></label>
<button type="submit">{sign_in}</button>
</form>"#,
        sign_in = m.sign_in,
        action = page.href("/signin"),
        callback = escape(callback_url),
        username = m.username,
        password = m.password,
    );
    layout(page, &Head::titled(m.sign_in), None, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::i18n::Locale;
    use chrono::Utc;
    use shopwise_catalog::{Price, SortOrder, Source};
    use shopwise_core::ProductId;

    fn chair() -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::new(),
            title: "Office <Chair>".to_string(),
            price: Price::new(12800, "JPY"),
            description: "Mesh back".to_string(),
            images: vec!["https://img.example/chair.jpg".to_string()],
            source: Source::Amazon,
            url: "https://www.amazon.co.jp/dp/B000".to_string(),
            category: Some("furniture".to_string()),
            tags: vec!["office".to_string()],
            rating: Some(4.5),
            review_count: 12,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn search_page_links_products_within_locale() {
        let p = chair();
        let results = SearchResponse {
            pagination: PaginationInfo::new(1, 20, 1),
            products: vec![p.clone()],
        };
        let html = search(&PageLocale::prefixed(Locale::Ja), None, &SearchParams::default(), &results);
        assert!(html.contains(&format!("/ja/products/{}", p.slug())));
        assert!(html.contains("Office &lt;Chair&gt;"));
        assert!(!html.contains("rel=\"next\""));
    }

    #[test]
    fn pager_keeps_filters() {
        let params = SearchParams {
            q: Some("desk lamp".to_string()),
            ..SearchParams::default()
        };
        assert_eq!(page_query(&params, 2), "q=desk%20lamp&page=2");

        let params = SearchParams {
            q: Some("lamp".to_string()),
            tag: Some("home".to_string()),
            sort: Some(SortOrder::PriceAsc),
            limit: Some(10),
            ..SearchParams::default()
        };
        assert_eq!(page_query(&params, 3), "q=lamp&tag=home&sort=price_asc&limit=10&page=3");
    }

    #[test]
    fn product_page_marks_buy_link_sponsored() {
        let p = chair();
        let html = product(
            &PageLocale::unprefixed(Locale::En),
            None,
            &p,
            Head::titled(&p.title),
            "https://www.amazon.co.jp/dp/B000?tag=shopwise-22",
        );
        assert!(html.contains(r#"href="https://www.amazon.co.jp/dp/B000?tag=shopwise-22" rel="sponsored nofollow noopener""#));
        assert!(html.contains("★ 4.5 (12 reviews)"));
        assert!(html.contains(r#"href="/tags/office""#));
    }

    #[test]
    fn sign_in_shows_message_and_escapes_callback() {
        let html = sign_in(
            &PageLocale::unprefixed(Locale::En),
            Some("Please sign in to access the admin area"),
            "/admin?x=\"y\"",
            false,
        );
        assert!(html.contains("Please sign in to access the admin area"));
        assert!(html.contains(r#"value="/admin?x=&quot;y&quot;""#));
    }
}
