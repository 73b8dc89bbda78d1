//! Server-rendered HTML.
//!
//! Pages are plain strings assembled with `format!`; every interpolated value
//! goes through [`escape`] first.

use shopwise_auth::Session;

use crate::context::PageLocale;

pub mod i18n;
pub mod pages;

pub const SITE_NAME: &str = "Shopwise";

/// `<head>` values for one page.
#[derive(Debug, Clone, Default)]
pub struct Head {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub canonical_path: Option<String>,
}

impl Head {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: format!("{} | {SITE_NAME}", title.into()),
            ..Self::default()
        }
    }
}

impl From<shopwise_catalog::ProductMetadata> for Head {
    fn from(meta: shopwise_catalog::ProductMetadata) -> Self {
        Self {
            title: meta.title,
            description: meta.description,
            image: meta.image,
            canonical_path: Some(meta.canonical_path),
        }
    }
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap `body` in the site chrome.
pub fn layout(page: &PageLocale, head: &Head, session: Option<&Session>, body: &str) -> String {
    let m = page.locale().messages();

    let mut meta = String::new();
    if !head.description.is_empty() {
        meta.push_str(&format!(
            r#"<meta name="description" content="{}">"#,
            escape(&head.description)
        ));
        meta.push_str(&format!(
            r#"<meta property="og:description" content="{}">"#,
            escape(&head.description)
        ));
    }
    meta.push_str(&format!(r#"<meta property="og:title" content="{}">"#, escape(&head.title)));
    if let Some(image) = &head.image {
        meta.push_str(&format!(r#"<meta property="og:image" content="{}">"#, escape(image)));
    }
    if let Some(path) = &head.canonical_path {
        meta.push_str(&format!(r#"<link rel="canonical" href="{}">"#, escape(&page.href(path))));
    }

    let account = match session {
        Some(s) if s.is_admin() => format!(
            r#"<a href="{admin}">{admin_label}</a> <form method="post" action="/signout" class="inline"><button type="submit">{sign_out}</button></form>"#,
            admin = page.href("/admin"),
            admin_label = m.admin,
            sign_out = m.sign_out,
        ),
        Some(_) => format!(
            r#"<form method="post" action="/signout" class="inline"><button type="submit">{}</button></form>"#,
            m.sign_out
        ),
        None => format!(r#"<a href="{}">{}</a>"#, page.href("/signin"), m.sign_in),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
{meta}
</head>
<body>
<header>
<a href="{home}" class="brand">{SITE_NAME}</a>
<nav><a href="{search}">{search_label}</a> <a href="{tags}">{tags_label}</a> {account}</nav>
</header>
<main>
{body}
</main>
</body>
</html>
"#,
        lang = page.locale().code(),
        title = escape(&head.title),
        home = page.href("/search"),
        search = page.href("/search"),
        search_label = m.search,
        tags = page.href("/tags"),
        tags_label = m.tags,
    )
}
