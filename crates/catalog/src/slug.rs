//! Product slugs: `<kebab-title>-<uuid>`.
//!
//! The trailing UUID makes a slug resolvable without a slug index; the title
//! part is cosmetic and may be stale.

use shopwise_core::ProductId;

const UUID_LEN: usize = 36;
const MAX_TITLE_CHARS: usize = 80;

/// Lowercase kebab-case; keeps Unicode letters/digits, collapses the rest.
pub fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut pending_dash = false;

    for ch in title.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if out.chars().count() > MAX_TITLE_CHARS {
        out = out.chars().take(MAX_TITLE_CHARS).collect();
        while out.ends_with('-') {
            out.pop();
        }
    }
    out
}

pub fn product_slug(title: &str, id: ProductId) -> String {
    let title = slugify(title);
    if title.is_empty() {
        id.to_string()
    } else {
        format!("{title}-{id}")
    }
}

/// Split a slug into its title part and trailing id, if it has one.
fn split(slug: &str) -> (&str, Option<ProductId>) {
    if slug.len() < UUID_LEN {
        return (slug, None);
    }
    let cut = slug.len() - UUID_LEN;
    let (Some(head), Some(tail)) = (slug.get(..cut), slug.get(cut..)) else {
        return (slug, None);
    };
    if !(head.is_empty() || head.ends_with('-')) {
        return (slug, None);
    }
    match tail.parse::<ProductId>() {
        Ok(id) => (head.trim_end_matches('-'), Some(id)),
        Err(_) => (slug, None),
    }
}

pub fn id_from_slug(slug: &str) -> Option<ProductId> {
    split(slug).1
}

/// Placeholder title derived from a slug: `sony-wh-1000xm5-<id>` → `Sony Wh 1000xm5`.
pub fn title_from_slug(slug: &str) -> String {
    let (head, _) = split(slug);
    let words: Vec<String> = head
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();

    if words.is_empty() {
        "Product".to_string()
    } else {
        words.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("Sony WH-1000XM5  (Black)"), "sony-wh-1000xm5-black");
        assert_eq!(slugify("--!!--"), "");
        assert_eq!(slugify("ワイヤレス イヤホン"), "ワイヤレス-イヤホン");
    }

    #[test]
    fn slug_round_trips_the_id() {
        let id = ProductId::new();
        let slug = product_slug("Desk Lamp", id);
        assert!(slug.starts_with("desk-lamp-"));
        assert_eq!(id_from_slug(&slug), Some(id));
    }

    #[test]
    fn bare_id_is_a_valid_slug() {
        let id = ProductId::new();
        assert_eq!(id_from_slug(&id.to_string()), Some(id));
        assert_eq!(product_slug("???", id), id.to_string());
    }

    #[test]
    fn slug_without_id_has_no_id() {
        assert_eq!(id_from_slug("desk-lamp"), None);
        assert_eq!(id_from_slug("a-very-long-slug-that-is-definitely-longer-than-36"), None);
    }

    #[test]
    fn title_from_slug_strips_id_and_capitalises() {
        let id = ProductId::new();
        assert_eq!(title_from_slug(&format!("sony-wh-1000xm5-{id}")), "Sony Wh 1000xm5");
        assert_eq!(title_from_slug("desk_lamp"), "Desk Lamp");
        assert_eq!(title_from_slug(&id.to_string()), "Product");
        assert_eq!(title_from_slug(""), "Product");
    }

    proptest! {
        #[test]
        fn any_title_yields_resolvable_slug(title in "\\PC{0,120}") {
            let id = ProductId::new();
            let slug = product_slug(&title, id);
            prop_assert_eq!(id_from_slug(&slug), Some(id));
            prop_assert!(!slug.contains("--"));
        }
    }
}
