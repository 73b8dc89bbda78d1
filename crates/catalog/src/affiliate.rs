//! Affiliate links: numeric page ids mapped to partner destinations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopwise_core::{DomainError, Entity, ProductId};

use crate::Source;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffiliateLink {
    pub page_id: u64,
    /// Undecorated partner URL; tracking parameters are added at redirect time.
    pub destination: String,
    pub product_id: Option<ProductId>,
    pub label: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Entity for AffiliateLink {
    type Id = u64;

    fn id(&self) -> &Self::Id {
        &self.page_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAffiliateLink {
    pub page_id: u64,
    pub destination: String,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub label: Option<String>,
}

impl NewAffiliateLink {
    pub fn into_link(self, now: DateTime<Utc>) -> Result<AffiliateLink, DomainError> {
        let destination = self.destination.trim();
        if !(destination.starts_with("https://") || destination.starts_with("http://")) {
            return Err(DomainError::validation("destination must be an http(s) URL"));
        }
        Ok(AffiliateLink {
            page_id: self.page_id,
            destination: destination.to_string(),
            product_id: self.product_id,
            label: self.label.filter(|l| !l.trim().is_empty()),
            created_at: now,
        })
    }
}

/// Partner tracking identifiers appended to outbound URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AffiliateTags {
    /// Amazon Associates tag (`tag=`).
    pub amazon_associate_tag: Option<String>,
    /// Rakuten affiliate id (`scid=`).
    pub rakuten_affiliate_id: Option<String>,
}

impl AffiliateTags {
    /// Add the marketplace's tracking parameter to `url` when configured.
    ///
    /// Leaves the URL untouched if the parameter is already present.
    pub fn decorate(&self, url: &str) -> String {
        let param = match Source::from_url(url) {
            Source::Amazon => self.amazon_associate_tag.as_deref().map(|v| ("tag", v)),
            Source::Rakuten => self.rakuten_affiliate_id.as_deref().map(|v| ("scid", v)),
            Source::Other => None,
        };

        match param {
            Some((key, value)) if !value.is_empty() => with_query_param(url, key, value),
            _ => url.to_string(),
        }
    }
}

fn with_query_param(url: &str, key: &str, value: &str) -> String {
    let (base, fragment) = match url.split_once('#') {
        Some((b, f)) => (b, Some(f)),
        None => (url, None),
    };

    let already_set = base
        .split_once('?')
        .map(|(_, q)| q.split('&').any(|pair| pair.split('=').next() == Some(key)))
        .unwrap_or(false);
    if already_set {
        return url.to_string();
    }

    let sep = if base.contains('?') {
        if base.ends_with('?') || base.ends_with('&') { "" } else { "&" }
    } else {
        "?"
    };
    let mut out = format!("{base}{sep}{key}={}", urlencoding::encode(value));
    if let Some(f) = fragment {
        out.push('#');
        out.push_str(f);
    }
    out
}
