//! Supported page locales and their UI strings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ja,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Ja];

    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ja => "ja",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|l| l.code().eq_ignore_ascii_case(code.trim()))
    }

    pub fn messages(&self) -> &'static Messages {
        match self {
            Locale::En => &EN,
            Locale::Ja => &JA,
        }
    }
}

/// UI strings for one locale.
#[derive(Debug)]
pub struct Messages {
    pub search: &'static str,
    pub search_placeholder: &'static str,
    pub tags: &'static str,
    pub results: &'static str,
    pub no_results: &'static str,
    pub previous: &'static str,
    pub next: &'static str,
    pub buy: &'static str,
    pub reviews: &'static str,
    pub not_found: &'static str,
    pub unavailable: &'static str,
    pub admin: &'static str,
    pub products: &'static str,
    pub sign_in: &'static str,
    pub sign_out: &'static str,
    pub username: &'static str,
    pub password: &'static str,
    pub invalid_credentials: &'static str,
}

static EN: Messages = Messages {
    search: "Search",
    search_placeholder: "Search products",
    tags: "Tags",
    results: "results",
    no_results: "No products found.",
    previous: "Previous",
    next: "Next",
    buy: "View at store",
    reviews: "reviews",
    not_found: "Page not found",
    unavailable: "The catalog is temporarily unavailable.",
    admin: "Admin",
    products: "Products",
    sign_in: "Sign in",
    sign_out: "Sign out",
    username: "Username",
    password: "Password",
    invalid_credentials: "Invalid username or password",
};

static JA: Messages = Messages {
    search: "検索",
    search_placeholder: "商品を検索",
    tags: "タグ",
    results: "件",
    no_results: "商品が見つかりませんでした。",
    previous: "前へ",
    next: "次へ",
    buy: "ストアで見る",
    reviews: "件のレビュー",
    not_found: "ページが見つかりません",
    unavailable: "現在カタログを利用できません。",
    admin: "管理",
    products: "商品",
    sign_in: "ログイン",
    sign_out: "ログアウト",
    username: "ユーザー名",
    password: "パスワード",
    invalid_credentials: "ユーザー名またはパスワードが正しくありません",
};
