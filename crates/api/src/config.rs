//! Server configuration from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;
use tracing::{info, warn};

use shopwise_catalog::AffiliateTags;

use crate::views::i18n::Locale;

const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },

    #[error("{0} must be set when USE_PERSISTENT_STORES=true")]
    Missing(&'static str),
}

/// Where catalog data lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
    InMemory,
    Postgres { database_url: String },
}

/// The single admin account allowed to sign in.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    /// bcrypt hash.
    pub password_hash: String,
}

impl core::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub persistence: Persistence,
    pub seed_file: Option<PathBuf>,
    /// `None` disables sign-in entirely.
    pub admin: Option<AdminCredentials>,
    pub session_ttl: chrono::Duration,
    /// Adds `Secure` to the session cookie.
    pub secure_cookies: bool,
    pub affiliate: AffiliateTags,
    pub default_locale: Locale,
}

impl AppConfig {
    /// Load from process environment (after `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let jwt_secret = var("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let use_persistent: bool = parse_or(&var, "USE_PERSISTENT_STORES", false)?;
        let persistence = if use_persistent {
            let database_url = var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
            Persistence::Postgres { database_url }
        } else {
            Persistence::InMemory
        };

        let admin = match (var("ADMIN_USERNAME"), var("ADMIN_PASSWORD_HASH")) {
            (Some(username), Some(password_hash)) => Some(AdminCredentials { username, password_hash }),
            (None, None) => {
                info!("ADMIN_USERNAME / ADMIN_PASSWORD_HASH not set; sign-in disabled");
                None
            }
            _ => {
                return Err(ConfigError::Invalid {
                    key: "ADMIN_USERNAME",
                    message: "ADMIN_USERNAME and ADMIN_PASSWORD_HASH must be set together".to_string(),
                });
            }
        };

        let ttl_minutes: i64 = parse_or(&var, "SESSION_TTL_MINUTES", 60)?;
        if ttl_minutes <= 0 {
            return Err(ConfigError::Invalid {
                key: "SESSION_TTL_MINUTES",
                message: "must be positive".to_string(),
            });
        }

        let default_locale = match var("DEFAULT_LOCALE") {
            Some(code) => Locale::from_code(&code).ok_or_else(|| ConfigError::Invalid {
                key: "DEFAULT_LOCALE",
                message: format!("unsupported locale '{code}'"),
            })?,
            None => Locale::default(),
        };

        Ok(Self {
            bind_addr: parse_or(&var, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?,
            jwt_secret,
            persistence,
            seed_file: var("SEED_FILE").map(PathBuf::from),
            admin,
            session_ttl: chrono::Duration::minutes(ttl_minutes),
            secure_cookies: parse_or(&var, "SECURE_COOKIES", false)?,
            affiliate: AffiliateTags {
                amazon_associate_tag: var("AMAZON_ASSOCIATE_TAG"),
                rakuten_affiliate_id: var("RAKUTEN_AFFILIATE_ID"),
            },
            default_locale,
        })
    }

    /// In-memory config with the given signing secret and no admin account.
    pub fn for_tests(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            jwt_secret: jwt_secret.into(),
            persistence: Persistence::InMemory,
            seed_file: None,
            admin: None,
            session_ttl: chrono::Duration::minutes(10),
            secure_cookies: false,
            affiliate: AffiliateTags::default(),
            default_locale: Locale::default(),
        }
    }
}

fn parse_or<T>(
    var: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: core::fmt::Display,
{
    match var(key) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}
