//! Process configuration read from environment variables.
//!
//! | Variable                | Default        |
//! |-------------------------|----------------|
//! | `BIND_ADDR`             | `0.0.0.0:8080` |
//! | `USE_PERSISTENT_STORES` | `false`        |
//! | `DATABASE_URL`          | required when persistent |
//! | `SHOPIFY_SHOP_DOMAIN`   | unset selects the demo catalog |
//! | `SHOPIFY_ACCESS_TOKEN`  | required with a shop domain |
//! | `SHOPIFY_API_VERSION`   | `2024-10`      |
//! | `CATALOG_PAGE_SIZE`     | `100` (1..=250) |
//! | `CATALOG_TIMEOUT_MS`    | `10000`        |
//!
//! A variable that is present but malformed is an error; it never falls back
//! to the default.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use premier_catalog::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_API_VERSION: &str = "2024-10";
pub const DEFAULT_CATALOG_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} is required: {reason}")]
    Missing { name: &'static str, reason: &'static str },

    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Where premium overlay records live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayStoreConfig {
    InMemory,
    Postgres { database_url: String },
}

#[derive(Clone, PartialEq, Eq)]
pub struct ShopifyConfig {
    pub shop_domain: String,
    pub access_token: String,
    pub api_version: String,
}

impl ShopifyConfig {
    pub fn graphql_endpoint(&self) -> String {
        format!(
            "https://{}/admin/api/{}/graphql.json",
            self.shop_domain, self.api_version
        )
    }
}

impl core::fmt::Debug for ShopifyConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ShopifyConfig")
            .field("shop_domain", &self.shop_domain)
            .field("access_token", &"<redacted>")
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// Which catalog the listing reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogConfig {
    Demo,
    Shopify(ShopifyConfig),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingConfig {
    pub page_size: usize,
    pub gateway_timeout: Duration,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            gateway_timeout: Duration::from_millis(DEFAULT_CATALOG_TIMEOUT_MS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub overlay_store: OverlayStoreConfig,
    pub catalog: CatalogConfig,
    pub listing: ListingConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_raw = var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            name: "BIND_ADDR",
            value: bind_raw.clone(),
            reason: e.to_string(),
        })?;

        let persistent = match var("USE_PERSISTENT_STORES") {
            None => false,
            Some(raw) => parse_bool("USE_PERSISTENT_STORES", &raw)?,
        };
        let overlay_store = if persistent {
            let database_url = var("DATABASE_URL").ok_or(ConfigError::Missing {
                name: "DATABASE_URL",
                reason: "USE_PERSISTENT_STORES is enabled",
            })?;
            OverlayStoreConfig::Postgres { database_url }
        } else {
            OverlayStoreConfig::InMemory
        };

        let catalog = match var("SHOPIFY_SHOP_DOMAIN") {
            None => CatalogConfig::Demo,
            Some(shop_domain) => {
                let access_token = var("SHOPIFY_ACCESS_TOKEN").ok_or(ConfigError::Missing {
                    name: "SHOPIFY_ACCESS_TOKEN",
                    reason: "SHOPIFY_SHOP_DOMAIN is set",
                })?;
                let api_version =
                    var("SHOPIFY_API_VERSION").unwrap_or_else(|| DEFAULT_API_VERSION.to_string());
                CatalogConfig::Shopify(ShopifyConfig {
                    shop_domain,
                    access_token,
                    api_version,
                })
            }
        };

        let page_size = match var("CATALOG_PAGE_SIZE") {
            None => DEFAULT_PAGE_SIZE,
            Some(raw) => {
                let n = parse_number::<usize>("CATALOG_PAGE_SIZE", &raw)?;
                if !(1..=MAX_PAGE_SIZE).contains(&n) {
                    return Err(ConfigError::Invalid {
                        name: "CATALOG_PAGE_SIZE",
                        value: raw,
                        reason: format!("must be between 1 and {MAX_PAGE_SIZE}"),
                    });
                }
                n
            }
        };

        let timeout_ms = match var("CATALOG_TIMEOUT_MS") {
            None => DEFAULT_CATALOG_TIMEOUT_MS,
            Some(raw) => {
                let ms = parse_number::<u64>("CATALOG_TIMEOUT_MS", &raw)?;
                if ms == 0 {
                    return Err(ConfigError::Invalid {
                        name: "CATALOG_TIMEOUT_MS",
                        value: raw,
                        reason: "must be positive".to_string(),
                    });
                }
                ms
            }
        };

        Ok(Self {
            bind_addr,
            overlay_store,
            catalog,
            listing: ListingConfig {
                page_size,
                gateway_timeout: Duration::from_millis(timeout_ms),
            },
        })
    }
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: raw.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}

fn parse_number<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::Invalid {
        name,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(cfg.overlay_store, OverlayStoreConfig::InMemory);
        assert_eq!(cfg.catalog, CatalogConfig::Demo);
        assert_eq!(cfg.listing, ListingConfig::default());
    }

    #[test]
    fn persistent_store_requires_database_url() {
        let err = config(&[("USE_PERSISTENT_STORES", "true")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { name: "DATABASE_URL", .. }));

        let cfg = config(&[
            ("USE_PERSISTENT_STORES", "1"),
            ("DATABASE_URL", "postgres://localhost/premier"),
        ])
        .unwrap();
        assert!(matches!(cfg.overlay_store, OverlayStoreConfig::Postgres { .. }));
    }

    #[test]
    fn shopify_requires_token_and_builds_endpoint() {
        assert!(config(&[("SHOPIFY_SHOP_DOMAIN", "acme.myshopify.com")]).is_err());

        let cfg = config(&[
            ("SHOPIFY_SHOP_DOMAIN", "acme.myshopify.com"),
            ("SHOPIFY_ACCESS_TOKEN", "shpat_secret"),
        ])
        .unwrap();
        let CatalogConfig::Shopify(shop) = cfg.catalog else {
            panic!("expected shopify catalog");
        };
        assert_eq!(
            shop.graphql_endpoint(),
            "https://acme.myshopify.com/admin/api/2024-10/graphql.json"
        );
        assert!(!format!("{shop:?}").contains("shpat_secret"));
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(config(&[("BIND_ADDR", "nowhere")]).is_err());
        assert!(config(&[("USE_PERSISTENT_STORES", "maybe")]).is_err());
        assert!(config(&[("CATALOG_PAGE_SIZE", "0")]).is_err());
        assert!(config(&[("CATALOG_PAGE_SIZE", "251")]).is_err());
        assert!(config(&[("CATALOG_TIMEOUT_MS", "soon")]).is_err());
    }

    #[test]
    fn listing_knobs_are_read() {
        let cfg = config(&[("CATALOG_PAGE_SIZE", "250"), ("CATALOG_TIMEOUT_MS", "1500")]).unwrap();
        assert_eq!(cfg.listing.page_size, 250);
        assert_eq!(cfg.listing.gateway_timeout, Duration::from_millis(1500));
    }
}
