//! Configuration management for the server.

use std::env;
use stockpile_engine::MergeStrategy;

/// Collections included in an ordinary export when none are configured.
pub const DEFAULT_EXPORT_COLLECTIONS: &[&str] = &[
    "products",
    "orders",
    "users",
    "categories",
    "campaigns",
    "settings",
];

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// PostgreSQL connection URL
    pub database_url: String,
    /// Allow-list used by `GET /export`, in output order
    pub export_collections: Vec<String>,
    /// Default name prefix used by `GET /backup`
    pub backup_prefix: String,
    /// Default merge policy for `POST /import`
    pub merge_strategy: MergeStrategy,
    /// Emit `name:type` header columns by default
    pub typed_headers: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::MissingDatabaseUrl)?;

        let export_collections = match lookup("EXPORT_COLLECTIONS") {
            Some(list) => parse_list(&list),
            None => DEFAULT_EXPORT_COLLECTIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        };

        let backup_prefix = lookup("BACKUP_PREFIX").unwrap_or_default();

        let merge_key = lookup("MERGE_KEY");
        let merge_strategy = MergeStrategy::parse(
            lookup("MERGE_STRATEGY").as_deref().unwrap_or("concatenate"),
            merge_key.as_deref(),
        )
        .map_err(|e| ConfigError::InvalidMergeStrategy(e.to_string()))?;

        let typed_headers = match lookup("TYPED_HEADERS").as_deref() {
            None | Some("") => false,
            Some(v) => parse_bool(v).ok_or(ConfigError::InvalidTypedHeaders)?,
        };

        Ok(Self {
            host,
            port,
            database_url,
            export_collections,
            backup_prefix,
            merge_strategy,
            typed_headers,
        })
    }
}

fn parse_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("DATABASE_URL environment variable is required")]
    MissingDatabaseUrl,

    #[error("Invalid PORT value")]
    InvalidPort,

    #[error("Invalid MERGE_STRATEGY value: {0}")]
    InvalidMergeStrategy(String),

    #[error("Invalid TYPED_HEADERS value")]
    InvalidTypedHeaders,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/shop")]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.export_collections.len(), 6);
        assert_eq!(config.export_collections[0], "products");
        assert_eq!(config.backup_prefix, "");
        assert_eq!(config.merge_strategy, MergeStrategy::Concatenate);
        assert!(!config.typed_headers);
    }

    #[test]
    fn overrides() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("PORT", "8080"),
            ("EXPORT_COLLECTIONS", " orders, ,users "),
            ("BACKUP_PREFIX", "shop_"),
            ("MERGE_STRATEGY", "replace-by-id"),
            ("MERGE_KEY", "sku"),
            ("TYPED_HEADERS", "yes"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.export_collections, vec!["orders", "users"]);
        assert_eq!(config.backup_prefix, "shop_");
        assert_eq!(
            config.merge_strategy,
            MergeStrategy::ReplaceById { key: "sku".into() }
        );
        assert!(config.typed_headers);
    }

    #[test]
    fn missing_database_url() {
        assert!(matches!(load(&[]), Err(ConfigError::MissingDatabaseUrl)));
    }

    #[test]
    fn invalid_values() {
        let url = ("DATABASE_URL", "postgres://localhost/shop");
        assert!(matches!(
            load(&[url, ("PORT", "http")]),
            Err(ConfigError::InvalidPort)
        ));
        assert!(matches!(
            load(&[url, ("MERGE_STRATEGY", "upsert")]),
            Err(ConfigError::InvalidMergeStrategy(_))
        ));
        assert!(matches!(
            load(&[url, ("TYPED_HEADERS", "maybe")]),
            Err(ConfigError::InvalidTypedHeaders)
        ));
    }
}
