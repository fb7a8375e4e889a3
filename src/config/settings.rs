use serde::{Deserialize, Serialize};
use config::{Config, ConfigError, File};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub app: AppSettings,
    pub api: ApiSettings,
    pub cache: CacheSettings,
    pub activity: ActivitySettings,
    pub nft: NftSettings,
    pub tokens: TokenSettings,
    pub providers: ProviderSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub version: String,
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    pub summary_ttl_seconds: u64,
}

/// Knobs of the wallet activity aggregation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitySettings {
    pub window_days: i64,
    pub max_pages: u32,
    pub page_size: u32,
    pub receipt_concurrency: usize,
    pub receipt_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub retry_step_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NftSettings {
    pub max_pages: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSettings {
    pub portfolio_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub alchemy_api_key: Option<String>,
    pub neynar_api_key: Option<String>,
    pub dexscreener_base_url: String,
    pub neynar_base_url: String,
    pub default_profile_query: String,
}

/// Upper bound for `activity.window_days`
pub const MAX_WINDOW_DAYS: i64 = 3650;

impl Default for Settings {
    fn default() -> Self {
        Self {
            app: AppSettings {
                name: "Base Guardian".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                log_level: "info".to_string(),
            },
            api: ApiSettings {
                host: "0.0.0.0".to_string(),
                port: 8080,
                cors_origins: vec!["*".to_string()],
            },
            cache: CacheSettings {
                summary_ttl_seconds: 120, // 2 minutes
            },
            activity: ActivitySettings {
                window_days: 30,
                max_pages: 10, // up to ~10k transfers per direction
                page_size: 1000,
                receipt_concurrency: 5,
                receipt_attempts: 2,
                retry_base_delay_ms: 300,
                retry_step_delay_ms: 200,
            },
            nft: NftSettings {
                max_pages: 3,
                page_size: 100,
            },
            tokens: TokenSettings {
                portfolio_limit: 20,
            },
            providers: ProviderSettings {
                alchemy_api_key: None,
                neynar_api_key: None,
                dexscreener_base_url: "https://api.dexscreener.com/tokens/v1".to_string(),
                neynar_base_url: "https://api.neynar.com/v2/farcaster".to_string(),
                default_profile_query: "532764".to_string(),
            },
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("BASE_GUARDIAN").separator("__"))
            .build()?;

        let settings: Settings = s.try_deserialize()?;
        Ok(settings.with_env_keys())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::from(path.as_ref()))
            .build()?;

        let settings: Settings = s.try_deserialize()?;
        Ok(settings.with_env_keys())
    }

    /// Fill provider keys from the conventional variables when unset
    fn with_env_keys(mut self) -> Self {
        if self.providers.alchemy_api_key.is_none() {
            self.providers.alchemy_api_key = non_empty_env("ALCHEMY_BASE_API_KEY");
        }
        if self.providers.neynar_api_key.is_none() {
            self.providers.neynar_api_key = non_empty_env("NEYNAR_API_KEY");
        }
        self
    }

    pub fn summary_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.summary_ttl_seconds)
    }

    pub fn validate(&self) -> Result<(), String> {
        let a = &self.activity;
        if a.window_days <= 0 {
            return Err("Activity window must be at least one day".to_string());
        }
        if a.window_days > MAX_WINDOW_DAYS {
            return Err(format!("Activity window must be at most {} days", MAX_WINDOW_DAYS));
        }
        if a.max_pages == 0 || self.nft.max_pages == 0 {
            return Err("Page caps must be positive".to_string());
        }
        if a.page_size == 0 || self.nft.page_size == 0 {
            return Err("Page sizes must be positive".to_string());
        }
        if a.receipt_concurrency == 0 {
            return Err("Receipt concurrency must be positive".to_string());
        }
        if a.receipt_attempts == 0 {
            return Err("Receipt attempts must be positive".to_string());
        }
        if self.tokens.portfolio_limit == 0 {
            return Err("Portfolio limit must be positive".to_string());
        }

        Ok(())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.activity.receipt_concurrency, 5);
        assert_eq!(settings.summary_ttl(), Duration::from_secs(120));
    }

    #[test]
    fn test_window_bounds() {
        let mut settings = Settings::default();
        settings.activity.window_days = MAX_WINDOW_DAYS;
        assert!(settings.validate().is_ok());

        settings.activity.window_days = i64::MAX;
        assert!(settings.validate().is_err());
        settings.activity.window_days = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut settings = Settings::default();
        settings.activity.receipt_concurrency = 0;
        assert!(settings.validate().is_err());
    }
}
