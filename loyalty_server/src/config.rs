use std::{env, time::Duration};

use log::*;
use loyalty_common::helpers::parse_boolean_flag;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/loyalty.db";
const DEFAULT_ACCRUAL_SYSTEM_ADDRESS: &str = "http://127.0.0.1:8080";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
const DEFAULT_ACCRUAL_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub database_url: String,
    /// Base address of the accrual service, always with a scheme.
    pub accrual_system_address: String,
    /// How often the order source rescans storage for pending orders.
    pub poll_interval: Duration,
    /// Timeout for a single request to the accrual service.
    pub accrual_timeout: Duration,
    pub db_max_connections: u32,
    /// If true, the server trusts that the schema is already up to date.
    pub skip_migrations: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            accrual_system_address: DEFAULT_ACCRUAL_SYSTEM_ADDRESS.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            accrual_timeout: DEFAULT_ACCRUAL_TIMEOUT,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            skip_migrations: false,
        }
    }
}

impl ServerConfig {
    pub fn from_env_or_default() -> Self {
        let database_url = env::var("LOYALTY_DATABASE_URL").ok().unwrap_or_else(|| {
            info!("🪛️ LOYALTY_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.into()
        });
        let accrual_system_address = env::var("LOYALTY_ACCRUAL_SYSTEM_ADDRESS")
            .ok()
            .map(|s| with_scheme(&s))
            .unwrap_or_else(|| {
                warn!(
                    "🪛️ LOYALTY_ACCRUAL_SYSTEM_ADDRESS is not set. Using the default, \
                     {DEFAULT_ACCRUAL_SYSTEM_ADDRESS}."
                );
                DEFAULT_ACCRUAL_SYSTEM_ADDRESS.into()
            });
        let poll_interval = seconds_from_env("LOYALTY_POLL_INTERVAL", DEFAULT_POLL_INTERVAL);
        let accrual_timeout = seconds_from_env("LOYALTY_ACCRUAL_TIMEOUT", DEFAULT_ACCRUAL_TIMEOUT);
        let db_max_connections = env::var("LOYALTY_DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| {
                s.parse::<u32>()
                    .ok()
                    .filter(|n| *n > 0)
                    .or_else(|| {
                        warn!("🪛️ {s} is not a valid value for LOYALTY_DB_MAX_CONNECTIONS.");
                        None
                    })
            })
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);
        let skip_migrations = parse_boolean_flag(env::var("LOYALTY_SKIP_MIGRATIONS").ok(), false);
        Self {
            database_url,
            accrual_system_address,
            poll_interval,
            accrual_timeout,
            db_max_connections,
            skip_migrations,
        }
    }
}

/// Prefixes `http://` to an address that has no scheme, and drops any trailing slash.
pub fn with_scheme(address: &str) -> String {
    let address = address.trim().trim_end_matches('/');
    if address.starts_with("http://") || address.starts_with("https://") {
        address.to_string()
    } else {
        format!("http://{address}")
    }
}

/// Parses a whole, positive number of seconds.
pub fn parse_seconds(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().filter(|s| *s > 0).map(Duration::from_secs)
}

fn seconds_from_env(name: &str, default: Duration) -> Duration {
    match env::var(name) {
        Ok(s) => parse_seconds(&s).unwrap_or_else(|| {
            warn!("🪛️ Invalid configuration value for {name}: {s}. Using the default of {}s.", default.as_secs());
            default
        }),
        Err(_) => {
            info!("🪛️ {name} is not set. Using the default value of {}s.", default.as_secs());
            default
        },
    }
}
