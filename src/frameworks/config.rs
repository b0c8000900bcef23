use std::{env, time::Duration};

// Placeholder secret for local development only; refused in production.
const DEV_SECRET: &str = "dev-secret-change-me";

const DEFAULT_TOKEN_TTL_MS: u64 = 24 * 60 * 60 * 1000;

// Runtime configuration, resolved once at startup and passed explicitly into
// the components that need it. The token secret is never read from ambient
// environment state anywhere else.
#[derive(Clone)]
pub struct GatewayConfig {
    pub port: u16,
    pub token_secret: String,
    pub token_ttl_ms: u64,
    pub store_base_url: String,
    pub notifier_base_url: String,
    pub store_timeout: Duration,
    pub sweep_interval: Duration,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, String> {
        let production = matches!(env::var("APP_ENV").as_deref(), Ok("production"));

        let token_secret = env::var("SESSION_TOKEN_SECRET").unwrap_or_else(|_| DEV_SECRET.to_string());
        if production && token_secret == DEV_SECRET {
            return Err("SESSION_TOKEN_SECRET must be set to a non-default value in production".to_string());
        }

        Ok(Self {
            port: env_parsed("GATEWAY_PORT", 3003),
            token_secret,
            token_ttl_ms: env_parsed("SESSION_TOKEN_TTL_MS", DEFAULT_TOKEN_TTL_MS),
            store_base_url: env::var("GUEST_STORE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:4000".to_string()),
            notifier_base_url: env::var("NOTIFIER_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:4001".to_string()),
            store_timeout: Duration::from_millis(env_parsed("STORE_TIMEOUT_MS", 5_000)),
            sweep_interval: Duration::from_secs(env_parsed("RATE_SWEEP_INTERVAL_SECS", 60)),
        })
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
