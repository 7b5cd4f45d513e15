use std::{env, str::FromStr, time::Duration};

use agro_common::{Secret, Tenge};
use agro_payment_engine::{
    db_types::BuyerId,
    flow_api::{FlowConfig, DEFAULT_DELIVERY_PRICE, DEFAULT_SUBSCRIPTION_FEE},
};
use log::*;

const DEFAULT_AGRO_HOST: &str = "127.0.0.1";
const DEFAULT_AGRO_PORT: u16 = 8080;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/agro.db";
const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
const DEFAULT_SWEEP_INTERVAL_HOURS: u64 = 24;
const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub telegram: TelegramConfig,
    pub sessions: SessionConfig,
    /// Prices and payment instructions handed to the workflow engine.
    pub flow: FlowConfig,
    /// How often expired subscriptions are swept.
    pub sweep_interval: Duration,
    /// How long in-flight requests are given to finish once shutdown starts.
    pub shutdown_grace: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_AGRO_HOST.to_string(),
            port: DEFAULT_AGRO_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            telegram: TelegramConfig::default(),
            sessions: SessionConfig::default(),
            flow: FlowConfig::default(),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_HOURS * 3600),
            shutdown_grace: Duration::from_secs(DEFAULT_SHUTDOWN_GRACE_SECS),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("AGRO_HOST").ok().unwrap_or_else(|| DEFAULT_AGRO_HOST.into());
        let port = parse_env_or("AGRO_PORT", DEFAULT_AGRO_PORT);
        let database_url = env::var("AGRO_DATABASE_URL").ok().unwrap_or_else(|| {
            info!("🪛️ AGRO_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let telegram = TelegramConfig::from_env_or_default();
        let sessions = SessionConfig::from_env_or_default();
        let flow = flow_config_from_env();
        let sweep_hours = parse_env_or("AGRO_SWEEP_INTERVAL", DEFAULT_SWEEP_INTERVAL_HOURS).max(1);
        let shutdown_grace = parse_env_or("AGRO_SHUTDOWN_GRACE", DEFAULT_SHUTDOWN_GRACE_SECS);
        Self {
            host,
            port,
            database_url,
            telegram,
            sessions,
            flow,
            sweep_interval: Duration::from_secs(sweep_hours * 3600),
            shutdown_grace: Duration::from_secs(shutdown_grace),
        }
    }
}

/// Reads `key` from the environment, falling back to `default` (with a log line) if it is missing or invalid.
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(s) => s.trim().parse::<T>().unwrap_or_else(|e| {
            warn!("🪛️ {s} is not a valid value for {key}. {e} Using the default, {default}, instead.");
            default
        }),
        Err(_) => {
            info!("🪛️ {key} is not set. Using the default, {default}.");
            default
        },
    }
}

fn flow_config_from_env() -> FlowConfig {
    let defaults = FlowConfig::default();
    let subscription_fee = Tenge::from(parse_env_or("AGRO_SUBSCRIPTION_FEE", DEFAULT_SUBSCRIPTION_FEE));
    let delivery_price = Tenge::from(parse_env_or("AGRO_DELIVERY_PRICE", DEFAULT_DELIVERY_PRICE));
    let kaspi_pay_url = env::var("AGRO_KASPI_PAY_URL").unwrap_or(defaults.kaspi_pay_url);
    let card_number = env::var("AGRO_KASPI_CARD_NUMBER").unwrap_or_else(|_| {
        warn!("🪛️ AGRO_KASPI_CARD_NUMBER is not set. Buyers will be shown the placeholder card number.");
        defaults.card_number
    });
    let card_holder = env::var("AGRO_KASPI_CARD_HOLDER").unwrap_or(defaults.card_holder);
    FlowConfig { subscription_fee, delivery_price, kaspi_pay_url, card_number, card_holder }
}

//-------------------------------------------------  TelegramConfig  ---------------------------------------------------
#[derive(Clone, Debug, Default)]
pub struct TelegramConfig {
    pub bot_token: Secret<String>,
    pub api_url: String,
    /// When set, webhook calls must carry this value in `X-Telegram-Bot-Api-Secret-Token`.
    pub webhook_secret: Option<Secret<String>>,
    pub admin_id: Option<BuyerId>,
    pub mini_app_url: String,
}

impl TelegramConfig {
    pub fn from_env_or_default() -> Self {
        let bot_token = env::var("AGRO_BOT_TOKEN").ok().unwrap_or_else(|| {
            error!("🪛️ AGRO_BOT_TOKEN is not set. The bot will not be able to send any messages.");
            String::default()
        });
        let api_url = env::var("AGRO_TELEGRAM_API_URL").ok().unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string());
        let webhook_secret = env::var("AGRO_WEBHOOK_SECRET").ok().filter(|s| !s.trim().is_empty()).map(Secret::new);
        if webhook_secret.is_none() {
            warn!("🪛️ AGRO_WEBHOOK_SECRET is not set. Webhook calls will not be authenticated.");
        }
        let admin_id = match env::var("AGRO_ADMIN_ID") {
            Ok(s) => s
                .parse::<BuyerId>()
                .map_err(|e| error!("🪛️ AGRO_ADMIN_ID is invalid. {e}. Admin notifications are disabled."))
                .ok(),
            Err(_) => {
                error!("🪛️ AGRO_ADMIN_ID is not set. Admin notifications are disabled.");
                None
            },
        };
        let mini_app_url = env::var("AGRO_MINI_APP_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ AGRO_MINI_APP_URL is not set. The greeting will not carry a mini-app button.");
            String::default()
        });
        Self {
            bot_token: Secret::new(bot_token),
            api_url,
            webhook_secret,
            admin_id,
            mini_app_url: mini_app_url.trim_end_matches('/').to_string(),
        }
    }
}

//-------------------------------------------------  SessionConfig  ----------------------------------------------------
#[derive(Clone, Debug, Default)]
pub struct SessionConfig {
    /// Sessions are kept in Redis when this is set, and in process memory otherwise.
    pub redis_url: Option<Secret<String>>,
    pub ttl: Option<Duration>,
}

impl SessionConfig {
    pub fn from_env_or_default() -> Self {
        let redis_url = env::var("AGRO_REDIS_URL").ok().filter(|s| !s.trim().is_empty()).map(Secret::new);
        if redis_url.is_none() {
            info!("🪛️ AGRO_REDIS_URL is not set. Buyer sessions will be kept in memory.");
        }
        let ttl = env::var("AGRO_SESSION_TTL").ok().and_then(|s| {
            s.trim()
                .parse::<u64>()
                .map(|hours| Duration::from_secs(hours * 3600))
                .map_err(|e| warn!("🪛️ Invalid configuration value for AGRO_SESSION_TTL. {e}. Sessions will not expire."))
                .ok()
        });
        Self { redis_url, ttl }
    }
}

/// The bot settings the HTTP handlers need at request time.
#[derive(Clone, Debug, Default)]
pub struct BotOptions {
    pub admin_id: Option<BuyerId>,
    pub mini_app_url: String,
    pub webhook_secret: Option<Secret<String>>,
}

impl BotOptions {
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_id.is_some_and(|id| id.value() == user_id)
    }
}

impl From<&TelegramConfig> for BotOptions {
    fn from(config: &TelegramConfig) -> Self {
        Self {
            admin_id: config.admin_id,
            mini_app_url: config.mini_app_url.clone(),
            webhook_secret: config.webhook_secret.clone(),
        }
    }
}
