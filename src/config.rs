use std::path::PathBuf;

use anyhow::Context;
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const APP_NAME: &str = "EthicalFreelance";
pub const VERSION: &str = "1.0.0";

const DEFAULT_SESSION_TTL_MINUTES: i64 = 24 * 60;
/// One year.
const MAX_SESSION_TTL_MINUTES: i64 = 365 * 24 * 60;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub jobs_per_page: usize,
    pub min_password_length: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            jobs_per_page: 10,
            min_password_length: 6,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureFlags {
    pub enable_payments: bool,
    pub enable_chat: bool,
    pub enable_notifications: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            enable_payments: false,
            enable_chat: false,
            enable_notifications: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub session: SessionConfig,
    pub settings: Settings,
    pub features: FeatureFlags,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = match std::env::var("APP_PORT") {
            Ok(v) => v.parse()?,
            Err(_) => 8080,
        };
        let secret = std::env::var("SESSION_SECRET").unwrap_or_else(|_| {
            warn!("SESSION_SECRET not set; using a random secret, sessions will not survive a restart");
            random_secret()
        });
        let session = SessionConfig {
            secret,
            ttl_minutes: session_ttl(std::env::var("SESSION_TTL_MINUTES").ok().as_deref())?,
        };
        Ok(Self {
            data_dir,
            host,
            port,
            session,
            settings: Settings::default(),
            features: FeatureFlags::default(),
        })
    }
}

fn session_ttl(raw: Option<&str>) -> anyhow::Result<i64> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_SESSION_TTL_MINUTES);
    };
    let minutes: i64 = raw
        .trim()
        .parse()
        .with_context(|| format!("SESSION_TTL_MINUTES is not a number: {raw:?}"))?;
    anyhow::ensure!(
        (1..=MAX_SESSION_TTL_MINUTES).contains(&minutes),
        "SESSION_TTL_MINUTES must be between 1 and {MAX_SESSION_TTL_MINUTES}, got {minutes}"
    );
    Ok(minutes)
}

fn random_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}
