use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub supabase_url: String,
    pub supabase_key: String,
    pub smtp_host: String,
    pub smtp_user: String,
    pub smtp_pass: String,
    pub email_from: String,
    pub employer_email: Option<String>,
    pub max_upload_mb: u64,
    pub data_dir: PathBuf,
    pub uploads_dir: PathBuf,
    pub fallback_dir: PathBuf,
    pub external_timeout_secs: u64,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env_or("SERVER_ADDRESS", "0.0.0.0:8080"),
            supabase_url: get_env("SUPABASE_URL")?,
            supabase_key: get_env("SUPABASE_KEY")?,
            smtp_host: get_env("SMTP_HOST")?,
            smtp_user: get_env("SMTP_USER")?,
            smtp_pass: get_env("SMTP_PASS")?,
            email_from: get_env("EMAIL_FROM")?,
            employer_email: env::var("EMPLOYER_EMAIL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            max_upload_mb: get_env_parse_or("MAX_UPLOAD_MB", 25)?,
            data_dir: get_env_or("DATA_DIR", "./data").into(),
            uploads_dir: get_env_or("UPLOADS_DIR", "./uploads").into(),
            fallback_dir: get_env_or("FALLBACK_DIR", "./storage").into(),
            external_timeout_secs: get_env_parse_or("EXTERNAL_TIMEOUT_SECS", 15)?,
        })
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_mb * 1024 * 1024
    }

    pub fn external_timeout(&self) -> Duration {
        Duration::from_secs(self.external_timeout_secs.max(1))
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join("applications.json")
    }

    pub fn jobs_path(&self) -> PathBuf {
        self.data_dir.join("jobs.json")
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
