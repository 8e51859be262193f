//! Configuration module
//!
//! Settings are read from the process environment (after loading an optional
//! `.env` file). Everything has a development-friendly default except the
//! credentials, which stay `None` until provided.

use std::env;

const SERVER_PORT: u16 = 5000;
const MAX_CONNECTIONS: u32 = 5;
const CONNECTION_TIMEOUT_SECS: u64 = 10;
const SMTP_HOST: &str = "smtp.gmail.com";
const SMTP_PORT: u16 = 587;
const SMTP_TIMEOUT_SECS: u64 = 30;
const TRUSTED_PROXY_COUNT: usize = 1;
const REQUEST_TIMEOUT_SECS: u64 = 60;
const MAX_BODY_BYTES: usize = 64 * 1024;

pub const CONTACT_RATE_LIMIT: &str = "10 per hour; 1 per minute";
pub const SUBSCRIBE_RATE_LIMIT: &str = "20 per hour";
pub const RESUME_RATE_LIMIT: &str = "5 per hour; 20 per day";

/// Origins the frontend is served from during local development.
const DEFAULT_CORS_ORIGINS: [&str; 2] = ["null", "http://127.0.0.1:5500"];

/// Document storage backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// Document store connection settings
#[derive(Clone, Debug)]
pub struct DatabaseSettings {
    pub backend: StorageBackend,
    pub url: Option<String>,
    pub max_connections: u32,
    pub timeout_seconds: u64,
}

/// Outbound SMTP relay settings
#[derive(Clone, Debug)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub from: Option<String>,
    pub tls: bool,
    pub timeout_secs: u64,
}

impl SmtpSettings {
    /// Sender address, falling back to the login user.
    pub fn sender(&self) -> Option<&str> {
        self.from.as_deref().or(self.user.as_deref())
    }

    pub fn has_credentials(&self) -> bool {
        self.user.is_some() && self.password.is_some()
    }
}

/// Resume attachment settings
#[derive(Clone, Debug)]
pub struct ResumeSettings {
    pub path: String,
    pub filename: String,
    pub owner: Option<String>,
}

/// Per-route rate limit policies in `"N per unit; M per unit"` form
#[derive(Clone, Debug)]
pub struct RateLimitSettings {
    pub contact: String,
    pub subscribe: String,
    pub resume: String,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub frontend_dir: String,
    pub contact_recipient: Option<String>,
    pub trusted_proxy_count: usize,
    pub request_timeout_secs: u64,
    pub max_body_bytes: usize,
    pub log_format: String,
    pub database: DatabaseSettings,
    pub smtp: SmtpSettings,
    pub resume: ResumeSettings,
    pub rate_limits: RateLimitSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Build configuration from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // First non-blank value among the given keys
        let first = |keys: &[&str]| -> Option<String> {
            keys.iter()
                .filter_map(|key| lookup(key))
                .map(|v| v.trim().to_string())
                .find(|v| !v.is_empty())
        };
        let flag = |key: &str, default: bool| -> bool {
            first(&[key])
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(default)
        };

        let environment = first(&["ENVIRONMENT", "APP_ENV"]).unwrap_or_else(|| "development".to_string());

        let cors_origins = match first(&["CORS_ORIGINS"]) {
            Some(list) => list
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => {
                let mut origins: Vec<String> =
                    DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect();
                if let Some(frontend_url) = first(&["FRONTEND_URL", "RENDER_FRONTEND_URL"]) {
                    origins.push(frontend_url);
                }
                origins
            }
        };

        let backend = match first(&["STORAGE_BACKEND"]).map(|s| s.to_lowercase()) {
            Some(ref s) if s == "memory" => StorageBackend::Memory,
            _ => StorageBackend::Postgres,
        };

        let database = DatabaseSettings {
            backend,
            url: first(&["DATABASE_URL"]),
            max_connections: first(&["DB_MAX_CONNECTIONS"])
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_CONNECTIONS),
            timeout_seconds: first(&["DB_TIMEOUT_SECONDS"])
                .and_then(|s| s.parse().ok())
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
        };

        let smtp = SmtpSettings {
            host: first(&["SMTP_HOST"]).unwrap_or_else(|| SMTP_HOST.to_string()),
            port: first(&["SMTP_PORT"])
                .and_then(|s| s.parse().ok())
                .unwrap_or(SMTP_PORT),
            user: first(&["SMTP_USER", "SENDER_EMAIL"]),
            password: first(&["SMTP_PASSWORD", "SENDER_PASSWORD"]),
            from: first(&["SMTP_FROM"]),
            tls: flag("SMTP_TLS", true),
            timeout_secs: first(&["SMTP_TIMEOUT_SECS"])
                .and_then(|s| s.parse().ok())
                .unwrap_or(SMTP_TIMEOUT_SECS),
        };

        let frontend_dir = first(&["FRONTEND_DIR"]).unwrap_or_else(|| "frontend".to_string());

        let resume = ResumeSettings {
            path: first(&["RESUME_PATH"])
                .unwrap_or_else(|| format!("{}/assets/resume.pdf", frontend_dir)),
            filename: first(&["RESUME_FILENAME"]).unwrap_or_else(|| "Resume.pdf".to_string()),
            owner: first(&["RESUME_OWNER"]),
        };

        let rate_limits = RateLimitSettings {
            contact: first(&["RATE_LIMIT_CONTACT"]).unwrap_or_else(|| CONTACT_RATE_LIMIT.to_string()),
            subscribe: first(&["RATE_LIMIT_SUBSCRIBE"])
                .unwrap_or_else(|| SUBSCRIBE_RATE_LIMIT.to_string()),
            resume: first(&["RATE_LIMIT_RESUME"]).unwrap_or_else(|| RESUME_RATE_LIMIT.to_string()),
        };

        Self {
            server_port: first(&["PORT"])
                .and_then(|s| s.parse().ok())
                .unwrap_or(SERVER_PORT),
            environment,
            cors_origins,
            frontend_dir,
            contact_recipient: first(&["CONTACT_RECIPIENT", "RECIPIENT_EMAIL"]),
            trusted_proxy_count: first(&["TRUSTED_PROXY_COUNT"])
                .and_then(|s| s.parse().ok())
                .unwrap_or(TRUSTED_PROXY_COUNT),
            request_timeout_secs: first(&["REQUEST_TIMEOUT_SECS"])
                .and_then(|s| s.parse().ok())
                .unwrap_or(REQUEST_TIMEOUT_SECS),
            max_body_bytes: first(&["MAX_BODY_BYTES"])
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_BODY_BYTES),
            log_format: first(&["LOG_FORMAT"])
                .map(|s| s.to_lowercase())
                .unwrap_or_else(|| "compact".to_string()),
            database,
            smtp,
            resume,
            rate_limits,
        }
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        matches!(self.environment.to_lowercase().as_str(), "production" | "prod")
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.database.max_connections == 0 {
            return Err(anyhow::anyhow!("DB_MAX_CONNECTIONS cannot be 0"));
        }

        if self.database.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("DB_TIMEOUT_SECONDS cannot be 0"));
        }

        if self.smtp.host.is_empty() {
            return Err(anyhow::anyhow!("SMTP_HOST cannot be empty"));
        }

        if self.smtp.timeout_secs == 0 {
            return Err(anyhow::anyhow!("SMTP_TIMEOUT_SECS cannot be 0"));
        }

        if self.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("REQUEST_TIMEOUT_SECS cannot be 0"));
        }

        if self.max_body_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_BODY_BYTES cannot be 0"));
        }

        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        Ok(())
    }
}
