//! # Application Configuration Loader
//!
//! Collects everything an application needs to run the mailer: which
//! transport to deliver through and, optionally, where emails are stored.
//!
//! Automatically loads `.env` files for non-production environments.
//! It checks for a custom `DOTENV_FILE` path first, then falls back to
//! `.env.{APP_ENV}` or `.env`.
//!
//! # Environment Variables
//! | Variable | Description | Default |
//! |-----------|-------------|----------|
//! | `APP_ENV` | Current environment (`development`, `production`, etc.) | `"development"` |
//! | `DOTENV_FILE` | Optional path to a custom dotenv file | *none* |
//! | `MAIL_ADAPTER` | `smtp` or `local` | `"smtp"` |
//! | `SMTP_HOST` / `SMTP_PORT` | SMTP relay (for `smtp`) | *required* |
//! | `SMTP_USERNAME` / `SMTP_PASSWORD` | Relay credentials | *none* |
//! | `SMTP_STARTTLS` | Use STARTTLS | `true` |
//! | `SMTP_TIMEOUT_SECS` | SMTP command timeout | `30` |
//! | `DATABASE_URL` | MySQL connection URL | *none* |
//! | `DATABASE_MAX_CONN` | Maximum pool size | driver default |
//!
//! # Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use wzs_mailer::config::app::AppConfig;
//! use wzs_mailer::notification::sender::Mailer;
//! use wzs_mailer::notification::transport::build_transport;
//!
//! let cfg = AppConfig::from_env().expect("invalid configuration");
//! let mailer = Mailer::new(build_transport(&cfg.mail).expect("transport"));
//! ```

use std::env;

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::{db::DbConfig, mail::MailAdapter};

/// Top-level application configuration.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Current environment name (`APP_ENV`).
    pub app_env: String,
    /// Selected transport and its settings.
    pub mail: MailAdapter,
    /// Database configuration.
    pub db: DbConfig,
}

impl AppConfig {
    /// Loads application configuration from environment variables.
    ///
    /// ## Behavior
    /// - Reads `APP_ENV` (defaults to `"development"`).
    /// - Loads `.env` or `.env.{APP_ENV}` for non-production environments.
    /// - Parses the mail and database settings.
    ///
    /// # Errors
    /// Fails when the mail adapter is unknown or its SMTP settings are
    /// incomplete.
    pub fn from_env() -> Result<Self> {
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());

        if app_env != "production" {
            load_dotenv(&app_env);
        }

        Ok(AppConfig {
            mail: MailAdapter::from_env().context("mail configuration")?,
            db: DbConfig::from_env(),
            app_env,
        })
    }

    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }
}

fn load_dotenv(app_env: &str) {
    if let Ok(path) = env::var("DOTENV_FILE") {
        if let Err(e) = dotenvy::from_filename(&path) {
            debug!("dotenv file {path} not loaded: {e}");
        }
    } else {
        let candidate = format!(".env.{}", app_env);
        dotenvy::from_filename(&candidate)
            .or_else(|_| dotenvy::dotenv())
            .ok();
    }
}
