use std::env;

use anyhow::{Context, Result, bail};

use crate::config::env::{read_flag, read_u32};

/// SMTP relay settings.
///
/// Loaded from environment variables.
///
/// Required:
/// - `SMTP_HOST`, `SMTP_PORT`
///
/// Optional:
/// - `SMTP_USERNAME`, `SMTP_PASSWORD` (credentials are sent only when both are set)
/// - `SMTP_STARTTLS` (default: `true`)
/// - `SMTP_TIMEOUT_SECS` (default: `30`)
#[derive(Clone, PartialEq, Eq)]
pub struct MailConfig {
    /// SMTP server host name or IP address
    pub host: String,
    /// SMTP server port number
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Upgrade the connection with STARTTLS. Off only for local mail catchers.
    pub starttls: bool,
    /// Per-command SMTP timeout in seconds.
    pub timeout_secs: u32,
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("starttls", &self.starttls)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl MailConfig {
    /// Creates a `MailConfig` from environment variables.
    ///
    /// # Errors
    /// - When `SMTP_HOST` or `SMTP_PORT` is missing
    /// - When `SMTP_PORT` cannot be parsed as a number
    pub fn from_env() -> Result<Self> {
        let host = env::var("SMTP_HOST").context("SMTP_HOST not set")?;
        let port: u16 = env::var("SMTP_PORT")
            .context("SMTP_PORT not set")?
            .trim()
            .parse()
            .context("SMTP_PORT parse error")?;

        Ok(Self {
            host,
            port,
            username: env::var("SMTP_USERNAME").ok(),
            password: env::var("SMTP_PASSWORD").ok(),
            starttls: read_flag("SMTP_STARTTLS", true),
            timeout_secs: read_u32("SMTP_TIMEOUT_SECS", 30),
        })
    }
}

/// Which transport the application delivers through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MailAdapter {
    Smtp(MailConfig),
    /// Keep messages in process memory.
    Local,
}

impl MailAdapter {
    /// Reads `MAIL_ADAPTER` (`smtp` or `local`, default `smtp`).
    ///
    /// The SMTP settings are only read, and only required, for `smtp`.
    pub fn from_env() -> Result<Self> {
        let name = env::var("MAIL_ADAPTER").unwrap_or_else(|_| "smtp".into());

        match name.trim().to_ascii_lowercase().as_str() {
            "smtp" => Ok(Self::Smtp(MailConfig::from_env()?)),
            "local" => Ok(Self::Local),
            other => bail!("MAIL_ADAPTER must be `smtp` or `local`, got `{other}`"),
        }
    }
}
