//! # Database Configuration and Pool Factory
//!
//! Connection settings for the MySQL-backed email store
//! ([`DbEmailStore`](crate::db::email_store::DbEmailStore)) and a helper to
//! build the shared pool.
//!
//! Persistence is optional: without `DATABASE_URL` an application can keep
//! emails in [`InMemoryEmailRepository`](crate::email::repository::InMemoryEmailRepository).
//!
//! # Examples
//! ```rust,no_run
//! use wzs_mailer::config::db::{DbConfig, create_pool};
//!
//! let cfg = DbConfig::from_env();
//! if cfg.is_valid() {
//!     let pool = create_pool(&cfg).expect("failed to create pool");
//! }
//! ```

use std::{env, sync::Arc};

use anyhow::Context;
use mysql::{Opts, OptsBuilder, Pool, PoolConstraints, PoolOpts};
use tracing::info;

/// Database connection configuration.
///
/// Reads from environment variables:
/// - `DATABASE_URL`: MySQL connection URL
/// - `DATABASE_MAX_CONN`: optional maximum pool size
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DbConfig {
    pub url: Option<String>,
    pub max_connections: Option<u32>,
}

impl DbConfig {
    /// Builds a [`DbConfig`] from environment variables.
    pub fn from_env() -> Self {
        let url = env::var("DATABASE_URL").ok().filter(|s| !s.trim().is_empty());
        let max_connections = env::var("DATABASE_MAX_CONN")
            .ok()
            .and_then(|s| s.trim().parse::<u32>().ok());
        Self {
            url,
            max_connections,
        }
    }

    /// Returns `true` if `DATABASE_URL` is present.
    pub fn is_valid(&self) -> bool {
        self.url.is_some()
    }
}

/// Shared database pool type alias (`Arc<mysql::Pool>`).
pub type DbPool = Arc<Pool>;

/// Creates a new [`DbPool`] using the given configuration.
///
/// # Errors
/// Returns an error if:
/// - `DATABASE_URL` is missing
/// - the URL is invalid
/// - `DATABASE_MAX_CONN` is zero
/// - the pool cannot be created
pub fn create_pool(cfg: &DbConfig) -> anyhow::Result<DbPool> {
    let url = cfg
        .url
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is not set"))?;
    let opts = Opts::from_url(url).context("invalid DATABASE_URL")?;

    let mut builder = OptsBuilder::from_opts(opts);
    if let Some(max) = cfg.max_connections {
        let constraints = PoolConstraints::new(1, max as usize)
            .with_context(|| format!("invalid DATABASE_MAX_CONN: {max}"))?;
        builder = builder.pool_opts(PoolOpts::default().with_constraints(constraints));
    }

    let pool = Pool::new(Opts::from(builder)).context("failed to create MySQL pool")?;
    info!(
        "MySQL pool ready (max_connections={})",
        cfg.max_connections
            .map_or_else(|| "default".to_string(), |n| n.to_string())
    );
    Ok(Arc::new(pool))
}
