//! # Email Persistence Port
//!
//! [`EmailRepository`] is the boundary between the changeset pipeline and
//! storage. Every write goes through [`Email::create`] or [`Email::update`],
//! so a repository never stores a record that failed validation.
//!
//! Implementations in this crate:
//! - [`InMemoryEmailRepository`]: a `RwLock<HashMap>`, for tests and demos
//! - [`DbEmailStore`](crate::db::email_store::DbEmailStore): SQL over the
//!   [`Db`](crate::db::port::Db) port
//!
//! # Example
//! ```rust
//! use wzs_mailer::email::changeset::EmailParams;
//! use wzs_mailer::email::repository::{EmailRepository, InMemoryEmailRepository};
//!
//! let repo = InMemoryEmailRepository::new();
//! let params: EmailParams = serde_json::from_value(serde_json::json!({
//!     "from": "noreply@example.com",
//!     "reply_to": "noreply@example.com",
//!     "subject": "Newsletter",
//!     "to_csv": "list@example.com",
//!     "body": "Hello"
//! }))
//! .unwrap();
//!
//! let email = repo.insert(params).unwrap();
//! assert_eq!(repo.get(email.id).unwrap(), email);
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::anyhow;
use thiserror::Error;
use uuid::Uuid;

use crate::email::changeset::EmailParams;
use crate::email::entity::Email;
use crate::error::entity::NotFoundError;
use crate::error::validation::ValidationErrors;
use crate::time::clock::Clock;
use crate::time::system_clock::SystemClock;

pub(crate) const ENTITY: &str = "Email";

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error("storage failure: {0:#}")]
    Storage(#[from] anyhow::Error),
}

/// Storage for [`Email`] records (synchronous).
pub trait EmailRepository: Send + Sync {
    /// Validates `params` as a new record and stores it.
    fn insert(&self, params: EmailParams) -> Result<Email, RepositoryError>;

    fn get(&self, id: Uuid) -> Result<Email, RepositoryError>;

    /// Validates `params` on top of the stored record with `email.id` and
    /// stores the result.
    ///
    /// Only `email.id` is read from `email`; fields changed in storage since
    /// the caller loaded it are kept unless `params` overrides them. Fails
    /// with [`RepositoryError::NotFound`] if no record has that id.
    fn update(&self, email: &Email, params: EmailParams) -> Result<Email, RepositoryError>;
}

/// [`EmailRepository`] kept in process memory.
pub struct InMemoryEmailRepository {
    records: RwLock<HashMap<Uuid, Email>>,
    clock: Box<dyn Clock>,
}

impl Default for InMemoryEmailRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryEmailRepository {
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock))
    }

    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EmailRepository for InMemoryEmailRepository {
    fn insert(&self, params: EmailParams) -> Result<Email, RepositoryError> {
        let mut email = Email::create(params)?;
        let now = self.clock.now();
        email.inserted_at = Some(now);
        email.updated_at = Some(now);

        self.records
            .write()
            .map_err(|_| anyhow!("email store lock poisoned"))?
            .insert(email.id, email.clone());
        Ok(email)
    }

    fn get(&self, id: Uuid) -> Result<Email, RepositoryError> {
        self.records
            .read()
            .map_err(|_| anyhow!("email store lock poisoned"))?
            .get(&id)
            .cloned()
            .ok_or_else(|| NotFoundError::new(ENTITY, id).into())
    }

    fn update(&self, email: &Email, params: EmailParams) -> Result<Email, RepositoryError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| anyhow!("email store lock poisoned"))?;
        let stored = records
            .get(&email.id)
            .ok_or_else(|| NotFoundError::new(ENTITY, email.id))?;

        let mut updated = stored.update(params)?;
        updated.updated_at = Some(self.clock.now());
        records.insert(updated.id, updated.clone());
        Ok(updated)
    }
}
