//! # SQL Email Store
//!
//! [`EmailRepository`] over the [`Db`] port. One row per email; the
//! address lists are stored as JSON arrays in text columns and the id as
//! `BINARY(16)`. The embedded template lives in `template_body` (`NULL` when
//! the email has none).
//!
//! ```sql
//! CREATE TABLE emails (
//!   id            BINARY(16)   NOT NULL PRIMARY KEY,
//!   from_address  VARCHAR(160) NOT NULL,
//!   reply_to      VARCHAR(160) NULL,
//!   to_list       TEXT         NOT NULL,
//!   to_keys       TEXT         NOT NULL,
//!   cc_list       TEXT         NOT NULL,
//!   bcc_list      TEXT         NOT NULL,
//!   subject       VARCHAR(255) NOT NULL,
//!   use_template  TINYINT(1)   NOT NULL,
//!   body          TEXT         NULL,
//!   template_body TEXT         NULL,
//!   inserted_at   DATETIME     NULL,
//!   updated_at    DATETIME     NULL
//! );
//! ```

use anyhow::{Context, Result};
use tracing::debug;
use uuid::Uuid;

use crate::db::port::{Db, Row};
use crate::email::changeset::EmailParams;
use crate::email::entity::{Email, EmailTemplate};
use crate::email::repository::{ENTITY, EmailRepository, RepositoryError};
use crate::error::entity::NotFoundError;
use crate::params;
use crate::time::clock::Clock;
use crate::time::system_clock::SystemClock;

const COLUMNS: &str = "id, from_address, reply_to, to_list, to_keys, cc_list, bcc_list, \
     subject, use_template, body, template_body, inserted_at, updated_at";

const INSERT_SQL: &str = "INSERT INTO emails (id, from_address, reply_to, to_list, to_keys, \
     cc_list, bcc_list, subject, use_template, body, template_body, inserted_at, updated_at) \
     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

const UPDATE_SQL: &str = "UPDATE emails SET from_address = ?, reply_to = ?, to_list = ?, \
     to_keys = ?, cc_list = ?, bcc_list = ?, subject = ?, use_template = ?, body = ?, \
     template_body = ?, updated_at = ? WHERE id = ?";

/// Emails stored in a SQL database.
pub struct DbEmailStore<D: Db> {
    db: D,
    clock: Box<dyn Clock>,
}

impl<D: Db> DbEmailStore<D> {
    pub fn new(db: D) -> Self {
        Self::with_clock(db, Box::new(SystemClock))
    }

    pub fn with_clock(db: D, clock: Box<dyn Clock>) -> Self {
        Self { db, clock }
    }
}

fn encode_list(list: &[String]) -> Result<String> {
    serde_json::to_string(list).context("failed to encode address list")
}

fn decode_list(row: &Row, key: &str) -> Result<Vec<String>> {
    let raw = row.get_string(key)?;
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&raw).with_context(|| format!("column `{key}` is not a JSON list"))
}

fn email_from_row(row: &Row) -> Result<Email> {
    Ok(Email {
        id: row.get_uuid("id")?,
        from: row.get_string("from_address")?,
        reply_to: row.get_string_opt("reply_to")?,
        to: decode_list(row, "to_list")?,
        to_keys: decode_list(row, "to_keys")?,
        cc: decode_list(row, "cc_list")?,
        bcc: decode_list(row, "bcc_list")?,
        subject: row.get_string("subject")?,
        use_template: row.get_bool("use_template")?,
        body: row.get_string_opt("body")?,
        template: row.get_string_opt("template_body")?.map(EmailTemplate::new),
        inserted_at: row.get_datetime_opt("inserted_at")?,
        updated_at: row.get_datetime_opt("updated_at")?,
    })
}

/// Encoded list columns, in `to, to_keys, cc, bcc` order.
struct Lists([String; 4]);

impl Lists {
    fn of(email: &Email) -> Result<Self> {
        Ok(Self([
            encode_list(&email.to)?,
            encode_list(&email.to_keys)?,
            encode_list(&email.cc)?,
            encode_list(&email.bcc)?,
        ]))
    }
}

impl<D: Db> EmailRepository for DbEmailStore<D> {
    fn insert(&self, params: EmailParams) -> Result<Email, RepositoryError> {
        let mut email = Email::create(params)?;
        let now = self.clock.now();
        email.inserted_at = Some(now);
        email.updated_at = Some(now);

        let Lists([to, to_keys, cc, bcc]) = Lists::of(&email)?;
        self.db
            .exec(
                INSERT_SQL,
                &params![
                    &email.id,
                    email.from.as_str(),
                    email.reply_to.as_deref(),
                    &to,
                    &to_keys,
                    &cc,
                    &bcc,
                    email.subject.as_str(),
                    email.use_template,
                    email.body.as_deref(),
                    email.template.as_ref().map(|t| t.body.as_str()),
                    email.inserted_at,
                    email.updated_at,
                ],
            )
            .context("failed to insert email")?;

        debug!("email {} inserted", email.id);
        Ok(email)
    }

    fn get(&self, id: Uuid) -> Result<Email, RepositoryError> {
        let sql = format!("SELECT {COLUMNS} FROM emails WHERE id = ?");
        let row = self
            .db
            .fetch_one(&sql, &params![&id])
            .context("failed to load email")?
            .ok_or_else(|| NotFoundError::new(ENTITY, id))?;

        Ok(email_from_row(&row).with_context(|| format!("email {id} has a malformed row"))?)
    }

    fn update(&self, email: &Email, params: EmailParams) -> Result<Email, RepositoryError> {
        let stored = self.get(email.id)?;

        let mut updated = stored.update(params)?;
        updated.updated_at = Some(self.clock.now());

        let Lists([to, to_keys, cc, bcc]) = Lists::of(&updated)?;
        self.db
            .exec(
                UPDATE_SQL,
                &params![
                    updated.from.as_str(),
                    updated.reply_to.as_deref(),
                    &to,
                    &to_keys,
                    &cc,
                    &bcc,
                    updated.subject.as_str(),
                    updated.use_template,
                    updated.body.as_deref(),
                    updated.template.as_ref().map(|t| t.body.as_str()),
                    updated.updated_at,
                    &updated.id,
                ],
            )
            .context("failed to update email")?;

        debug!("email {} updated", updated.id);
        Ok(updated)
    }
}
