//! # wzs_mailer
//!
//! Stored, templated emails for form submissions.
//!
//! An [`Email`](email::entity::Email) record holds sender, subject, static
//! recipients, *recipient keys* (names looked up in the submission data at
//! send time) and either a literal body or a template. This crate provides:
//!
//! - validation of create/update input through a changeset
//!   ([`email::changeset`]), including the comma-separated list fields used
//!   by edit forms
//! - template rendering with optional *flattening* of nested data into
//!   `[key, value]` rows ([`template`])
//! - recipient resolution with a pluggable hook ([`notification::recipients`])
//! - sending through a [`Transport`](notification::transport::Transport)
//!   (SMTP via `lettre`, or in-memory) ([`notification::sender`])
//! - storage behind [`EmailRepository`](email::repository::EmailRepository),
//!   in memory or in MySQL ([`db`])
//!
//! ## Example usage (in another crate)
//!
//! ```rust
//! use std::sync::Arc;
//! use wzs_mailer::data::to_data;
//! use wzs_mailer::email::changeset::EmailParams;
//! use wzs_mailer::email::repository::{EmailRepository, InMemoryEmailRepository};
//! use wzs_mailer::notification::local::LocalTransport;
//! use wzs_mailer::notification::sender::{Mailer, SendOptions};
//! use wzs_mailer::serde_json::json;
//!
//! # wzs_mailer::tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let repo = InMemoryEmailRepository::new();
//! let params: EmailParams = serde_json::from_value(json!({
//!     "from": "noreply@example.com",
//!     "reply_to": "support@example.com",
//!     "subject": "Contact form",
//!     "to_csv": "sales@example.com",
//!     "to_keys_csv": "email",
//!     "template": {"body": "{{name}} wrote:\n{{message}}"}
//! }))
//! .unwrap();
//! let email = repo.insert(params).unwrap();
//!
//! let local = Arc::new(LocalTransport::new());
//! let mailer = Mailer::new(local.clone());
//! let data = to_data(&json!({
//!     "name": "Ana",
//!     "email": "ana@example.com",
//!     "message": "Hi there"
//! }))
//! .unwrap();
//!
//! mailer.send(email, &data, &SendOptions::default()).await.unwrap();
//! assert_eq!(local.messages()[0].to.len(), 2);
//! # });
//! ```

// ===============================
// Re-exports of external crates
// ===============================

pub use anyhow;
pub use chrono;
pub use dotenvy;
pub use handlebars;
pub use lettre;
pub use mysql;
pub use serde;
pub use serde_json;
pub use tokio;
pub use uuid;

// ===============================
// Public modules
// ===============================
pub mod config;
pub mod data;
pub mod db;
pub mod email;
pub mod error;
pub mod notification;
pub mod template;
pub mod time;
