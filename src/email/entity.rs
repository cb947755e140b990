use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A reusable, validated email definition.
///
/// An `Email` describes *how* to build a message from submission data:
/// static recipients, lookup keys for dynamic recipients, a subject, and
/// either a literal body or a template.
///
/// Values are built through the changeset pipeline
/// ([`Email::create`] / [`Email::update`]); constructing one by hand skips
/// validation and is meant for tests and storage adapters.
///
/// The serialized form is the persisted representation: the comma-separated
/// form fields (`to_csv` and friends) are not part of it.
///
/// ### Recipients
/// - `to`, `cc`, `bcc` hold addresses.
/// - `to_keys` holds *names of data fields* whose values are added to `to`
///   at send time; they are not addresses themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub id: Uuid,

    pub from: String,

    /// Reply address. Falls back to `from` when sending.
    pub reply_to: Option<String>,

    pub to: Vec<String>,

    /// Data keys looked up at send time for extra `to` addresses.
    pub to_keys: Vec<String>,

    pub cc: Vec<String>,

    /// Blind carbon copy recipients.
    ///
    /// Avoid logging this list in application logs.
    pub bcc: Vec<String>,

    pub subject: String,

    /// When `true`, the message body is rendered from [`Email::template`].
    pub use_template: bool,

    /// Literal message body; only set when `use_template` is `false`.
    pub body: Option<String>,

    pub template: Option<EmailTemplate>,

    pub inserted_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

/// Template text embedded in, and owned by, an [`Email`].
///
/// Replaced as a whole on update, never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailTemplate {
    pub body: String,
}

impl EmailTemplate {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

impl Email {
    /// The address replies should go to: `reply_to`, or `from` when unset.
    pub fn reply_to_or_from(&self) -> &str {
        self.reply_to.as_deref().unwrap_or(&self.from)
    }
}
