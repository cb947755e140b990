//! # Email Changesets
//!
//! Builds and validates [`Email`] values from raw form attributes.
//!
//! A [`Changeset`] wraps a base record (empty for inserts, the stored record
//! for updates), the submitted [`EmailParams`], and the errors collected so
//! far. Each rule is a function taking `&mut Changeset`; rules never stop the
//! pipeline, so every independent problem is reported at once. Two stages
//! only act while the changeset is still clean:
//!
//! - writing a decoded `*_csv` value back into its list field, so a list is
//!   never overwritten while anything in the submission is invalid;
//! - the "who receives this" check on `to` / `to_keys`.
//!
//! The comma-separated fields exist only on [`EmailParams`]: the lists on
//! [`Email`] are the source of truth and [`change`] recomputes the strings for
//! editing.
//!
//! # Example
//! ```rust
//! use wzs_mailer::email::changeset::EmailParams;
//! use wzs_mailer::email::entity::Email;
//!
//! let params: EmailParams = serde_json::from_value(serde_json::json!({
//!     "from": "noreply@example.com",
//!     "reply_to": "support@example.com",
//!     "subject": "Thanks for writing",
//!     "to_keys_csv": "email",
//!     "template": {"body": "Hi {{name}}"},
//!     "unknown": "ignored"
//! }))
//! .unwrap();
//!
//! let email = Email::create(params).unwrap();
//! assert!(email.use_template);
//! assert_eq!(email.to_keys, vec!["email"]);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::email::address;
use crate::email::csv;
use crate::email::entity::{Email, EmailTemplate};
use crate::error::validation::ValidationErrors;
use crate::template::renderer;

pub const MIN_SUBJECT_LEN: usize = 5;

const BLANK: &str = "can't be blank";
const NO_RECIPIENTS: &str = "must have at least one recipient or recipient key";

/// Raw, form-shaped attributes for creating or updating an [`Email`].
///
/// Only the fields below are read; unknown keys are ignored when
/// deserializing. Strings that are empty after trimming count as "cleared".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailParams {
    pub from: Option<String>,
    pub reply_to: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    /// Informational on input; the pipeline derives it from `body`.
    pub use_template: Option<bool>,
    pub to_csv: Option<String>,
    pub to_keys_csv: Option<String>,
    pub cc_csv: Option<String>,
    pub bcc_csv: Option<String>,
    pub template: Option<TemplateParams>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateParams {
    pub body: Option<String>,
}

/// One of the comma-separated form fields and the list it mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CsvField {
    To,
    ToKeys,
    Cc,
    Bcc,
}

impl CsvField {
    /// Reconciliation order.
    pub const ALL: [CsvField; 4] = [CsvField::To, CsvField::ToKeys, CsvField::Cc, CsvField::Bcc];

    /// Name of the form field errors attach to.
    pub fn name(self) -> &'static str {
        match self {
            CsvField::To => "to_csv",
            CsvField::ToKeys => "to_keys_csv",
            CsvField::Cc => "cc_csv",
            CsvField::Bcc => "bcc_csv",
        }
    }

    /// `to_keys` holds data field names, not addresses.
    fn holds_addresses(self) -> bool {
        !matches!(self, CsvField::ToKeys)
    }

    fn list(self, email: &Email) -> &[String] {
        match self {
            CsvField::To => &email.to,
            CsvField::ToKeys => &email.to_keys,
            CsvField::Cc => &email.cc,
            CsvField::Bcc => &email.bcc,
        }
    }

    fn list_mut(self, email: &mut Email) -> &mut Vec<String> {
        match self {
            CsvField::To => &mut email.to,
            CsvField::ToKeys => &mut email.to_keys,
            CsvField::Cc => &mut email.cc,
            CsvField::Bcc => &mut email.bcc,
        }
    }

    fn param(self, params: &EmailParams) -> Option<&str> {
        match self {
            CsvField::To => params.to_csv.as_deref(),
            CsvField::ToKeys => params.to_keys_csv.as_deref(),
            CsvField::Cc => params.cc_csv.as_deref(),
            CsvField::Bcc => params.bcc_csv.as_deref(),
        }
    }

    fn param_mut(self, params: &mut EmailParams) -> &mut Option<String> {
        match self {
            CsvField::To => &mut params.to_csv,
            CsvField::ToKeys => &mut params.to_keys_csv,
            CsvField::Cc => &mut params.cc_csv,
            CsvField::Bcc => &mut params.bcc_csv,
        }
    }
}

/// Validation context for one candidate [`Email`].
#[derive(Debug, Clone)]
pub struct Changeset {
    email: Email,
    params: EmailParams,
    errors: ValidationErrors,
}

impl Changeset {
    /// Casts `params` onto `base`.
    ///
    /// Scalar fields are applied immediately; list fields are only written by
    /// the reconciliation stage of [`validate`](Self::validate). A supplied
    /// template replaces the base template as a whole.
    pub fn new(base: Email, params: EmailParams) -> Self {
        let mut email = base;

        if let Some(from) = &params.from {
            email.from = present(from).unwrap_or_default();
        }
        if let Some(reply_to) = &params.reply_to {
            email.reply_to = present(reply_to);
        }
        if let Some(subject) = &params.subject {
            email.subject = present(subject).unwrap_or_default();
        }
        if let Some(body) = &params.body {
            email.body = present(body);
        }
        if let Some(template) = &params.template {
            email.template = Some(EmailTemplate::new(
                template.body.clone().unwrap_or_default(),
            ));
        }

        Self {
            email,
            params,
            errors: ValidationErrors::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// The record as it stands after casting and the rules run so far.
    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(field, message);
    }

    /// Runs every rule, in order.
    pub fn validate(mut self) -> Self {
        let from = self.params.from.clone();
        validate_address_field(&mut self, "from", from.as_deref());
        let reply_to = self.params.reply_to.clone();
        validate_address_field(&mut self, "reply_to", reply_to.as_deref());
        for field in CsvField::ALL {
            reconcile_csv(&mut self, field);
        }
        validate_content(&mut self);
        validate_required(&mut self);
        validate_recipients(&mut self);
        validate_subject_length(&mut self);
        self
    }

    /// Returns the validated record, or every error collected.
    pub fn apply(self) -> Result<Email, ValidationErrors> {
        if self.is_valid() {
            Ok(self.email)
        } else {
            debug!(
                "email {} rejected with {} error(s)",
                self.email.id,
                self.errors.len()
            );
            Err(self.errors)
        }
    }
}

impl Email {
    /// Validates `params` as a new record with a freshly generated id.
    pub fn create(params: EmailParams) -> Result<Email, ValidationErrors> {
        let base = Email {
            id: Uuid::now_v7(),
            ..Email::default()
        };
        Changeset::new(base, params).validate().apply()
    }

    /// Validates `params` applied on top of this record.
    pub fn update(&self, params: EmailParams) -> Result<Email, ValidationErrors> {
        Changeset::new(self.clone(), params).validate().apply()
    }
}

/// Prepares a stored record for editing.
///
/// Copies the scalar fields into [`EmailParams`] and fills the `*_csv` fields
/// by joining their lists. `only` restricts which `*_csv` fields are filled;
/// `None` fills all four.
pub fn change(email: &Email, only: Option<&[CsvField]>) -> EmailParams {
    let mut params = EmailParams {
        from: Some(email.from.clone()),
        reply_to: email.reply_to.clone(),
        subject: Some(email.subject.clone()),
        body: email.body.clone(),
        use_template: Some(email.use_template),
        template: email.template.as_ref().map(|t| TemplateParams {
            body: Some(t.body.clone()),
        }),
        ..EmailParams::default()
    };

    for field in CsvField::ALL {
        if only.is_none_or(|allowed| allowed.contains(&field)) {
            *field.param_mut(&mut params) = Some(csv::to_csv(field.list(email)));
        }
    }

    params
}

fn present(value: &str) -> Option<String> {
    (!value.trim().is_empty()).then(|| value.to_string())
}

fn validate_address_field(cs: &mut Changeset, field: &'static str, value: Option<&str>) {
    let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
        return;
    };

    if let Err(e) = address::validate(value) {
        cs.add_error(field, e.to_string());
    }
}

fn reconcile_csv(cs: &mut Changeset, field: CsvField) {
    let Some(raw) = field.param(&cs.params).map(str::to_owned) else {
        return;
    };
    let list = csv::to_list(Some(&raw));

    if field.holds_addresses() {
        for entry in &list {
            if let Err(e) = address::validate(entry) {
                cs.add_error(field.name(), format!("{entry} {e}"));
            }
        }
    }

    // Skipped for any earlier error, not only this field's.
    if cs.is_valid() {
        *field.list_mut(&mut cs.email) = list;
    }
}

fn validate_content(cs: &mut Changeset) {
    if cs.email.body.is_none() {
        if cs.email.template.is_none() {
            cs.add_error("template", BLANK);
        } else {
            validate_template(cs);
        }
        cs.email.use_template = true;
    } else {
        if cs.params.template.is_some() {
            validate_template(cs);
        }
        cs.email.use_template = false;
    }
}

fn validate_template(cs: &mut Changeset) {
    let Some(body) = cs.email.template.as_ref().map(|t| t.body.clone()) else {
        return;
    };

    if body.trim().is_empty() {
        cs.add_error("template.body", BLANK);
    } else if let Err(e) = renderer::check(&body) {
        cs.add_error("template.body", e.to_string());
    }
}

fn validate_required(cs: &mut Changeset) {
    if cs.email.from.trim().is_empty() {
        cs.add_error("from", BLANK);
    }
    if cs.email.reply_to.is_none() {
        cs.add_error("reply_to", BLANK);
    }
    if cs.email.subject.trim().is_empty() {
        cs.add_error("subject", BLANK);
    }
}

fn validate_recipients(cs: &mut Changeset) {
    if !cs.is_valid() {
        return;
    }
    if cs.email.to.is_empty() && cs.email.to_keys.is_empty() {
        cs.add_error("to", NO_RECIPIENTS);
    }
}

fn validate_subject_length(cs: &mut Changeset) {
    let subject = &cs.email.subject;
    if !subject.trim().is_empty() && subject.chars().count() < MIN_SUBJECT_LEN {
        cs.add_error(
            "subject",
            format!("should be at least {MIN_SUBJECT_LEN} character(s)"),
        );
    }
}
