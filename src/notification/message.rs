use lettre::message::Mailbox;
use serde::{Deserialize, Serialize};

/// A Value Object representing a fully resolved outbound message.
///
/// This is what the [`Mailer`](crate::notification::sender::Mailer) hands to
/// a [`Transport`](crate::notification::transport::Transport) once the body
/// is rendered and the recipients are known.
///
/// This type is intentionally **transport-agnostic**:
/// - It does not know about SMTP, SES, SendGrid, etc.
/// - It only describes *what* should be sent.
///
/// ### Recipients
/// - `to` is never empty when built by the mailer.
/// - `cc` / `bcc` mailboxes carry no display name.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundEmail {
    pub from: Mailbox,

    /// Reply target; the sender address when the record has none.
    pub reply_to: Mailbox,

    /// Email subject line.
    ///
    /// Note: sanitization (e.g., header injection prevention) should be done
    /// in the transport adapter layer, because it depends on the actual protocol.
    pub subject: String,

    pub body: MessageBody,

    /// Primary recipients.
    pub to: Vec<Mailbox>,

    /// Carbon copy recipients.
    pub cc: Vec<Mailbox>,

    /// Blind carbon copy recipients.
    ///
    /// Avoid logging this list in application logs.
    pub bcc: Vec<Mailbox>,
}

/// The body of an outbound message.
///
/// - `Text` -> `text/plain`
/// - `Html` -> `text/html`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    Text(String),
    Html(String),
}

impl MessageBody {
    pub fn new(format: BodyFormat, content: String) -> Self {
        match format {
            BodyFormat::Text => MessageBody::Text(content),
            BodyFormat::Html => MessageBody::Html(content),
        }
    }

    pub fn content(&self) -> &str {
        match self {
            MessageBody::Text(s) | MessageBody::Html(s) => s,
        }
    }
}

/// How the rendered body is attached. Plain text unless asked otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyFormat {
    #[default]
    Text,
    Html,
}
