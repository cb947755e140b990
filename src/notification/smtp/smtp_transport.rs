use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::{Message, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tracing::info;

use crate::config::mail::MailConfig;
use crate::notification::message::{MessageBody, OutboundEmail};
use crate::notification::transport::{Receipt, Transport};

/// SMTP-based implementation of [`Transport`].
///
/// ## Responsibilities
///
/// - Builds a MIME message from an [`OutboundEmail`]
/// - Sends it through an SMTP relay, with STARTTLS unless disabled
///
/// ## What this type does *not* do
///
/// - Render templates or resolve recipients
/// - Retry failed deliveries
/// - Load configuration from environment variables
///
/// Those concerns belong to higher layers.
#[derive(Clone, Debug)]
pub struct SmtpTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    /// Constructs a new `SmtpTransport` from [`MailConfig`].
    ///
    /// With `starttls` off, the connection is unencrypted; only use that for
    /// local mail catchers.
    pub fn new(cfg: &MailConfig) -> Result<Self> {
        info!(
            "SMTP init: host={} port={} user={} starttls={}",
            cfg.host,
            cfg.port,
            cfg.username.as_deref().unwrap_or("-"),
            cfg.starttls
        );

        let mut builder = if cfg.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host)
                .with_context(|| format!("invalid relay host: {}", cfg.host))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&cfg.host)
        };

        if let (Some(username), Some(password)) = (&cfg.username, &cfg.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        let mailer = builder
            .port(cfg.port)
            .timeout(Some(Duration::from_secs(cfg.timeout_secs.into())))
            .build();

        Ok(Self { mailer })
    }

    /// Builds a `lettre::Message` from an [`OutboundEmail`].
    ///
    /// This method contains all MIME construction logic and is kept
    /// separate to allow unit testing without performing SMTP I/O.
    fn build_message(message: OutboundEmail) -> Result<Message> {
        // Sanitize subject to prevent header injection
        let mut subject = message.subject;
        subject.retain(|c| c != '\r' && c != '\n');

        let mut builder = Message::builder()
            .from(message.from)
            .reply_to(message.reply_to)
            .subject(subject);

        for to in message.to {
            builder = builder.to(to);
        }
        for cc in message.cc {
            builder = builder.cc(cc);
        }
        for bcc in message.bcc {
            builder = builder.bcc(bcc);
        }

        let part = match message.body {
            MessageBody::Text(text) => SinglePart::plain(text),
            MessageBody::Html(html) => SinglePart::html(html),
        };

        builder.singlepart(part).context("failed to build MIME message")
    }
}

#[async_trait]
impl Transport for SmtpTransport {
    async fn deliver(&self, message: OutboundEmail) -> Result<Receipt> {
        let message = Self::build_message(message)?;
        let response = self
            .mailer
            .send(message)
            .await
            .context("SMTP send failed")?;

        Ok(Receipt {
            id: None,
            detail: Some(format!(
                "{} {}",
                response.code(),
                response.message().collect::<Vec<_>>().join(" ")
            )),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lettre::message::Mailbox;

    fn mb(addr: &str) -> Mailbox {
        addr.parse::<Mailbox>().expect("valid mailbox")
    }

    fn outbound(body: MessageBody) -> OutboundEmail {
        OutboundEmail {
            from: mb("from@example.com"),
            reply_to: mb("replies@example.com"),
            subject: "Test".into(),
            body,
            to: vec![mb("to@example.com"), mb("other@example.com")],
            cc: vec![mb("cc@example.com")],
            bcc: vec![],
        }
    }

    fn raw(message: Message) -> String {
        String::from_utf8_lossy(&message.formatted()).into_owned()
    }

    #[test]
    fn new_accepts_plain_and_starttls_configs() {
        let mut cfg = MailConfig {
            host: "smtp.example.com".into(),
            port: 587,
            username: Some("user".into()),
            password: Some("pass".into()),
            starttls: true,
            timeout_secs: 30,
        };
        assert!(SmtpTransport::new(&cfg).is_ok());

        cfg.starttls = false;
        cfg.username = None;
        cfg.password = None;
        assert!(SmtpTransport::new(&cfg).is_ok());
    }

    #[test]
    fn builds_headers_for_every_recipient_kind() {
        let msg = SmtpTransport::build_message(outbound(MessageBody::Text("Body".into())))
            .expect("message build");
        let raw = raw(msg);

        assert!(raw.contains("Subject: Test"));
        assert!(raw.contains("Reply-To: replies@example.com"));
        assert!(raw.contains("to@example.com"));
        assert!(raw.contains("other@example.com"));
        assert!(raw.contains("Cc: cc@example.com"));
        assert!(raw.contains("Content-Type: text/plain"));
    }

    #[test]
    fn builds_html_part() {
        let msg = SmtpTransport::build_message(outbound(MessageBody::Html("<p>html</p>".into())))
            .unwrap();
        let raw = raw(msg);

        assert!(raw.contains("Content-Type: text/html"));
        assert!(raw.contains("<p>html</p>"));
    }

    #[test]
    fn strips_line_breaks_from_subject() {
        let mut email = outbound(MessageBody::Text("Body".into()));
        email.subject = "Hello\r\nBcc: evil@example.com".into();

        let raw = raw(SmtpTransport::build_message(email).unwrap());
        assert!(raw.contains("Subject: HelloBcc: evil@example.com"));
        assert!(!raw.contains("\r\nBcc: evil@example.com"));
    }
}
