use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::config::mail::MailAdapter;
use crate::notification::local::LocalTransport;
use crate::notification::message::OutboundEmail;
use crate::notification::smtp::smtp_transport::SmtpTransport;

/// What a transport reports back after accepting a message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Receipt {
    /// Identifier assigned by the transport, if it has one.
    pub id: Option<String>,
    /// Free-form server response (e.g. the SMTP reply text).
    pub detail: Option<String>,
}

/// Port trait for delivering outbound messages.
///
/// Implementations may deliver via:
///
/// - SMTP ([`SmtpTransport`])
/// - process memory, for development / testing ([`LocalTransport`])
/// - external services (SES, SendGrid, etc.)
///
/// The trait does **not**:
/// - validate recipients or render templates
/// - retry; a failure is reported to the caller, who owns any retry policy
///
/// Implementations must be `Send + Sync` so a single transport can be shared
/// via `Arc` across tasks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Hands a single message off for delivery.
    ///
    /// `Ok` means the transport accepted the message; `Err` carries the
    /// transport's reason.
    async fn deliver(&self, message: OutboundEmail) -> Result<Receipt>;
}

/// Builds the transport selected by configuration.
pub fn build_transport(adapter: &MailAdapter) -> Result<Arc<dyn Transport>> {
    match adapter {
        MailAdapter::Smtp(cfg) => Ok(Arc::new(SmtpTransport::new(cfg)?)),
        MailAdapter::Local => {
            info!("mail adapter: local (messages are kept in memory)");
            Ok(Arc::new(LocalTransport::default()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lettre::message::Mailbox;

    use crate::config::mail::MailConfig;
    use crate::notification::message::MessageBody;

    fn mb(addr: &str) -> Mailbox {
        addr.parse::<Mailbox>().expect("valid mailbox")
    }

    fn message() -> OutboundEmail {
        OutboundEmail {
            from: mb("from@example.com"),
            reply_to: mb("from@example.com"),
            subject: "Shared".to_string(),
            body: MessageBody::Text("Body".to_string()),
            to: vec![mb("to@example.com")],
            cc: vec![],
            bcc: vec![],
        }
    }

    #[tokio::test]
    async fn transport_can_be_shared_across_tasks() {
        let transport: Arc<dyn Transport> = build_transport(&MailAdapter::Local).unwrap();
        let other = transport.clone();

        let handle = tokio::spawn(async move { other.deliver(message()).await });

        transport.deliver(message()).await.expect("deliver");
        handle.await.unwrap().expect("deliver from task");
    }

    #[test]
    fn smtp_adapter_is_built_from_config() {
        let cfg = MailConfig {
            host: "smtp.example.com".into(),
            port: 587,
            username: Some("user".into()),
            password: Some("pass".into()),
            starttls: true,
            timeout_secs: 10,
        };

        assert!(build_transport(&MailAdapter::Smtp(cfg)).is_ok());
    }

    #[tokio::test]
    async fn mocked_transport_reports_failures() {
        let mut mock = MockTransport::new();
        mock.expect_deliver()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("451 try again later")));

        let err = mock.deliver(message()).await.unwrap_err();
        assert_eq!(err.to_string(), "451 try again later");
    }
}
