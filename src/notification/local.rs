use std::sync::Mutex;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::notification::message::OutboundEmail;
use crate::notification::transport::{Receipt, Transport};

/// A [`Transport`] that keeps every delivered message in memory.
///
/// Meant for development setups and tests: nothing leaves the process, and
/// [`messages`](Self::messages) shows what would have been sent.
#[derive(Debug, Default)]
pub struct LocalTransport {
    delivered: Mutex<Vec<OutboundEmail>>,
}

impl LocalTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages delivered so far, oldest first.
    pub fn messages(&self) -> Vec<OutboundEmail> {
        self.delivered
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn clear(&self) {
        self.delivered
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn deliver(&self, message: OutboundEmail) -> Result<Receipt> {
        let id = Uuid::new_v4().to_string();
        debug!("local delivery {id}: {} recipient(s)", message.to.len());

        self.delivered
            .lock()
            .map_err(|_| anyhow!("local mailbox lock poisoned"))?
            .push(message);

        Ok(Receipt {
            id: Some(id),
            detail: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lettre::message::Mailbox;

    use crate::notification::message::MessageBody;

    fn message(subject: &str) -> OutboundEmail {
        let mb = |a: &str| a.parse::<Mailbox>().unwrap();
        OutboundEmail {
            from: mb("from@example.com"),
            reply_to: mb("from@example.com"),
            subject: subject.into(),
            body: MessageBody::Text("Body".into()),
            to: vec![mb("to@example.com")],
            cc: vec![],
            bcc: vec![],
        }
    }

    #[tokio::test]
    async fn keeps_messages_in_delivery_order() {
        let local = LocalTransport::new();

        let first = local.deliver(message("first")).await.unwrap();
        let second = local.deliver(message("second")).await.unwrap();

        assert_ne!(first.id, second.id);
        let subjects: Vec<_> = local.messages().into_iter().map(|m| m.subject).collect();
        assert_eq!(subjects, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn clear_empties_the_mailbox() {
        let local = LocalTransport::new();
        local.deliver(message("gone")).await.unwrap();

        local.clear();
        assert!(local.messages().is_empty());
    }
}
