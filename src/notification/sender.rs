//! # Sending Emails
//!
//! [`Mailer`] turns a stored [`Email`] plus submission data into an
//! [`OutboundEmail`] and hands it to a [`Transport`]:
//!
//! 1. render the template (or take the literal body),
//! 2. resolve recipients,
//! 3. stop with [`SendError::NoRecipients`] if there are none,
//! 4. build the message and deliver it.
//!
//! Delivery is fire-and-forget: nothing is queued or retried here.
//!
//! # Example
//! ```rust
//! use std::sync::Arc;
//! use serde_json::json;
//! use wzs_mailer::data::to_data;
//! use wzs_mailer::email::entity::{Email, EmailTemplate};
//! use wzs_mailer::notification::local::LocalTransport;
//! use wzs_mailer::notification::sender::{Mailer, SendOptions};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let local = Arc::new(LocalTransport::new());
//! let mailer = Mailer::new(local.clone());
//!
//! let email = Email {
//!     from: "noreply@example.com".into(),
//!     subject: "Welcome".into(),
//!     use_template: true,
//!     template: Some(EmailTemplate::new("Hello {{ name }}")),
//!     to_keys: vec!["email".into()],
//!     ..Email::default()
//! };
//! let data = to_data(&json!({"name": "Ana", "email": "ana@example.com"})).unwrap();
//!
//! mailer.send(email, &data, &SendOptions::default()).await.unwrap();
//! assert_eq!(local.messages()[0].body.content(), "Hello Ana");
//! # });
//! ```

use std::sync::Arc;

use lettre::Address;
use lettre::message::Mailbox;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};

use crate::data::Data;
use crate::email::entity::Email;
use crate::error::send::SendError;
use crate::notification::message::{BodyFormat, MessageBody, OutboundEmail};
use crate::notification::recipients::{RecipientResolver, resolve_to};
use crate::notification::transport::Transport;
use crate::template::renderer::{FlattenKey, TemplateRenderer};

/// Per-send options.
///
/// Deserializes from e.g. `{"flatten": "attrs", "body": "html"}`; `flatten`
/// takes a single key or a list of keys and `[from, to]` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SendOptions {
    /// Data keys exposed to the template as `[key, value]` rows.
    #[serde(deserialize_with = "one_or_many")]
    pub flatten: Vec<FlattenKey>,
    /// How the body is attached. Defaults to plain text.
    pub body: BodyFormat,
}

impl SendOptions {
    pub fn flatten(mut self, key: impl Into<FlattenKey>) -> Self {
        self.flatten.push(key.into());
        self
    }

    pub fn html(mut self) -> Self {
        self.body = BodyFormat::Html;
        self
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<FlattenKey>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<FlattenKey>),
        One(FlattenKey),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(keys) => keys,
        OneOrMany::One(key) => vec![key],
    })
}

/// Renders, addresses and delivers [`Email`] records.
///
/// Holds no per-send state; share one instance (e.g. behind `Arc`) for
/// concurrent sends.
pub struct Mailer {
    transport: Arc<dyn Transport>,
    renderer: TemplateRenderer,
    resolver: Option<Arc<dyn RecipientResolver>>,
}

impl Mailer {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            renderer: TemplateRenderer::new(),
            resolver: None,
        }
    }

    /// Replaces the default recipient resolution with `resolver`.
    pub fn with_resolver(mut self, resolver: impl RecipientResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    pub fn with_renderer(mut self, renderer: TemplateRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Renders the body, resolves recipients and builds the message,
    /// without delivering it.
    pub fn build_message(
        &self,
        email: &Email,
        data: &Data,
        options: &SendOptions,
    ) -> Result<OutboundEmail, SendError> {
        let content = if email.use_template {
            let template = email
                .template
                .as_ref()
                .ok_or(SendError::MissingTemplate(email.id))?;
            self.renderer.render(&template.body, data, &options.flatten)?
        } else {
            email.body.clone().unwrap_or_default()
        };

        let to = resolve_to(email, data, self.resolver.as_deref());
        if to.is_empty() {
            return Err(SendError::NoRecipients);
        }

        Ok(OutboundEmail {
            from: mailbox(&email.from)?,
            reply_to: mailbox(email.reply_to_or_from())?,
            subject: email.subject.clone(),
            body: MessageBody::new(options.body, content),
            to: mailboxes(&to)?,
            cc: mailboxes(&email.cc)?,
            bcc: mailboxes(&email.bcc)?,
        })
    }

    /// Sends `email` with `data` merged in.
    ///
    /// Returns the same `email` once the transport accepted the message.
    pub async fn send(
        &self,
        email: Email,
        data: &Data,
        options: &SendOptions,
    ) -> Result<Email, SendError> {
        let message = self.build_message(&email, data, options)?;
        let recipients = message.to.len();

        match self.transport.deliver(message).await {
            Ok(receipt) => {
                info!(
                    "email {} delivered to {recipients} recipient(s) id={}",
                    email.id,
                    receipt.id.as_deref().unwrap_or("-")
                );
                Ok(email)
            }
            Err(e) => {
                warn!("email {} delivery failed: {e:#}", email.id);
                Err(SendError::Transport(e))
            }
        }
    }
}

fn mailbox(address: &str) -> Result<Mailbox, SendError> {
    address
        .trim()
        .parse::<Address>()
        .map(|addr| Mailbox::new(None, addr))
        .map_err(|e| SendError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

fn mailboxes(addresses: &[String]) -> Result<Vec<Mailbox>, SendError> {
    addresses.iter().map(|a| mailbox(a)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::email::entity::EmailTemplate;
    use crate::notification::local::LocalTransport;
    use crate::notification::transport::{MockTransport, Receipt};

    fn data(value: serde_json::Value) -> Data {
        value.as_object().cloned().unwrap()
    }

    fn templated() -> Email {
        Email {
            from: "noreply@example.com".into(),
            reply_to: None,
            to: vec!["team@example.com".into()],
            to_keys: vec!["email".into()],
            cc: vec!["cc@example.com".into()],
            bcc: vec!["audit@example.com".into()],
            subject: "New signup".into(),
            use_template: true,
            template: Some(EmailTemplate::new(
                "Hello {{ name }}\n{{#each attrs}}{{this.[0]}}={{this.[1]}}\n{{/each}}",
            )),
            ..Email::default()
        }
    }

    fn literal() -> Email {
        Email {
            use_template: false,
            body: Some("  <p>Static</p>  ".into()),
            template: None,
            ..templated()
        }
    }

    #[tokio::test]
    async fn renders_resolves_and_delivers() {
        let local = Arc::new(LocalTransport::new());
        let mailer = Mailer::new(local.clone());
        let email = templated();

        let sent = mailer
            .send(
                email.clone(),
                &data(json!({
                    "name": "Ana",
                    "email": "ana@example.com",
                    "attrs": {"plan": "pro"}
                })),
                &SendOptions::default().flatten("attrs"),
            )
            .await
            .unwrap();
        assert_eq!(sent, email);

        let messages = local.messages();
        assert_eq!(messages.len(), 1);
        let m = &messages[0];
        assert_eq!(m.body, MessageBody::Text("Hello Ana\nplan=pro".into()));
        let to: Vec<String> = m.to.iter().map(|mb| mb.email.to_string()).collect();
        assert_eq!(to, vec!["team@example.com", "ana@example.com"]);
        assert_eq!(m.reply_to.email.to_string(), "noreply@example.com");
        assert_eq!(m.cc[0].name, None);
        assert_eq!(m.bcc[0].email.to_string(), "audit@example.com");
        assert_eq!(m.subject, "New signup");
    }

    #[tokio::test]
    async fn literal_body_is_sent_as_is_in_the_requested_format() {
        let local = Arc::new(LocalTransport::new());
        let mailer = Mailer::new(local.clone());
        let mut email = literal();
        email.reply_to = Some("support@example.com".into());

        mailer
            .send(email, &Data::new(), &SendOptions::default().html())
            .await
            .unwrap();

        let m = &local.messages()[0];
        assert_eq!(m.body, MessageBody::Html("  <p>Static</p>  ".into()));
        assert_eq!(m.reply_to.email.to_string(), "support@example.com");
    }

    #[tokio::test]
    async fn empty_recipients_never_reach_the_transport() {
        let mut mock = MockTransport::new();
        mock.expect_deliver().times(0);
        let mailer = Mailer::new(Arc::new(mock));

        let mut email = literal();
        email.to.clear();

        let err = mailer
            .send(email, &Data::new(), &SendOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SendError::NoRecipients));
    }

    #[tokio::test]
    async fn custom_resolver_replaces_default_resolution() {
        let local = Arc::new(LocalTransport::new());
        let mailer = Mailer::new(local.clone())
            .with_resolver(|_: &Email, _: &Data| vec!["routed@example.com".to_string()]);

        mailer
            .send(
                literal(),
                &data(json!({"email": "ignored@example.com"})),
                &SendOptions::default(),
            )
            .await
            .unwrap();

        let to: Vec<String> = local.messages()[0]
            .to
            .iter()
            .map(|mb| mb.email.to_string())
            .collect();
        assert_eq!(to, vec!["routed@example.com"]);
    }

    #[tokio::test]
    async fn render_failures_are_send_failures() {
        let mut mock = MockTransport::new();
        mock.expect_deliver().times(0);
        let mailer = Mailer::new(Arc::new(mock));

        let mut email = templated();
        email.template = Some(EmailTemplate::new("{{no_such_helper name}}"));

        let err = mailer
            .send(email, &Data::new(), &SendOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SendError::Template(_)), "{err:?}");
    }

    #[tokio::test]
    async fn templated_email_without_template_fails() {
        let mailer = Mailer::new(Arc::new(LocalTransport::new()));
        let mut email = templated();
        email.template = None;

        let err = mailer
            .send(email, &Data::new(), &SendOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SendError::MissingTemplate(_)));
    }

    #[tokio::test]
    async fn unparseable_data_addresses_are_reported() {
        let mailer = Mailer::new(Arc::new(LocalTransport::new()));

        let err = mailer
            .send(
                templated(),
                &data(json!({"email": "not an address"})),
                &SendOptions::default(),
            )
            .await
            .unwrap_err();

        match err {
            SendError::InvalidAddress { address, .. } => assert_eq!(address, "not an address"),
            other => panic!("expected InvalidAddress, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_failures_propagate_their_reason() {
        let mut mock = MockTransport::new();
        mock.expect_deliver()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("550 mailbox unavailable")));
        let mailer = Mailer::new(Arc::new(mock));

        let err = mailer
            .send(literal(), &Data::new(), &SendOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, SendError::Transport(_)));
        assert!(err.to_string().contains("550 mailbox unavailable"));
    }

    #[tokio::test]
    async fn transport_receives_the_built_message() {
        let mut mock = MockTransport::new();
        mock.expect_deliver()
            .withf(|m| m.to.len() == 1 && m.body == MessageBody::Text("  <p>Static</p>  ".into()))
            .times(1)
            .returning(|_| Ok(Receipt::default()));
        let mailer = Mailer::new(Arc::new(mock));

        let mut email = literal();
        email.to_keys.clear();

        assert!(
            mailer
                .send(email, &Data::new(), &SendOptions::default())
                .await
                .is_ok()
        );
    }

    #[test]
    fn options_accept_a_single_key_or_a_list() {
        let one: SendOptions = serde_json::from_value(json!({"flatten": "attrs"})).unwrap();
        assert_eq!(one.flatten, vec![FlattenKey::Key("attrs".into())]);
        assert_eq!(one.body, BodyFormat::Text);

        let many: SendOptions = serde_json::from_value(json!({
            "flatten": ["a", ["b", "rows"]],
            "body": "html"
        }))
        .unwrap();
        assert_eq!(
            many.flatten,
            vec![
                FlattenKey::Key("a".into()),
                FlattenKey::Rename("b".into(), "rows".into())
            ]
        );
        assert_eq!(many.body, BodyFormat::Html);

        let none: SendOptions = serde_json::from_value(json!({})).unwrap();
        assert_eq!(none, SendOptions::default());
    }
}
