use thiserror::Error;
use uuid::Uuid;

use crate::error::template::TemplateError;

/// Why a send did not reach the transport, or the transport refused it.
#[derive(Debug, Error)]
pub enum SendError {
    /// The record says `use_template` but carries no template.
    #[error("email {0} uses a template but has none")]
    MissingTemplate(Uuid),

    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Recipient resolution produced nothing; delivery was not attempted.
    #[error("no recipients")]
    NoRecipients,

    /// An address could not be turned into a mailbox.
    #[error("invalid address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    /// The transport's own failure reason.
    #[error("transport failed: {0:#}")]
    Transport(#[source] anyhow::Error),
}
