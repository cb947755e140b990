use thiserror::Error;

/// A requested record does not exist.
///
/// Returned by repositories at the `get` boundary; carries the entity name
/// and the identifier that was looked up.
///
/// # Example
/// ```
/// use wzs_mailer::error::entity::NotFoundError;
///
/// let err = NotFoundError::new("Email", "0190c4a2");
/// assert_eq!(err.to_string(), "Email 0190c4a2 not found");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    /// Name of the entity that was not found (e.g. `"Email"`)
    pub entity: &'static str,
    /// The identifier used for the lookup, as displayed
    pub id: String,
}

impl NotFoundError {
    pub fn new(entity: &'static str, id: impl ToString) -> Self {
        Self {
            entity,
            id: id.to_string(),
        }
    }
}
