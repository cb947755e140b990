//! # Address Validation
//!
//! A deliberately permissive, purely syntactic check for email addresses:
//! something without whitespace, an `@`, then something without whitespace,
//! at most [`MAX_ADDRESS_LEN`] characters long.
//!
//! No DNS/MX lookups and no Unicode normalization are performed. Stricter
//! parsing happens later, when the transport builds real mailboxes.
//!
//! # Example
//! ```rust
//! use wzs_mailer::email::address::is_valid;
//!
//! assert!(is_valid("ana@example.com"));
//! assert!(!is_valid("ana example.com"));
//! ```

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Maximum accepted address length, in characters.
pub const MAX_ADDRESS_LEN: usize = 160;

static ADDRESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s]+@[^\s]+$").expect("address pattern compiles"));

/// Why an address was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("must have the @ sign and no spaces")]
    Format,
    #[error("should be at most {MAX_ADDRESS_LEN} character(s)")]
    TooLong,
}

/// Validates a single address, reporting the first rule it breaks.
///
/// The format rule is checked before the length rule.
pub fn validate(address: &str) -> Result<(), AddressError> {
    if !ADDRESS_RE.is_match(address) {
        return Err(AddressError::Format);
    }
    if address.chars().count() > MAX_ADDRESS_LEN {
        return Err(AddressError::TooLong);
    }
    Ok(())
}

/// Returns `true` if `address` passes both the format and length rules.
pub fn is_valid(address: &str) -> bool {
    validate(address).is_ok()
}
