//! # Recipient Resolution
//!
//! Decides the final `to` list for a send: the record's static `to`
//! addresses, followed by whatever the submission data holds under each of the
//! record's `to_keys`.
//!
//! Applications that source addresses differently (a user directory, a
//! routing table, ...) inject their own [`RecipientResolver`]. A custom
//! resolver *replaces* the default entirely; nothing is merged.
//!
//! # Example
//! ```rust
//! use serde_json::json;
//! use wzs_mailer::data::to_data;
//! use wzs_mailer::email::entity::Email;
//! use wzs_mailer::notification::recipients::resolve_to;
//!
//! let email = Email {
//!     to: vec!["a@x.com".into()],
//!     to_keys: vec!["k".into()],
//!     ..Email::default()
//! };
//! let data = to_data(&json!({"k": "b@x.com"})).unwrap();
//!
//! assert_eq!(resolve_to(&email, &data, None), vec!["a@x.com", "b@x.com"]);
//! ```

use serde_json::Value;
use tracing::warn;

use crate::data::{Data, kind_of};
use crate::email::entity::Email;

/// Strategy for computing `to` addresses at send time.
///
/// Implemented for any `Fn(&Email, &Data) -> Vec<String>`, so a closure can
/// be injected directly.
pub trait RecipientResolver: Send + Sync {
    fn resolve_to(&self, email: &Email, data: &Data) -> Vec<String>;
}

impl<F> RecipientResolver for F
where
    F: Fn(&Email, &Data) -> Vec<String> + Send + Sync,
{
    fn resolve_to(&self, email: &Email, data: &Data) -> Vec<String> {
        self(email, data)
    }
}

/// Static `to` addresses followed by data lookups through `to_keys`.
///
/// - missing keys and `null` values are skipped
/// - strings are taken as they are, duplicates included
/// - lists contribute each of their string elements
/// - any other kind of value is skipped with a warning
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRecipientResolver;

impl RecipientResolver for DefaultRecipientResolver {
    fn resolve_to(&self, email: &Email, data: &Data) -> Vec<String> {
        let mut to = email.to.clone();

        for key in &email.to_keys {
            match data.get(key) {
                None | Some(Value::Null) => {}
                Some(Value::String(address)) => to.push(address.clone()),
                Some(Value::Array(items)) => {
                    to.extend(items.iter().filter_map(|v| v.as_str().map(String::from)));
                }
                Some(other) => warn!(
                    "email {}: recipient key `{key}` holds {}, skipped",
                    email.id,
                    kind_of(other)
                ),
            }
        }

        to
    }
}

/// Resolves `to` addresses with `hook` when given, the default otherwise.
pub fn resolve_to(email: &Email, data: &Data, hook: Option<&dyn RecipientResolver>) -> Vec<String> {
    match hook {
        Some(resolver) => resolver.resolve_to(email, data),
        None => DefaultRecipientResolver.resolve_to(email, data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn email(to: &[&str], to_keys: &[&str]) -> Email {
        Email {
            to: to.iter().map(|s| s.to_string()).collect(),
            to_keys: to_keys.iter().map(|s| s.to_string()).collect(),
            ..Email::default()
        }
    }

    fn data(value: Value) -> Data {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn appends_looked_up_addresses_after_static_ones() {
        let got = resolve_to(
            &email(&["a@x.com"], &["k"]),
            &data(json!({"k": "b@x.com"})),
            None,
        );
        assert_eq!(got, vec!["a@x.com", "b@x.com"]);
    }

    #[test]
    fn missing_keys_are_skipped() {
        let got = resolve_to(&email(&["a@x.com"], &["k"]), &Data::new(), None);
        assert_eq!(got, vec!["a@x.com"]);
    }

    #[test]
    fn keeps_key_order_and_duplicates() {
        let got = resolve_to(
            &email(&["a@x.com"], &["second", "first", "nothing", "dup"]),
            &data(json!({
                "first": "f@x.com",
                "second": "s@x.com",
                "nothing": null,
                "dup": "a@x.com"
            })),
            None,
        );
        assert_eq!(got, vec!["a@x.com", "s@x.com", "f@x.com", "a@x.com"]);
    }

    #[test]
    fn lists_contribute_their_strings_and_other_kinds_are_skipped() {
        let got = resolve_to(
            &email(&[], &["many", "number"]),
            &data(json!({"many": ["m1@x.com", 3, "m2@x.com"], "number": 42})),
            None,
        );
        assert_eq!(got, vec!["m1@x.com", "m2@x.com"]);
    }

    #[test]
    fn hook_replaces_the_default_entirely() {
        let hook = |_: &Email, data: &Data| -> Vec<String> {
            vec![format!("{}@directory.example.com", data["user"].as_str().unwrap())]
        };

        let got = resolve_to(
            &email(&["static@x.com"], &["k"]),
            &data(json!({"k": "b@x.com", "user": "jon"})),
            Some(&hook),
        );
        assert_eq!(got, vec!["jon@directory.example.com"]);
    }

    #[test]
    fn hook_result_is_returned_unmodified_even_when_empty() {
        let hook = |_: &Email, _: &Data| Vec::<String>::new();
        let got = resolve_to(&email(&["static@x.com"], &[]), &Data::new(), Some(&hook));
        assert!(got.is_empty());
    }
}
