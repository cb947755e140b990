//! # Environment Variable Utilities
//!
//! Typed readers for environment variables, falling back to a default when
//! the variable is unset or unparsable. Used by [`MailConfig`] and
//! [`AppConfig`].
//!
//! [`MailConfig`]: crate::config::mail::MailConfig
//! [`AppConfig`]: crate::config::app::AppConfig
//!
//! # Examples
//! ```rust,no_run
//! use wzs_mailer::config::env::{read_flag, read_u32};
//!
//! let starttls = read_flag("SMTP_STARTTLS", true);
//! let timeout = read_u32("SMTP_TIMEOUT_SECS", 30);
//! ```

/// Reads a boolean flag from an environment variable.
///
/// Returns `true` for any of the following case-insensitive values:
/// `"1"`, `"true"`, `"yes"`, `"on"`.
///
/// Anything else that is set counts as `false`.
pub fn read_flag(name: &str, default: bool) -> bool {
    read_flag_from(|k| std::env::var(k).ok(), name, default)
}

/// Reads a boolean flag using a custom provider function.
///
/// Surrounding quotes are ignored, so `SMTP_STARTTLS="false"` from a dotenv
/// file reads as `false`.
///
/// ```rust
/// use wzs_mailer::config::env::read_flag_from;
///
/// assert!(!read_flag_from(|_| Some("'off'".into()), "SMTP_STARTTLS", true));
/// ```
pub fn read_flag_from<F>(provider: F, name: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match provider(name) {
        Some(v) => {
            let s = v.trim().trim_matches(|c| c == '"' || c == '\'');
            matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
        }
        None => default,
    }
}

/// Reads an unsigned integer (`u32`) from an environment variable,
/// returning the provided default if parsing fails.
pub fn read_u32(name: &str, default: u32) -> u32 {
    read_u32_from(|k| std::env::var(k).ok(), name, default)
}

/// [`read_u32`] over a custom provider.
pub fn read_u32_from<F>(provider: F, name: &str, default: u32) -> u32
where
    F: Fn(&str) -> Option<String>,
{
    provider(name)
        .and_then(|s| s.trim().parse::<u32>().ok())
        .unwrap_or(default)
}
