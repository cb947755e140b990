//! Conversion between comma-separated strings and ordered string lists.
//!
//! Used to keep the form-facing `*_csv` fields in sync with the canonical
//! list fields of an [`Email`](crate::email::entity::Email).

/// Splits a comma-separated string into trimmed, non-empty entries.
///
/// `None` and `""` both yield an empty list. Order is preserved and
/// duplicates are kept.
///
/// # Example
/// ```rust
/// use wzs_mailer::email::csv::to_list;
///
/// assert_eq!(to_list(Some(" a@x.com, ,b@x.com ")), vec!["a@x.com", "b@x.com"]);
/// assert!(to_list(None).is_empty());
/// ```
pub fn to_list(csv: Option<&str>) -> Vec<String> {
    let Some(csv) = csv else {
        return Vec::new();
    };

    csv.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(String::from)
        .collect()
}

/// Joins a list with `", "`. An empty list gives an empty string.
pub fn to_csv<S: AsRef<str>>(list: &[S]) -> String {
    list.iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ")
}
