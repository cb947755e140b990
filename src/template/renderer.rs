//! # Template Rendering
//!
//! Wraps the [Handlebars](https://crates.io/crates/handlebars) engine for
//! message bodies stored as text at runtime.
//!
//! Rendering is done in three steps:
//! 1. parse the template text (syntax errors become [`TemplateError::Parse`]),
//! 2. normalize the submission data, flattening selected keys into
//!    `[key, value]` rows (see [`normalize`]),
//! 3. render and trim the output.
//!
//! HTML escaping is disabled: the result is message text and whether it is
//! sent as plain text or HTML is decided by the sender.
//!
//! # Example
//! ```rust
//! use serde_json::json;
//! use wzs_mailer::data::to_data;
//! use wzs_mailer::template::renderer::{FlattenKey, TemplateRenderer};
//!
//! let renderer = TemplateRenderer::new();
//! let data = to_data(&json!({"attrs": {"first_name": "Jon"}})).unwrap();
//!
//! let out = renderer
//!     .render(
//!         "{{#each attrs}}{{this.[0]}}={{this.[1]}}{{/each}}",
//!         &data,
//!         &[FlattenKey::from("attrs")],
//!     )
//!     .unwrap();
//! assert_eq!(out, "first_name=Jon");
//! ```

use handlebars::{Handlebars, Template};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::data::{Data, kind_of};
use crate::error::template::TemplateError;
use crate::template::flatten::flatten_value;

/// A key of the submission data to expose as `[key, value]` rows.
///
/// Deserializes from either a string (`"attrs"`) or a two-element list
/// (`["attrs", "rows"]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlattenKey {
    /// Flatten `data[key]` and store the rows back under `key`.
    Key(String),
    /// Flatten `data[from]` and store the rows under `to`.
    Rename(String, String),
}

impl FlattenKey {
    fn source(&self) -> &str {
        match self {
            FlattenKey::Key(key) => key,
            FlattenKey::Rename(from, _) => from,
        }
    }

    fn target(&self) -> &str {
        match self {
            FlattenKey::Key(key) => key,
            FlattenKey::Rename(_, to) => to,
        }
    }
}

impl From<&str> for FlattenKey {
    fn from(key: &str) -> Self {
        FlattenKey::Key(key.to_string())
    }
}

impl From<String> for FlattenKey {
    fn from(key: String) -> Self {
        FlattenKey::Key(key)
    }
}

impl From<(&str, &str)> for FlattenKey {
    fn from((from, to): (&str, &str)) -> Self {
        FlattenKey::Rename(from.to_string(), to.to_string())
    }
}

/// Builds the bindings handed to the template.
///
/// Every top-level entry of `data` is kept; for each flatten key, the source
/// value is flattened and stored under the target key, overriding whatever
/// was there. Missing or non-mapping sources are left as they are.
pub fn normalize(data: &Data, flatten_keys: &[FlattenKey]) -> Data {
    let mut flattened = Data::new();

    for key in flatten_keys {
        match data.get(key.source()) {
            Some(value) => match flatten_value(value) {
                Some(rows) => {
                    flattened.insert(key.target().to_string(), rows);
                }
                None => debug!(
                    "flatten: `{}` is {}, not a mapping; left as is",
                    key.source(),
                    kind_of(value)
                ),
            },
            None => debug!("flatten: `{}` not present in data", key.source()),
        }
    }

    let mut bindings = data.clone();
    bindings.extend(flattened);
    bindings
}

/// Parses template text without rendering it.
///
/// Used at validation time to reject malformed templates early.
pub fn check(text: &str) -> Result<(), TemplateError> {
    parse(text).map(|_| ())
}

fn parse(text: &str) -> Result<Template, TemplateError> {
    Template::compile(text).map_err(|e| TemplateError::Parse {
        reason: e.reason().to_string(),
        line: e.pos().map(|(line, _col)| line),
    })
}

/// Renders stored template text against submission data.
///
/// The renderer is cheap to share (`Send + Sync`); one instance is normally
/// owned by the [`Mailer`](crate::notification::sender::Mailer).
pub struct TemplateRenderer {
    registry: Handlebars<'static>,
}

impl std::fmt::Debug for TemplateRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRenderer").finish_non_exhaustive()
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        Self { registry }
    }

    /// Renders `text` with `data`, flattening `flatten_keys` first.
    ///
    /// Never panics; parse and render failures are returned as
    /// [`TemplateError`]. Output is trimmed of leading and trailing whitespace.
    pub fn render(
        &self,
        text: &str,
        data: &Data,
        flatten_keys: &[FlattenKey],
    ) -> Result<String, TemplateError> {
        parse(text)?;

        let bindings = Value::Object(normalize(data, flatten_keys));
        let out = self
            .registry
            .render_template(text, &bindings)
            .map_err(|e| TemplateError::Render(e.to_string()))?;

        Ok(out.trim().to_string())
    }

    /// Same as [`render`](Self::render), for callers that treat a failure as
    /// a bug in their own data.
    ///
    /// # Panics
    /// Panics with the [`TemplateError`] if parsing or rendering fails.
    pub fn must_render(&self, text: &str, data: &Data, flatten_keys: &[FlattenKey]) -> String {
        match self.render(text, data, flatten_keys) {
            Ok(out) => out,
            Err(e) => panic!("template rendering failed: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> Data {
        value.as_object().cloned().expect("object fixture")
    }

    #[test]
    fn renders_and_trims() {
        let r = TemplateRenderer::new();
        let out = r
            .render("\n  Hello {{ name }}  \n", &data(json!({"name": "Ana"})), &[])
            .unwrap();
        assert_eq!(out, "Hello Ana");
    }

    #[test]
    fn does_not_escape_html() {
        let r = TemplateRenderer::new();
        let out = r
            .render("{{ note }}", &data(json!({"note": "<b>Tom & Jerry</b>"})), &[])
            .unwrap();
        assert_eq!(out, "<b>Tom & Jerry</b>");
    }

    #[test]
    fn normalize_flattens_in_place() {
        let d = data(json!({"attrs": {"first_name": "Jon"}, "other": 1}));
        let out = normalize(&d, &["attrs".into()]);

        assert_eq!(out["attrs"], json!([["first_name", "Jon"]]));
        assert_eq!(out["other"], json!(1));
    }

    #[test]
    fn normalize_renames_and_keeps_the_source() {
        let d = data(json!({"attrs": {"a": 1, "b": 2}}));
        let out = normalize(&d, &[("attrs", "rows").into()]);

        assert_eq!(out["rows"], json!([["a", 1], ["b", 2]]));
        assert_eq!(out["attrs"], json!({"a": 1, "b": 2}));
    }

    #[test]
    fn normalize_flattened_values_win_on_collision() {
        let d = data(json!({"attrs": {"a": 1}, "rows": "original"}));
        let out = normalize(&d, &[("attrs", "rows").into()]);

        assert_eq!(out["rows"], json!([["a", 1]]));
    }

    #[test]
    fn normalize_skips_missing_and_non_mapping_keys() {
        let d = data(json!({"list": [1, 2]}));
        let out = normalize(&d, &["missing".into(), "list".into()]);

        assert!(!out.contains_key("missing"));
        assert_eq!(out["list"], json!([1, 2]));
    }

    #[test]
    fn flattened_rows_are_iterable_in_templates() {
        let r = TemplateRenderer::new();
        let d = data(json!({"attrs": {"first_name": "Jon", "last_name": "Snow"}}));
        let out = r
            .render(
                "{{#each attrs}}{{this.[0]}}: {{this.[1]}}\n{{/each}}",
                &d,
                &["attrs".into()],
            )
            .unwrap();

        assert_eq!(out, "first_name: Jon\nlast_name: Snow");
    }

    #[test]
    fn parse_failure_is_reported_as_parse_error() {
        let r = TemplateRenderer::new();
        let err = r.render("Hello {{ name", &Data::new(), &[]).unwrap_err();
        assert!(matches!(err, TemplateError::Parse { .. }), "{err:?}");
    }

    #[test]
    fn check_accepts_valid_and_rejects_unbalanced_blocks() {
        assert!(check("Hi {{#if name}}{{name}}{{/if}}").is_ok());
        assert!(check("Hi {{#if name}}{{name}}").is_err());
    }

    #[test]
    fn parse_errors_carry_the_line_of_the_failure() {
        match check("a\nb\n{{#if x}}unclosed") {
            Err(TemplateError::Parse { reason, line }) => {
                assert!(!reason.is_empty());
                assert_eq!(line, Some(3));
            }
            other => panic!("expected a parse error, got {other:?}"),
        }

        let err = check("line1\n{{#each}}x{{/if}}").unwrap_err();
        assert!(matches!(err, TemplateError::Parse { line: Some(2), .. }), "{err:?}");
    }

    #[test]
    fn render_failure_is_reported_as_render_error() {
        let r = TemplateRenderer::new();
        let err = r
            .render("{{no_such_helper name}}", &data(json!({"name": "x"})), &[])
            .unwrap_err();
        assert!(matches!(err, TemplateError::Render(_)), "{err:?}");
    }

    #[test]
    fn flatten_keys_deserialize_from_strings_and_pairs() {
        let keys: Vec<FlattenKey> = serde_json::from_value(json!(["a", ["b", "c"]])).unwrap();
        assert_eq!(
            keys,
            vec![
                FlattenKey::Key("a".into()),
                FlattenKey::Rename("b".into(), "c".into())
            ]
        );
    }

    #[test]
    #[should_panic(expected = "template rendering failed")]
    fn must_render_panics_on_failure() {
        let r = TemplateRenderer::new();
        let _ = r.must_render("{{#each}}", &Data::new(), &[]);
    }
}
