use thiserror::Error;

/// Failure reported by the template engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The template text is not valid template syntax.
    ///
    /// `line` is 1-based, when the engine can tell where parsing failed.
    #[error("{reason}{}", at_line(.line))]
    Parse { reason: String, line: Option<usize> },

    /// The template parsed, but merging the data into it failed.
    #[error("render failed: {0}")]
    Render(String),
}

fn at_line(line: &Option<usize>) -> String {
    line.map(|l| format!(" (line {l})")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_mentions_line_when_known() {
        let err = TemplateError::Parse {
            reason: "unclosed tag".into(),
            line: Some(3),
        };
        assert_eq!(err.to_string(), "unclosed tag (line 3)");

        let err = TemplateError::Parse {
            reason: "unclosed tag".into(),
            line: None,
        };
        assert_eq!(err.to_string(), "unclosed tag");
    }

    #[test]
    fn render_error_is_prefixed() {
        let err = TemplateError::Render("helper not found".into());
        assert_eq!(err.to_string(), "render failed: helper not found");
    }
}
