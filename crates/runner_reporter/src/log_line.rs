//! The unit of output: one line of text, a severity class, and possibly a source location.
use serde::{Deserialize, Serialize};

/// How important a line is.
///
/// Displays as the three-character tag sinks put in brackets, e.g. `Err` for `[Err]`.  It never changes what the text of
/// a line is.
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
pub enum Severity {
    #[display(fmt = "Err")]
    Error,

    #[display(fmt = "Wrn")]
    Warning,

    #[display(fmt = "Imp")]
    Info,

    /// Low-priority messages, such as diagnostics forwarded from the engine.
    #[display(fmt = "---")]
    Separator,
}

/// A file and line found in a stack trace.
///
/// The path is kept exactly as it appeared in the trace.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize, derive_more::Display)]
#[display(fmt = "{path}:{line}")]
pub struct SourceLocation {
    pub path: String,
    pub line: u32,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct LogLine {
    pub severity: Severity,

    /// Set on every line of a failure block whose stack trace had a locatable frame.
    pub location: Option<SourceLocation>,

    /// The rendered text, without a trailing newline.
    pub text: String,
}

impl LogLine {
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            location: None,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Severity::Error, text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(Severity::Warning, text)
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(Severity::Info, text)
    }

    pub fn separator(text: impl Into<String>) -> Self {
        Self::new(Severity::Separator, text)
    }

    #[must_use]
    pub fn with_location(mut self, location: Option<SourceLocation>) -> Self {
        self.location = location;
        self
    }

    /// The bracketed tag for this line, e.g. `[Err]` or `[Err @ src/foo.cs:18]`.
    pub fn tag(&self) -> String {
        match &self.location {
            Some(loc) => format!("[{} @ {loc}]", self.severity),
            None => format!("[{}]", self.severity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags() {
        assert_eq!(LogLine::error("x").tag(), "[Err]");
        assert_eq!(LogLine::warning("x").tag(), "[Wrn]");
        assert_eq!(LogLine::info("x").tag(), "[Imp]");
        assert_eq!(LogLine::separator("x").tag(), "[---]");

        let located = LogLine::error("x").with_location(Some(SourceLocation {
            path: r"C:\src\Foo.cs".to_string(),
            line: 18,
        }));
        assert_eq!(located.tag(), r"[Err @ C:\src\Foo.cs:18]");
    }

    #[test]
    fn severities_display_as_tags() {
        assert_eq!(
            [
                Severity::Error,
                Severity::Warning,
                Severity::Info,
                Severity::Separator,
            ]
            .map(|s| s.to_string()),
            ["Err", "Wrn", "Imp", "---"]
        );
    }
}
