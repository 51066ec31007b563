//! Rendering exception chains into blocks of lines.
//!
//! A block looks like this:
//!
//! ```text
//!     MyTests.Adds [FAIL]
//!       Assert.Equal() Failure : Values differ
//!       Expected: 4
//!       Actual:   5
//!       Stack Trace:
//!         /src/MyTests.cs(18,0): at MyTests.Adds()
//! ```
//!
//! Display names are escaped so that they always fit on one line.  Messages and stack traces are not escaped; they are
//! split into real lines instead.  Lines come back without a location; the dispatcher decides that for the whole
//! block.
use crate::events::FailureInformation;
use crate::log_line::LogLine;
use crate::stack_frame::{split_lines, transform_frame};

// Indentation of the various parts of a block.
const HEADER_INDENT: &str = "    ";
const BODY_INDENT: &str = "      ";
const FRAME_INDENT: &str = "        ";

/// Escape a display name so that it can be embedded in a single line.
///
/// Carriage returns, line feeds and tabs become `\r`, `\n` and `\t`.  Nothing else is touched.
pub fn escape(text: &str) -> String {
    let mut ret = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '\r' => ret.push_str("\\r"),
            '\n' => ret.push_str("\\n"),
            '\t' => ret.push_str("\\t"),
            c => ret.push(c),
        }
    }

    ret
}

/// What failed, which decides how the header line reads.
#[derive(Copy, Clone, Debug, Eq, PartialEq, derive_more::IsVariant)]
pub enum FailureLabel<'a> {
    /// A test, by unescaped display name.  Renders as `name [FAIL]`.
    Test(&'a str),

    /// Anything else, by an already-built label such as `FATAL ERROR`.  Renders as `[label] ExceptionType`.
    Fixture(&'a str),
}

/// Render the header, messages and stack trace for a failure.
pub fn format_failure(label: FailureLabel<'_>, failure: &FailureInformation) -> Vec<LogLine> {
    let mut lines = vec![];

    let header = match label {
        FailureLabel::Test(name) => format!("{HEADER_INDENT}{} [FAIL]", escape(name)),
        FailureLabel::Fixture(label) => {
            format!("{HEADER_INDENT}[{label}] {}", failure.exception_types()[0])
        }
    };
    lines.push(LogLine::error(header));

    for entry in failure.iter() {
        let mut message_lines = split_lines(entry.message).into_iter();
        let first = message_lines.next().unwrap_or("");

        lines.push(LogLine::info(format!(
            "{BODY_INDENT}{} : {first}",
            entry.exception_type
        )));
        lines.extend(message_lines.map(|l| LogLine::info(format!("{BODY_INDENT}{l}"))));
    }

    lines.push(LogLine::info(format!("{BODY_INDENT}Stack Trace:")));
    lines.extend(
        split_lines(failure.representative_stack_trace())
            .into_iter()
            .filter(|l| !l.is_empty())
            .map(|l| LogLine::info(format!("{FRAME_INDENT}{}", transform_frame(l)))),
    );

    lines
}

/// Render captured test output, if there is any.
///
/// Trailing whitespace is dropped first, so output of only newlines renders nothing.
pub fn format_output(output: &str) -> Vec<LogLine> {
    let trimmed = output.trim_end();
    if trimmed.is_empty() {
        return vec![];
    }

    std::iter::once(LogLine::info(format!("{BODY_INDENT}Output:")))
        .chain(
            split_lines(trimmed)
                .into_iter()
                .map(|l| LogLine::info(format!("{FRAME_INDENT}{l}"))),
        )
        .collect()
}
