//! Finding source locations in stack traces.
//!
//! Engines hand us stack traces as opaque strings.  The only shape we understand is a frame of the form
//! `at <member> in <path>:line <N>`, optionally indented.  Anything else is passed along untouched.
use regex::Regex;

use crate::log_line::SourceLocation;

lazy_static::lazy_static! {
    static ref FRAME: Regex =
        Regex::new(r"^\s*at (?P<member>.*?) in (?P<path>.*):line (?P<line>\d+)\s*$")
            .expect("The stack frame pattern is a valid regular expression");
}

/// The pieces of one recognized frame.
#[derive(Debug, Eq, PartialEq)]
struct Frame<'a> {
    member: &'a str,
    path: &'a str,
    line: u32,
}

fn parse_frame(line: &str) -> Option<Frame<'_>> {
    let caps = FRAME.captures(line)?;

    // A line number too large for u32 isn't something we can point at; treat it like any other unknown line.
    let line = caps.name("line")?.as_str().parse().ok()?;

    Some(Frame {
        member: caps.name("member")?.as_str(),
        path: caps.name("path")?.as_str(),
        line,
    })
}

/// Split text into lines on `\r\n`, `\n`, or a lone `\r`.
///
/// Unlike [str::lines], a lone carriage return is a line break.  A trailing terminator does not produce a final empty
/// line, and the empty string produces no lines.
pub(crate) fn split_lines(text: &str) -> Vec<&str> {
    let mut ret = vec![];
    let mut rest = text;

    while let Some(pos) = rest.find(|c: char| c == '\r' || c == '\n') {
        ret.push(&rest[..pos]);
        let skip = if rest[pos..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[pos + skip..];
    }

    if !rest.is_empty() {
        ret.push(rest);
    }

    ret
}

/// Find the location of the first recognizable frame of a stack trace.
///
/// Returns `None` if no line has a file and line number.
pub fn locate(stack_trace: &str) -> Option<SourceLocation> {
    split_lines(stack_trace)
        .into_iter()
        .find_map(parse_frame)
        .map(|f| SourceLocation {
            path: f.path.to_string(),
            line: f.line,
        })
}

/// Rewrite a frame into the `path(line,0): at member` form build tools know how to link.
///
/// Lines which aren't frames come back as they went in.
pub fn transform_frame(line: &str) -> String {
    match parse_frame(line) {
        Some(Frame { member, path, line }) => format!("{path}({line},0): at {member}"),
        None => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn rewrites_frames() {
        assert_eq!(transform_frame("at M() in P:line 18"), "P(18,0): at M()");
        assert_eq!(
            transform_frame("   at SomeClass.SomeMethod() in SomeFolder/SomeClass.cs:line 18"),
            "SomeFolder/SomeClass.cs(18,0): at SomeClass.SomeMethod()"
        );
        assert_eq!(
            transform_frame(r"   at Foo.Bar(Int32 x) in C:\dev\My Project\Foo.cs:line 7"),
            r"C:\dev\My Project\Foo.cs(7,0): at Foo.Bar(Int32 x)"
        );
    }

    #[test]
    fn passes_unknown_lines_through() {
        for line in [
            "   at System.Threading.Tasks.Task.Wait()",
            "--- End of stack trace from previous location ---",
            "at M() in P:line",
            "at M() in P:line 99999999999",
            "",
        ] {
            assert_eq!(transform_frame(line), line);
        }
    }

    #[test]
    fn locates_first_matching_frame() {
        let trace = "   at Outer.Thing()\r\n   at Inner.Thing() in /src/inner.cs:line 3\n   at Last.Thing() in /src/last.cs:line 9";
        assert_eq!(
            locate(trace),
            Some(SourceLocation {
                path: "/src/inner.cs".to_string(),
                line: 3,
            })
        );
    }

    #[test]
    fn locate_without_frames() {
        assert_eq!(locate(""), None);
        assert_eq!(locate("   at Outer.Thing()\n   at Inner.Thing()"), None);
    }

    #[test]
    fn split_lines_handles_all_terminators() {
        assert_eq!(split_lines("a\r\nb\nc\rd"), vec!["a", "b", "c", "d"]);
        assert_eq!(split_lines("a\n\nb\n"), vec!["a", "", "b"]);
        assert_eq!(split_lines("a\tb"), vec!["a\tb"]);
        assert!(split_lines("").is_empty());
    }

    proptest! {
        #[test]
        fn any_frame_rewrites(
            member in "[A-Za-z][A-Za-z0-9.]{0,20}\\(\\)",
            path in "[A-Za-z0-9_/\\\\.]{1,30}",
            line in 0u32..100000,
            indent in " {0,6}",
        ) {
            let frame = format!("{indent}at {member} in {path}:line {line}");
            prop_assert_eq!(transform_frame(&frame), format!("{path}({line},0): at {member}"));
            prop_assert_eq!(locate(&frame), Some(SourceLocation { path: path.clone(), line }));
        }

        #[test]
        fn non_frames_are_untouched(line in "[^\r\n]*") {
            prop_assume!(parse_frame(&line).is_none());
            prop_assert_eq!(transform_frame(&line), line);
        }
    }
}
