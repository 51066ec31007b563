//! Render test-runner lifecycle events as log lines.
//!
//! A test execution engine produces a stream of events: assemblies being discovered and run, tests failing or being
//! skipped, fixtures failing to clean up, and finally a summary of the whole run.  This crate turns each of those into
//! lines of text for a log, one event at a time, in the order they arrive.  It decides nothing about what runs and
//! keeps no state between events.
//!
//! The output is meant to be diffed and snapshotted, so it is exact down to the space.  The interesting parts are:
//!
//! - [stack_frame], which finds a file and line in a stack trace so that every line of a failure can point at it, and
//!   rewrites frames into the `path(line,0): at member` form editors and CI systems link.
//! - [failure], which lays out exception chains and their messages and owns the escaping of display names.
//! - [summary], which draws the column-aligned end-of-run table.
//!
//! [Dispatcher] ties these together and hands lines to a [LogSink].  Each [LogLine] carries a [Severity] which sinks
//! turn into a tag (`[Err]`, `[Wrn]`, `[Imp]`, `[---]`), and possibly a [SourceLocation] which goes into the tag as
//! `@ path:line`:
//!
//! ```text
//! [Err @ /src/MyTests.cs:18]     MyTests.Adds [FAIL]
//! [Imp @ /src/MyTests.cs:18]       Xunit.EqualException : Assert.Equal() Failure
//! [Imp @ /src/MyTests.cs:18]       Stack Trace:
//! [Imp @ /src/MyTests.cs:18]         /src/MyTests.cs(18,0): at MyTests.Adds()
//! ```
//!
//! The crate logs about itself through the log crate: a trace record per dispatched event and a debug record when a
//! failure has no locatable frame.
mod dispatcher;
mod error;
mod events;
pub mod failure;
mod log_line;
mod sink;
pub mod stack_frame;
pub mod summary;

pub use dispatcher::{render_event, Dispatcher};
pub use error::{Error, Result};
pub use events::*;
pub use log_line::{LogLine, Severity, SourceLocation};
pub use sink::{
    LogCrateSink, LogSink, SinkConfig, SinkConfigBuilder, SinkConfigBuilderError, WriterSink,
};
pub use summary::ExecutionSummary;

/// Times in events and summaries are decimal seconds.
pub use rust_decimal::Decimal;
