//! Where rendered lines go.
//!
//! A sink has one operation: append a line.  Lines arrive in the order they are to be shown and sinks must not
//! reorder them.  We ship three:
//!
//! - `Vec<LogLine>`, which just keeps them.
//! - [WriterSink], which writes `[Tag] text` lines to anything implementing [std::io::Write].
//! - [LogCrateSink], which forwards to the log crate at a level matching the severity.
use std::io::Write;

use crate::error::Result;
use crate::log_line::{LogLine, Severity};

pub trait LogSink {
    fn append(&mut self, line: &LogLine) -> Result<()>;
}

impl LogSink for Vec<LogLine> {
    fn append(&mut self, line: &LogLine) -> Result<()> {
        self.push(line.clone());
        Ok(())
    }
}

impl<S: LogSink + ?Sized> LogSink for &mut S {
    fn append(&mut self, line: &LogLine) -> Result<()> {
        (**self).append(line)
    }
}

impl<S: LogSink + ?Sized> LogSink for Box<S> {
    fn append(&mut self, line: &LogLine) -> Result<()> {
        (**self).append(line)
    }
}

/// How a [WriterSink] presents lines.
#[derive(Clone, Debug, Eq, PartialEq, derive_builder::Builder)]
#[builder(pattern = "owned")]
pub struct SinkConfig {
    /// Add ` @ path:line` inside the tag of lines which have a location.
    #[builder(default = "true")]
    pub include_location: bool,

    /// Write the `[Err]`-style tag at all.  If false, only the text is written.
    ///
    /// Turning this off also drops locations, since they live in the tag.
    #[builder(default = "true")]
    pub include_tags: bool,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            include_location: true,
            include_tags: true,
        }
    }
}

/// Writes one line per [LogLine] to a writer.
///
/// Does no buffering of its own; wrap the writer in a [std::io::BufWriter] if that matters.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: W,
    config: SinkConfig,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self::with_config(writer, SinkConfig::default())
    }

    pub fn with_config(writer: W, config: SinkConfig) -> Self {
        Self { writer, config }
    }

    pub fn config(&self) -> &SinkConfig {
        &self.config
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// The text written for a line, without the newline.
    pub fn render(&self, line: &LogLine) -> String {
        if !self.config.include_tags {
            return line.text.clone();
        }

        let tag = if self.config.include_location {
            line.tag()
        } else {
            format!("[{}]", line.severity)
        };

        format!("{tag} {}", line.text)
    }
}

impl<W: Write> LogSink for WriterSink<W> {
    fn append(&mut self, line: &LogLine) -> Result<()> {
        let rendered = self.render(line);
        writeln!(self.writer, "{rendered}")?;
        Ok(())
    }
}

/// Forwards lines to the log crate.
///
/// Severities map to levels as follows: Error to error, Warning to warn, Info to info, Separator to debug.  The log
/// level carries what the tag would, so only the location is added to the text.
#[derive(Clone, Debug)]
pub struct LogCrateSink {
    target: String,
}

impl Default for LogCrateSink {
    fn default() -> Self {
        Self::new(module_path!())
    }
}

impl LogCrateSink {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// The message logged for a line: its text, prefixed with `[@ path:line]` if it has a location.
    pub fn message(&self, line: &LogLine) -> String {
        match &line.location {
            Some(loc) => format!("[@ {loc}] {}", line.text),
            None => line.text.clone(),
        }
    }

    /// Log a line to a specific logger rather than the global one.
    pub fn log_to(&self, logger: &dyn log::Log, line: &LogLine) {
        let message = self.message(line);

        logger.log(
            &log::Record::builder()
                .args(format_args!("{message}"))
                .level(level_for(line.severity))
                .target(&self.target)
                .module_path_static(Some(module_path!()))
                .file_static(Some(file!()))
                .line(Some(line!()))
                .build(),
        );
    }
}

pub(crate) fn level_for(severity: Severity) -> log::Level {
    match severity {
        Severity::Error => log::Level::Error,
        Severity::Warning => log::Level::Warn,
        Severity::Info => log::Level::Info,
        Severity::Separator => log::Level::Debug,
    }
}

impl LogSink for LogCrateSink {
    fn append(&mut self, line: &LogLine) -> Result<()> {
        if level_for(line.severity) <= log::max_level() {
            self.log_to(log::logger(), line);
        }

        Ok(())
    }
}
