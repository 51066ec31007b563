//! The events an execution engine hands us, one at a time.
//!
//! Engines often live in another process, so everything here is serde-serializable.  Test metadata is flattened to the
//! strings we print: there is no graph of test to case to class to assembly, just the display names.
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::summary::ExecutionSummary;

/// One notification of progress from the execution engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, derive_more::IsVariant)]
pub enum LifecycleEvent {
    AssemblyDiscoveryStarting(DiscoveryStarting),
    AssemblyDiscoveryFinished(DiscoveryFinished),
    AssemblyStarting(AssemblyStarting),
    AssemblyFinished(AssemblyFinished),
    TestPassed(TestPassed),
    TestFailed(TestFailed),
    TestSkipped(TestSkipped),
    CleanupFailure(CleanupFailure),
    DiagnosticMessage(DiagnosticMessage),
    ExecutionSummaryReady(ExecutionSummaryReady),
}

/// How the engine names test methods.  Only printed, in diagnostic mode.
#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum MethodDisplay {
    #[default]
    #[display(fmt = "ClassAndMethod")]
    ClassAndMethod,

    #[display(fmt = "Method")]
    Method,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryStarting {
    pub assembly: String,
    pub diagnostic_messages: bool,
    pub method_display: MethodDisplay,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryFinished {
    pub assembly: String,
    pub diagnostic_messages: bool,
    pub test_cases_discovered: u64,

    /// After filtering.  At most `test_cases_discovered`.
    pub test_cases_to_run: u64,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AssemblyStarting {
    pub assembly: String,
    pub diagnostic_messages: bool,
    pub parallelize_test_collections: bool,

    /// `None` means the engine doesn't cap its thread count.
    pub max_threads: Option<u32>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AssemblyFinished {
    pub assembly: String,
    pub diagnostic_messages: bool,
    pub test_cases_executed: u64,
    pub test_cases_total: u64,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TestPassed {
    pub test: String,

    /// Captured output of the test, possibly empty.
    pub output: String,

    pub diagnostic_messages: bool,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TestFailed {
    pub test: String,
    pub failure: FailureInformation,

    /// Captured output of the test, possibly empty.
    pub output: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TestSkipped {
    pub test: String,
    pub reason: String,
}

/// Which fixture failed to tear down, and its name.
///
/// [CleanupScope::Error] is a failure not owned by any fixture at all, e.g. the engine itself falling over.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize, derive_more::IsVariant)]
pub enum CleanupScope {
    Error,
    Assembly(String),
    Collection(String),
    Class(String),
    Method(String),
    Case(String),
    Test(String),
}

impl CleanupScope {
    /// The label shown in brackets at the head of the failure block.
    pub fn label(&self) -> String {
        use crate::failure::escape;

        match self {
            CleanupScope::Error => "FATAL ERROR".to_string(),
            CleanupScope::Assembly(x) => format!("Test Assembly Cleanup Failure ({})", escape(x)),
            CleanupScope::Collection(x) => {
                format!("Test Collection Cleanup Failure ({})", escape(x))
            }
            CleanupScope::Class(x) => format!("Test Class Cleanup Failure ({})", escape(x)),
            CleanupScope::Method(x) => format!("Test Method Cleanup Failure ({})", escape(x)),
            CleanupScope::Case(x) => format!("Test Case Cleanup Failure ({})", escape(x)),
            CleanupScope::Test(x) => format!("Test Cleanup Failure ({})", escape(x)),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CleanupFailure {
    pub scope: CleanupScope,
    pub failure: FailureInformation,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticMessage {
    /// The assembly the message came from, if the engine knows.
    pub assembly: Option<String>,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSummaryReady {
    /// `(label, summary)` pairs, printed in this order.
    pub summaries: Vec<(String, ExecutionSummary)>,

    /// Wall-clock seconds for the whole run.  Differs from the sum of the per-assembly times when assemblies run in
    /// parallel.
    pub elapsed_clock_time: Decimal,
}

/// The name engines usually show for an assembly: the file name of its path without the extension.
///
/// Both `/` and `\` count as separators, whatever platform we're on, since the path may come from elsewhere.
pub fn assembly_display_name(path: &str) -> &str {
    let file = path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(path);

    match file.rfind('.') {
        Some(i) if i > 0 => &file[..i],
        _ => file,
    }
}

/// A chain of exceptions, outermost first.
///
/// The three sequences are parallel and always the same nonzero length.  This is checked at construction, including
/// when deserializing.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFailureInformation")]
pub struct FailureInformation {
    exception_types: Vec<String>,
    messages: Vec<String>,
    stack_traces: Vec<String>,
}

/// What comes off the wire, before we check it.
#[derive(Deserialize)]
struct RawFailureInformation {
    exception_types: Vec<String>,
    messages: Vec<String>,
    stack_traces: Vec<String>,
}

impl TryFrom<RawFailureInformation> for FailureInformation {
    type Error = Error;

    fn try_from(raw: RawFailureInformation) -> Result<Self> {
        FailureInformation::try_new(raw.exception_types, raw.messages, raw.stack_traces)
    }
}

/// One link of a [FailureInformation] chain.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ExceptionEntry<'a> {
    pub exception_type: &'a str,
    pub message: &'a str,
    pub stack_trace: &'a str,
}

impl FailureInformation {
    /// Build failure information, panicking if the sequences are empty or differ in length.
    ///
    /// A mismatched chain is a bug in the producer.  Use [FailureInformation::try_new] for untrusted input.
    #[track_caller]
    pub fn new(
        exception_types: Vec<String>,
        messages: Vec<String>,
        stack_traces: Vec<String>,
    ) -> Self {
        match Self::try_new(exception_types, messages, stack_traces) {
            Ok(x) => x,
            Err(e) => panic!("Invalid failure information: {e}"),
        }
    }

    pub fn try_new(
        exception_types: Vec<String>,
        messages: Vec<String>,
        stack_traces: Vec<String>,
    ) -> Result<Self> {
        if exception_types.len() != messages.len() || messages.len() != stack_traces.len() {
            return Err(Error::MismatchedFailureChain {
                types: exception_types.len(),
                messages: messages.len(),
                stack_traces: stack_traces.len(),
            });
        }

        if exception_types.is_empty() {
            return Err(Error::EmptyFailureChain);
        }

        Ok(Self {
            exception_types,
            messages,
            stack_traces,
        })
    }

    /// A chain of exactly one exception.
    pub fn single(
        exception_type: impl Into<String>,
        message: impl Into<String>,
        stack_trace: impl Into<String>,
    ) -> Self {
        Self {
            exception_types: vec![exception_type.into()],
            messages: vec![message.into()],
            stack_traces: vec![stack_trace.into()],
        }
    }

    /// Number of exceptions in the chain.  Never zero.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.exception_types.len()
    }

    pub fn exception_types(&self) -> &[String] {
        &self.exception_types
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn stack_traces(&self) -> &[String] {
        &self.stack_traces
    }

    /// The stack trace we show and locate from: that of the outermost exception.
    pub fn representative_stack_trace(&self) -> &str {
        &self.stack_traces[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = ExceptionEntry<'_>> {
        self.exception_types
            .iter()
            .zip(self.messages.iter())
            .zip(self.stack_traces.iter())
            .map(|((exception_type, message), stack_trace)| ExceptionEntry {
                exception_type,
                message,
                stack_trace,
            })
    }
}
