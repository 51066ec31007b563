//! Turn lifecycle events into lines.
//!
//! One event in, zero or more lines out, and nothing remembered in between: rendering the same event twice gives the
//! same lines.  Each event kind has its own arm in [render_event]; failures and the summary hand off to
//! [crate::failure] and [crate::summary].
use crate::error::Result;
use crate::events::*;
use crate::failure::{escape, format_failure, format_output, FailureLabel};
use crate::log_line::LogLine;
use crate::sink::LogSink;
use crate::stack_frame::{locate, split_lines};
use crate::summary::format_summary;

fn plural(count: u64) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

fn discovery_starting(ev: &DiscoveryStarting) -> Vec<LogLine> {
    let name = escape(&ev.assembly);

    let line = if ev.diagnostic_messages {
        format!(
            "Discovering: {name} (method display = {})",
            ev.method_display
        )
    } else {
        format!("Discovering: {name}")
    };

    vec![LogLine::info(line)]
}

fn discovery_finished(ev: &DiscoveryFinished) -> Vec<LogLine> {
    let name = escape(&ev.assembly);

    let line = if ev.diagnostic_messages {
        let count = if ev.test_cases_to_run == ev.test_cases_discovered {
            ev.test_cases_discovered.to_string()
        } else {
            format!("{} of {}", ev.test_cases_to_run, ev.test_cases_discovered)
        };
        format!(
            "Discovered:  {name} (found {count} test case{})",
            plural(ev.test_cases_to_run)
        )
    } else {
        format!("Discovered:  {name}")
    };

    vec![LogLine::info(line)]
}

fn assembly_starting(ev: &AssemblyStarting) -> Vec<LogLine> {
    let name = escape(&ev.assembly);

    let line = if ev.diagnostic_messages {
        let threads = ev
            .max_threads
            .map(|x| x.to_string())
            .unwrap_or_else(|| "unlimited".to_string());
        format!(
            "Starting:    {name} (parallel test collections = {}, max threads = {threads})",
            on_off(ev.parallelize_test_collections)
        )
    } else {
        format!("Starting:    {name}")
    };

    vec![LogLine::info(line)]
}

fn assembly_finished(ev: &AssemblyFinished) -> Vec<LogLine> {
    let name = escape(&ev.assembly);

    let line = if ev.diagnostic_messages {
        format!(
            "Finished:    {name} (executed {} of {} test case{})",
            ev.test_cases_executed,
            ev.test_cases_total,
            plural(ev.test_cases_total)
        )
    } else {
        format!("Finished:    {name}")
    };

    vec![LogLine::info(line)]
}

fn test_passed(ev: &TestPassed) -> Vec<LogLine> {
    let output = format_output(&ev.output);
    if !ev.diagnostic_messages || output.is_empty() {
        return vec![];
    }

    let mut lines = vec![LogLine::info(format!("    {} [PASS]", escape(&ev.test)))];
    lines.extend(output);
    lines
}

/// A failure block, with every line pointing at the first frame we can find.
fn failure_block(
    label: FailureLabel<'_>,
    failure: &FailureInformation,
    output: &str,
) -> Vec<LogLine> {
    let location = locate(failure.representative_stack_trace());
    if location.is_none() {
        log::debug!("No source location in the stack trace for {label:?}");
    }

    format_failure(label, failure)
        .into_iter()
        .chain(format_output(output))
        .map(|l| l.with_location(location.clone()))
        .collect()
}

fn test_skipped(ev: &TestSkipped) -> Vec<LogLine> {
    vec![
        LogLine::warning(format!("    {} [SKIP]", escape(&ev.test))),
        LogLine::info(format!("      {}", escape(&ev.reason))),
    ]
}

fn diagnostic_message(ev: &DiagnosticMessage) -> Vec<LogLine> {
    let prefix = match &ev.assembly {
        Some(a) => format!("[{}] ", escape(a)),
        None => String::new(),
    };

    split_lines(&ev.message)
        .into_iter()
        .map(|l| LogLine::separator(format!("   {prefix}{l}")))
        .collect()
}

/// Render one event to the lines it produces, in order.
pub fn render_event(event: &LifecycleEvent) -> Vec<LogLine> {
    match event {
        LifecycleEvent::AssemblyDiscoveryStarting(ev) => discovery_starting(ev),
        LifecycleEvent::AssemblyDiscoveryFinished(ev) => discovery_finished(ev),
        LifecycleEvent::AssemblyStarting(ev) => assembly_starting(ev),
        LifecycleEvent::AssemblyFinished(ev) => assembly_finished(ev),
        LifecycleEvent::TestPassed(ev) => test_passed(ev),
        LifecycleEvent::TestFailed(ev) => {
            failure_block(FailureLabel::Test(&ev.test), &ev.failure, &ev.output)
        }
        LifecycleEvent::TestSkipped(ev) => test_skipped(ev),
        LifecycleEvent::CleanupFailure(ev) => {
            failure_block(FailureLabel::Fixture(&ev.scope.label()), &ev.failure, "")
        }
        LifecycleEvent::DiagnosticMessage(ev) => diagnostic_message(ev),
        LifecycleEvent::ExecutionSummaryReady(ev) => {
            format_summary(&ev.summaries, ev.elapsed_clock_time)
        }
    }
}

/// Hands the lines for each event to a sink.
///
/// Holds nothing but the sink.  Lines reach the sink in the order events are dispatched.
#[derive(Debug)]
pub struct Dispatcher<S> {
    sink: S,
}

impl<S: LogSink> Dispatcher<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Render one event and append its lines to the sink.
    ///
    /// Stops at the first line the sink fails to take.
    pub fn dispatch(&mut self, event: &LifecycleEvent) -> Result<()> {
        let lines = render_event(event);
        log::trace!("Rendered {} lines for {}", lines.len(), event_kind(event));

        for l in lines.iter() {
            self.sink.append(l)?;
        }

        Ok(())
    }

    /// Dispatch events in order, stopping at the first sink error.
    pub fn dispatch_all<'a>(
        &mut self,
        events: impl IntoIterator<Item = &'a LifecycleEvent>,
    ) -> Result<()> {
        for e in events {
            self.dispatch(e)?;
        }

        Ok(())
    }
}

fn event_kind(event: &LifecycleEvent) -> &'static str {
    match event {
        LifecycleEvent::AssemblyDiscoveryStarting(_) => "AssemblyDiscoveryStarting",
        LifecycleEvent::AssemblyDiscoveryFinished(_) => "AssemblyDiscoveryFinished",
        LifecycleEvent::AssemblyStarting(_) => "AssemblyStarting",
        LifecycleEvent::AssemblyFinished(_) => "AssemblyFinished",
        LifecycleEvent::TestPassed(_) => "TestPassed",
        LifecycleEvent::TestFailed(_) => "TestFailed",
        LifecycleEvent::TestSkipped(_) => "TestSkipped",
        LifecycleEvent::CleanupFailure(_) => "CleanupFailure",
        LifecycleEvent::DiagnosticMessage(_) => "DiagnosticMessage",
        LifecycleEvent::ExecutionSummaryReady(_) => "ExecutionSummaryReady",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_line::{Severity, SourceLocation};

    fn texts(lines: &[LogLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    fn discovery_finished_event(diagnostic_messages: bool, to_run: u64) -> LifecycleEvent {
        LifecycleEvent::AssemblyDiscoveryFinished(DiscoveryFinished {
            assembly: "testAssembly".to_string(),
            diagnostic_messages,
            test_cases_discovered: 42,
            test_cases_to_run: to_run,
        })
    }

    #[test]
    fn discovery_finished_diagnostics_only_append() {
        let off = render_event(&discovery_finished_event(false, 42));
        let on = render_event(&discovery_finished_event(true, 42));

        assert_eq!(texts(&off), vec!["Discovered:  testAssembly"]);
        assert_eq!(
            texts(&on),
            vec!["Discovered:  testAssembly (found 42 test cases)"]
        );
        assert!(on[0].text.starts_with(&off[0].text));

        assert_eq!(
            render_event(&discovery_finished_event(true, 1))[0].text,
            "Discovered:  testAssembly (found 1 of 42 test case)"
        );
        assert_eq!(
            render_event(&discovery_finished_event(true, 40))[0].text,
            "Discovered:  testAssembly (found 40 of 42 test cases)"
        );
    }

    #[test]
    fn discovery_starting_lines() {
        let mut ev = DiscoveryStarting {
            assembly: "testAssembly".to_string(),
            diagnostic_messages: false,
            method_display: MethodDisplay::Method,
        };
        assert_eq!(
            render_event(&LifecycleEvent::AssemblyDiscoveryStarting(ev.clone()))[0].text,
            "Discovering: testAssembly"
        );

        ev.diagnostic_messages = true;
        assert_eq!(
            render_event(&LifecycleEvent::AssemblyDiscoveryStarting(ev))[0].text,
            "Discovering: testAssembly (method display = Method)"
        );
    }

    #[test]
    fn assembly_starting_and_finished() {
        let starting = |diagnostic_messages, max_threads| {
            render_event(&LifecycleEvent::AssemblyStarting(AssemblyStarting {
                assembly: "testAssembly".to_string(),
                diagnostic_messages,
                parallelize_test_collections: true,
                max_threads,
            }))
        };

        assert_eq!(texts(&starting(false, Some(8))), vec!["Starting:    testAssembly"]);
        assert_eq!(
            texts(&starting(true, Some(8))),
            vec!["Starting:    testAssembly (parallel test collections = on, max threads = 8)"]
        );
        assert_eq!(
            texts(&starting(true, None)),
            vec!["Starting:    testAssembly (parallel test collections = on, max threads = unlimited)"]
        );

        let finished = |diagnostic_messages, total| {
            render_event(&LifecycleEvent::AssemblyFinished(AssemblyFinished {
                assembly: "testAssembly".to_string(),
                diagnostic_messages,
                test_cases_executed: 1,
                test_cases_total: total,
            }))
        };
        assert_eq!(texts(&finished(false, 3)), vec!["Finished:    testAssembly"]);
        assert_eq!(
            texts(&finished(true, 3)),
            vec!["Finished:    testAssembly (executed 1 of 3 test cases)"]
        );
        assert_eq!(
            texts(&finished(true, 1)),
            vec!["Finished:    testAssembly (executed 1 of 1 test case)"]
        );
    }

    #[test]
    fn skipped() {
        let lines = render_event(&LifecycleEvent::TestSkipped(TestSkipped {
            test: "Skip\nMe".to_string(),
            reason: "Because\tI said so\r\n".to_string(),
        }));

        assert_eq!(
            texts(&lines),
            vec!["    Skip\\nMe [SKIP]", "      Because\\tI said so\\r\\n"]
        );
        assert_eq!(lines[0].severity, Severity::Warning);
        assert_eq!(lines[1].severity, Severity::Info);
        assert!(lines.iter().all(|l| l.location.is_none()));
    }

    #[test]
    fn failures_carry_location_on_every_line() {
        let event = LifecycleEvent::TestFailed(TestFailed {
            test: "MyTests.Adds".to_string(),
            failure: FailureInformation::single(
                "Xunit.EqualException",
                "Assert.Equal() Failure",
                "   at MyTests.Adds() in /src/MyTests.cs:line 18",
            ),
            output: "some output\n".to_string(),
        });

        let lines = render_event(&event);
        assert_eq!(
            texts(&lines),
            vec![
                "    MyTests.Adds [FAIL]",
                "      Xunit.EqualException : Assert.Equal() Failure",
                "      Stack Trace:",
                "        /src/MyTests.cs(18,0): at MyTests.Adds()",
                "      Output:",
                "        some output",
            ]
        );

        let expected = Some(SourceLocation {
            path: "/src/MyTests.cs".to_string(),
            line: 18,
        });
        assert!(lines.iter().all(|l| l.location == expected));
    }

    #[test]
    fn cleanup_failures() {
        let failure = FailureInformation::single("System.Exception", "nope", "   at Nowhere()");
        let event = LifecycleEvent::CleanupFailure(CleanupFailure {
            scope: CleanupScope::Class("MyType".to_string()),
            failure,
        });

        let lines = render_event(&event);
        assert_eq!(
            texts(&lines),
            vec![
                "    [Test Class Cleanup Failure (MyType)] System.Exception",
                "      System.Exception : nope",
                "      Stack Trace:",
                "           at Nowhere()",
            ]
        );
        assert!(lines.iter().all(|l| l.location.is_none()));
    }

    #[test]
    fn passed_tests_are_quiet_by_default() {
        let passed = |diagnostic_messages, output: &str| {
            render_event(&LifecycleEvent::TestPassed(TestPassed {
                test: "Good".to_string(),
                output: output.to_string(),
                diagnostic_messages,
            }))
        };

        assert!(passed(false, "hello").is_empty());
        assert!(passed(true, "").is_empty());
        assert_eq!(
            texts(&passed(true, "hello")),
            vec!["    Good [PASS]", "      Output:", "        hello"]
        );
    }

    #[test]
    fn diagnostic_message_lines() {
        let lines = render_event(&LifecycleEvent::DiagnosticMessage(DiagnosticMessage {
            assembly: Some("asm".to_string()),
            message: "one\r\ntwo".to_string(),
        }));
        assert_eq!(texts(&lines), vec!["   [asm] one", "   [asm] two"]);
        assert!(lines.iter().all(|l| l.severity.is_separator()));

        let lines = render_event(&LifecycleEvent::DiagnosticMessage(DiagnosticMessage {
            assembly: None,
            message: "alone".to_string(),
        }));
        assert_eq!(texts(&lines), vec!["   alone"]);
    }

    #[test]
    fn dispatcher_appends_in_order() {
        let mut dispatcher = Dispatcher::new(Vec::<LogLine>::new());
        dispatcher
            .dispatch_all(&[
                discovery_finished_event(false, 1),
                discovery_finished_event(false, 1),
            ])
            .unwrap();

        let lines = dispatcher.into_sink();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], lines[1]);
    }
}
