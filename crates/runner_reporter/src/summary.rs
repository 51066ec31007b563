//! The end-of-run summary table.
//!
//! Output looks like this (note that the first line is blank):
//!
//! ```text
//!
//! === TEST EXECUTION SUMMARY ===
//!    assembly1    Total: 2112, Errors:  6, Failed: 42, Skipped:  8, Time: 1.235s
//!    assembly2    Total: 2112, Errors:  6, Failed: 42, Skipped:  8, Time: 3.457s
//!    assembly999  Total:    0
//!                        ----          --          --           --        ------
//!           GRAND TOTAL: 4224          12          84           16        4.691s (12.346s)
//! ```
//!
//! Every column is as wide as its widest value, so all widths are measured before anything is printed.  Assemblies
//! which ran nothing only get their total.  The dashes and grand total only show up when there is more than one
//! assembly.
//!
//! Times are [Decimal] seconds, so `x.xxx5` rounds the same way no matter how it would have been stored as a float.
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::failure::escape;
use crate::log_line::LogLine;

const HEADER: &str = "=== TEST EXECUTION SUMMARY ===";
const GRAND_TOTAL: &str = "GRAND TOTAL:";

/// How far `GRAND TOTAL:` reaches past the end of the label column.
const GRAND_TOTAL_OVERHANG: usize = 8;

/// Counters for one assembly.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    pub total: u64,
    pub errors: u64,
    pub failed: u64,
    pub skipped: u64,

    /// Seconds spent running this assembly.
    pub time: Decimal,
}

impl ExecutionSummary {
    /// Add another summary into this one, field by field.  Saturates rather than overflowing.
    pub fn accumulate(&mut self, other: &ExecutionSummary) {
        self.total = self.total.saturating_add(other.total);
        self.errors = self.errors.saturating_add(other.errors);
        self.failed = self.failed.saturating_add(other.failed);
        self.skipped = self.skipped.saturating_add(other.skipped);
        self.time = self.time.saturating_add(other.time);
    }
}

/// Format seconds with exactly three decimals and an `s` suffix.
///
/// Rounds half away from zero at the millisecond, so `1.2345` is `1.235s`.  Negative times are clamped to 0.
pub fn format_seconds(seconds: Decimal) -> String {
    let mut rounded = seconds
        .max(Decimal::ZERO)
        .round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(3);
    format!("{rounded}s")
}

/// One row, with everything already formatted to text.
struct Cells {
    label: String,
    total: String,
    errors: String,
    failed: String,
    skipped: String,
    time: String,
}

impl Cells {
    fn new(label: &str, summary: &ExecutionSummary) -> Self {
        Self {
            label: escape(label),
            total: summary.total.to_string(),
            errors: summary.errors.to_string(),
            failed: summary.failed.to_string(),
            skipped: summary.skipped.to_string(),
            time: format_seconds(summary.time),
        }
    }
}

/// Widths in characters of each column.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
struct ColumnWidths {
    label: usize,
    total: usize,
    errors: usize,
    failed: usize,
    skipped: usize,
    time: usize,
}

impl ColumnWidths {
    /// Measure the assembly rows and, if it will be printed, the grand total row.
    ///
    /// The grand total label is right-aligned over the label column and the `  Total:` that follows it, so it only
    /// counts toward the label column when the assembly labels are too short to hold it.
    fn measure(rows: &[Cells], grand_total: Option<&Cells>) -> Self {
        let mut widths = ColumnWidths::default();

        for r in rows {
            widths.label = widths.label.max(r.label.chars().count());
        }

        if grand_total.is_some() {
            widths.label = widths.label.max(GRAND_TOTAL.len() - GRAND_TOTAL_OVERHANG);
        }

        for r in rows.iter().chain(grand_total) {
            widths.total = widths.total.max(r.total.len());
            widths.errors = widths.errors.max(r.errors.len());
            widths.failed = widths.failed.max(r.failed.len());
            widths.skipped = widths.skipped.max(r.skipped.len());
            widths.time = widths.time.max(r.time.len());
        }

        widths
    }
}

fn format_row(row: &Cells, collapse: bool, w: &ColumnWidths) -> String {
    if collapse {
        return format!(
            "   {:<lw$}  Total: {:>tw$}",
            row.label,
            0,
            lw = w.label,
            tw = w.total
        );
    }

    format!(
        "   {:<lw$}  Total: {:>tw$}, Errors: {:>ew$}, Failed: {:>fw$}, Skipped: {:>sw$}, Time: {:>mw$}",
        row.label,
        row.total,
        row.errors,
        row.failed,
        row.skipped,
        row.time,
        lw = w.label,
        tw = w.total,
        ew = w.errors,
        fw = w.failed,
        sw = w.skipped,
        mw = w.time
    )
}

// The gaps between columns in the last two rows are the widths of the `, Errors: ` and similar prefixes of the
// assembly rows, so that everything lines up under the values.

fn format_separator(w: &ColumnWidths) -> String {
    format!(
        "   {:lw$}         {}          {}          {}           {}        {}",
        "",
        "-".repeat(w.total),
        "-".repeat(w.errors),
        "-".repeat(w.failed),
        "-".repeat(w.skipped),
        "-".repeat(w.time),
        lw = w.label
    )
}

fn format_grand_total(row: &Cells, elapsed: Decimal, w: &ColumnWidths) -> String {
    format!(
        "   {:>gw$} {:>tw$}          {:>ew$}          {:>fw$}           {:>sw$}        {:>mw$} ({})",
        GRAND_TOTAL,
        row.total,
        row.errors,
        row.failed,
        row.skipped,
        row.time,
        format_seconds(elapsed),
        gw = w.label + GRAND_TOTAL_OVERHANG,
        tw = w.total,
        ew = w.errors,
        fw = w.failed,
        sw = w.skipped,
        mw = w.time
    )
}

/// Render the summary table for `(label, summary)` pairs, in order.
///
/// `elapsed_clock_time` is wall-clock seconds for the whole run and only appears in the grand total.
pub fn format_summary(
    summaries: &[(String, ExecutionSummary)],
    elapsed_clock_time: Decimal,
) -> Vec<LogLine> {
    let mut lines = vec![LogLine::info(""), LogLine::info(HEADER)];

    if summaries.is_empty() {
        return lines;
    }

    let mut totals = ExecutionSummary::default();
    for (_, s) in summaries {
        totals.accumulate(s);
    }

    let rows = summaries
        .iter()
        .map(|(label, s)| Cells::new(label, s))
        .collect::<Vec<_>>();
    let grand_total = Cells::new(GRAND_TOTAL, &totals);
    let show_grand_total = summaries.len() > 1;
    let widths = ColumnWidths::measure(&rows, show_grand_total.then_some(&grand_total));

    for (row, (_, s)) in rows.iter().zip(summaries.iter()) {
        lines.push(LogLine::info(format_row(row, s.total == 0, &widths)));
    }

    if show_grand_total {
        lines.push(LogLine::info(format_separator(&widths)));
        lines.push(LogLine::info(format_grand_total(
            &grand_total,
            elapsed_clock_time,
            &widths,
        )));
    }

    lines
}
