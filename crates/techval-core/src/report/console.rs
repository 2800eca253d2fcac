use crate::model::{CriterionResult, Verdict};
use crate::report::Summary;
use crate::validate::ValidationReport;

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleOptions {
    /// Omit evidence messages; they can run to thousands of lines.
    pub quiet_messages: bool,
}

fn verdict_icon(v: Verdict) -> &'static str {
    match v {
        Verdict::Pass => "✔",
        Verdict::Fail => "✖",
        Verdict::Manual => "?",
        Verdict::NotChecked => "-",
    }
}

fn verdict_label(v: Verdict) -> &'static str {
    match v {
        Verdict::Pass => "pass",
        Verdict::Fail => "FAIL",
        Verdict::Manual => "manual review",
        Verdict::NotChecked => "not checked",
    }
}

#[must_use]
pub fn format_result_line(r: &CriterionResult) -> String {
    let v = r.verdict();
    format!("{} {:<8} {}", verdict_icon(v), r.criteria_id, verdict_label(v))
}

#[must_use]
pub fn format_summary_line(s: &Summary) -> String {
    format!(
        "{} criteri{}: {} passed, {} failed, {} manual review, {} not checked",
        s.total,
        if s.total == 1 { "on" } else { "a" },
        s.passed,
        s.failed,
        s.manual,
        s.not_checked
    )
}

/// Human-readable report. Multi-line messages are indented under their criterion.
#[must_use]
pub fn render(report: &ValidationReport, opts: ConsoleOptions) -> String {
    let mut out = String::new();
    let s = &report.summary;

    if s.failed > 0 {
        out.push_str(&format!(
            "✖ Validation failed ({} failed criteri{})\n",
            s.failed,
            if s.failed == 1 { "on" } else { "a" }
        ));
    } else if s.manual > 0 {
        out.push_str(&format!(
            "⚠️  Validation passed, {} criteri{} need{} manual review\n",
            s.manual,
            if s.manual == 1 { "on" } else { "a" },
            if s.manual == 1 { "s" } else { "" }
        ));
    } else {
        out.push_str("✔ Validation OK\n");
    }
    out.push_str(&format!(
        "  source: {}\n  binary: {}\n  neo4j:  {}\n\n",
        report.request.source_location(),
        report.request.binary_location(),
        report.request.neo4j_url()
    ));

    for r in &report.results {
        out.push_str(&format_result_line(r));
        out.push('\n');
        if opts.quiet_messages {
            continue;
        }
        if let Some(msg) = r.outcome.message() {
            for line in msg.lines() {
                out.push_str("    ");
                out.push_str(line);
                out.push('\n');
            }
        }
    }

    out.push('\n');
    out.push_str(&format_summary_line(s));
    out.push_str(&format!(
        " ({} ms, engine: {})\n",
        report.duration_ms, report.engine
    ));
    out
}
