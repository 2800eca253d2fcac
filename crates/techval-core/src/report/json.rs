use crate::report::TOOL_NAME;
use crate::validate::ValidationReport;
use std::path::Path;

pub const JSON_SCHEMA_VERSION: u32 = 1;

/// Machine-readable report. `results` keep the engine wire shape (camelCase,
/// absent optionals omitted) so consumers written against the engine keep working.
pub fn build_json(report: &ValidationReport, exit_code: i32) -> serde_json::Value {
    let verdicts: Vec<serde_json::Value> = report
        .results
        .iter()
        .map(|r| {
            serde_json::json!({
                "criteriaId": r.criteria_id,
                "verdict": r.verdict().as_str(),
            })
        })
        .collect();

    serde_json::json!({
        "schema_version": JSON_SCHEMA_VERSION,
        "ok": report.summary.gate_passed(),
        "exit_code": exit_code,
        "tool": {
            "name": TOOL_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        },
        "engine": report.engine,
        "request": report.request,
        "results": report.results,
        "verdicts": verdicts,
        "summary": report.summary,
        "duration_ms": report.duration_ms,
    })
}

pub fn write_json(report: &ValidationReport, exit_code: i32, out: &Path) -> anyhow::Result<()> {
    let v = build_json(report, exit_code);
    std::fs::write(out, serde_json::to_string_pretty(&v)?)
        .map_err(|e| anyhow::anyhow!("failed to write {}: {}", out.display(), e))?;
    Ok(())
}
