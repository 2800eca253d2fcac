use crate::model::Verdict;
use crate::report::TOOL_NAME;
use crate::validate::ValidationReport;
use std::collections::BTreeSet;
use std::path::Path;

pub const SARIF_SCHEMA: &str =
    "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/main/sarif-2.1/schema/sarif-schema-2.1.0.json";

/// SARIF 2.1.0 view of a validation.
///
/// Failed criteria map to `error`, criteria needing manual review to `note`.
/// Passing and unchecked criteria produce no result but are still listed in
/// `tool.driver.rules`. The source location is the artifact every result
/// points at, since the engine does not report finer-grained locations.
pub fn build_sarif(report: &ValidationReport, exit_code: i32) -> serde_json::Value {
    let mut seen = BTreeSet::new();
    let rules: Vec<serde_json::Value> = report
        .results
        .iter()
        .filter(|r| seen.insert(&r.criteria_id))
        .map(|r| serde_json::json!({ "id": r.criteria_id }))
        .collect();
    let uri = artifact_uri(report.request.source_location());

    let results: Vec<serde_json::Value> = report
        .results
        .iter()
        .filter_map(|r| {
            let level = match r.verdict() {
                Verdict::Fail => "error",
                Verdict::Manual => "note",
                Verdict::Pass | Verdict::NotChecked => return None,
            };
            let text = match r.outcome.message() {
                Some(msg) => format!("{}: {}", r.criteria_id, msg),
                None => format!("{}: {}", r.criteria_id, r.verdict().as_str()),
            };
            Some(serde_json::json!({
                "ruleId": r.criteria_id,
                "level": level,
                "message": { "text": text },
                "locations": [{
                    "physicalLocation": {
                        "artifactLocation": { "uri": uri }
                    }
                }]
            }))
        })
        .collect();

    serde_json::json!({
      "version": "2.1.0",
      "$schema": SARIF_SCHEMA,
      "runs": [{
        "tool": {
          "driver": {
            "name": TOOL_NAME,
            "version": env!("CARGO_PKG_VERSION"),
            "rules": rules
          }
        },
        "invocations": [{
          "executionSuccessful": true,
          "exitCode": exit_code
        }],
        "results": results
      }]
    })
}

/// Absolute paths become `file://` URIs, relative paths stay relative
/// references, and locations that already carry a scheme are kept.
fn artifact_uri(location: &str) -> String {
    if location.contains("://") {
        return location.to_string();
    }
    let slashed = location.replace('\\', "/").replace(' ', "%20");
    if slashed.starts_with('/') {
        format!("file://{slashed}")
    } else if Path::new(location).is_absolute() {
        format!("file:///{slashed}")
    } else {
        slashed
    }
}
