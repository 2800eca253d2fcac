//! Engine backed by an external process.
//!
//! Protocol: the process receives the three inputs on its command line and
//! prints a JSON array of criterion records on stdout. Lines printed before the
//! array (JVM/REPL start-up chatter) and text after it are skipped. Stdout is
//! expected to be UTF-8; other bytes are replaced. A non-zero exit is a failure
//! and its stderr is reported verbatim.

use super::{EntryPoint, ValidationEngine};
use crate::config::EngineConfig;
use crate::errors::EngineError;
use crate::model::RawRecord;
use crate::validate::ValidationRequest;
use async_trait::async_trait;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time;

/// Exported to the engine process when an entry point is configured.
pub const ENTRY_POINT_ENV: &str = "TECHVAL_ENTRY_POINT";

const SOURCE_PLACEHOLDER: &str = "{source}";
const BINARY_PLACEHOLDER: &str = "{binary}";
const NEO4J_PLACEHOLDER: &str = "{neo4j_url}";
const ENTRY_POINT_PLACEHOLDER: &str = "{entry_point}";

#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: PathBuf,
    args: Vec<String>,
    entry_point: Option<EntryPoint>,
    timeout_secs: u64,
    working_dir: Option<PathBuf>,
    env: BTreeMap<String, String>,
}

impl CommandEngine {
    /// Resolve the engine once. The returned handle is reused for every call.
    pub fn bootstrap(cfg: &EngineConfig) -> Result<Self, EngineError> {
        let program = resolve_program(&cfg.program)?;

        let entry_point = match cfg.entry_point.as_deref() {
            Some(ep) if !ep.trim().is_empty() => Some(ep.parse::<EntryPoint>()?),
            _ => None,
        };

        if cfg.timeout_secs == 0 {
            return Err(EngineError::bootstrap("timeout must be greater than 0"));
        }

        if let Some(dir) = &cfg.working_dir {
            if !dir.is_dir() {
                return Err(EngineError::bootstrap(format!(
                    "working directory {} does not exist",
                    dir.display()
                )));
            }
        }

        let entry_display = entry_point
            .as_ref()
            .map_or_else(|| "-".to_string(), ToString::to_string);
        tracing::info!(
            program = %program.display(),
            entry_point = %entry_display,
            "validation engine bootstrapped"
        );

        Ok(Self {
            program,
            args: cfg.args.clone(),
            entry_point,
            timeout_secs: cfg.timeout_secs,
            working_dir: cfg.working_dir.clone(),
            env: cfg.env.clone(),
        })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn entry_point(&self) -> Option<&EntryPoint> {
        self.entry_point.as_ref()
    }

    /// Arguments passed to the program for `request`, placeholders substituted.
    pub fn command_line(&self, request: &ValidationRequest) -> Vec<String> {
        let entry_point = self
            .entry_point
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        let vars = [
            (SOURCE_PLACEHOLDER, request.source_location()),
            (BINARY_PLACEHOLDER, request.binary_location()),
            (NEO4J_PLACEHOLDER, request.neo4j_url()),
            (ENTRY_POINT_PLACEHOLDER, entry_point.as_str()),
        ];

        let uses_inputs = self.args.iter().any(|a| {
            a.contains(SOURCE_PLACEHOLDER)
                || a.contains(BINARY_PLACEHOLDER)
                || a.contains(NEO4J_PLACEHOLDER)
        });

        let mut argv: Vec<String> = self.args.iter().map(|a| substitute(a, &vars)).collect();
        if !uses_inputs {
            argv.push(request.source_location().to_string());
            argv.push(request.binary_location().to_string());
            argv.push(request.neo4j_url().to_string());
        }
        argv
    }
}

#[async_trait]
impl ValidationEngine for CommandEngine {
    fn name(&self) -> &str {
        "command"
    }

    async fn validate(&self, request: &ValidationRequest) -> Result<Vec<RawRecord>, EngineError> {
        let argv = self.command_line(request);
        let program = self.program.display().to_string();

        let mut cmd = Command::new(&self.program);
        cmd.args(&argv)
            .envs(&self.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(ep) = &self.entry_point {
            cmd.env(ENTRY_POINT_ENV, ep.to_string());
        }
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        let child = cmd.spawn().map_err(|source| EngineError::Spawn {
            program: program.clone(),
            source,
        })?;

        let started = Instant::now();
        // Dropping the child on timeout kills it.
        let output = match time::timeout(
            Duration::from_secs(self.timeout_secs),
            child.wait_with_output(),
        )
        .await
        {
            Ok(res) => res.map_err(|source| EngineError::Spawn {
                program: program.clone(),
                source,
            })?,
            Err(_) => {
                tracing::warn!(program = %program, timeout_secs = self.timeout_secs, "engine timed out");
                return Err(EngineError::Timeout {
                    secs: self.timeout_secs,
                });
            }
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            tracing::warn!(
                program = %program,
                status = ?output.status.code(),
                elapsed_ms,
                "engine exited unsuccessfully"
            );
            return Err(EngineError::Failed {
                status: output.status.code(),
                stderr,
            });
        }
        if !stderr.trim().is_empty() {
            tracing::debug!(program = %program, stderr = %stderr, "engine stderr");
        }

        let records = parse_output(&output.stdout)?;
        tracing::info!(program = %program, records = records.len(), elapsed_ms, "engine finished");
        Ok(records)
    }
}

fn resolve_program(program: &str) -> Result<PathBuf, EngineError> {
    let program = program.trim();
    if program.is_empty() {
        return Err(EngineError::bootstrap("engine program must not be empty"));
    }
    which::which(program)
        .map_err(|e| EngineError::bootstrap(format!("engine program '{program}' not found: {e}")))
}

/// Single-pass placeholder substitution; substituted values are never re-scanned.
fn substitute(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    'scan: while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        for (key, value) in vars {
            if let Some(after) = tail.strip_prefix(key) {
                out.push_str(value);
                rest = after;
                continue 'scan;
            }
        }
        out.push('{');
        rest = &tail[1..];
    }
    out.push_str(rest);
    out
}

/// Parse engine stdout into records.
///
/// Every line starting with `[` is a candidate for the start of the result
/// array; the first candidate that parses as a JSON array wins. Log lines such
/// as `[main] INFO ...` before the array and any text after it are ignored.
pub fn parse_output(stdout: &[u8]) -> Result<Vec<RawRecord>, EngineError> {
    let text = match std::str::from_utf8(stdout) {
        Ok(text) => Cow::Borrowed(text),
        Err(e) => {
            tracing::warn!(error = %e, "engine stdout is not valid UTF-8, decoding lossily");
            String::from_utf8_lossy(stdout)
        }
    };
    if text.trim().is_empty() {
        return Err(EngineError::protocol("engine produced no output"));
    }

    let mut offset = 0;
    let mut skipped = 0usize;
    let mut last_error = None;
    let mut items = None;
    for line in text.split_inclusive('\n') {
        if line.trim_start().starts_with('[') {
            let mut stream = serde_json::Deserializer::from_str(&text[offset..]).into_iter::<Value>();
            match stream.next() {
                Some(Ok(Value::Array(array))) => {
                    items = Some(array);
                    break;
                }
                Some(Err(e)) => last_error = Some(e.to_string()),
                Some(Ok(_)) | None => {}
            }
        }
        offset += line.len();
        skipped += 1;
    }
    let Some(items) = items else {
        return Err(EngineError::protocol(match last_error {
            Some(e) => format!("invalid JSON: {e}"),
            None => "no JSON array found on stdout".to_string(),
        }));
    };
    if skipped > 0 {
        tracing::debug!(skipped, "skipped non-JSON lines before engine output");
    }

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(map) => Ok(map),
            _ => Err(EngineError::protocol(format!(
                "element {i} is not a JSON object"
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ValidationRequest {
        ValidationRequest::new("/src/ext", "/build/ext.amp", "http://localhost:7474/db/data/")
            .unwrap()
    }

    fn engine(args: &[&str], entry_point: Option<&str>) -> CommandEngine {
        CommandEngine {
            program: PathBuf::from("/usr/bin/engine"),
            args: args.iter().map(ToString::to_string).collect(),
            entry_point: entry_point.map(|ep| ep.parse().unwrap()),
            timeout_secs: 10,
            working_dir: None,
            env: BTreeMap::new(),
        }
    }

    #[test]
    fn inputs_are_appended_without_placeholders() {
        let e = engine(&["-M", "-m", "techval.main"], None);
        assert_eq!(
            e.command_line(&request()),
            vec![
                "-M",
                "-m",
                "techval.main",
                "/src/ext",
                "/build/ext.amp",
                "http://localhost:7474/db/data/"
            ]
        );
    }

    #[test]
    fn placeholders_are_substituted_in_place() {
        let e = engine(
            &["--fn", "{entry_point}", "-s", "{source}", "-b={binary}", "-n", "{neo4j_url}"],
            Some("atv.core/validate-java"),
        );
        assert_eq!(
            e.command_line(&request()),
            vec![
                "--fn",
                "atv.core/validate-java",
                "-s",
                "/src/ext",
                "-b=/build/ext.amp",
                "-n",
                "http://localhost:7474/db/data/"
            ]
        );
    }

    #[test]
    fn entry_point_placeholder_alone_still_appends_inputs() {
        let e = engine(&["{entry_point}"], None);
        let argv = e.command_line(&request());
        assert_eq!(argv.len(), 4);
        assert_eq!(argv[0], "");
    }

    #[test]
    fn substitution_does_not_rescan_values() {
        let vars = [("{source}", "{binary}"), ("{binary}", "X")];
        assert_eq!(substitute("{source}/{binary}", &vars), "{binary}/X");
        assert_eq!(substitute("{unknown} {", &vars), "{unknown} {");
    }

    #[test]
    fn parse_output_accepts_array_after_chatter() {
        let out = b"Loading engine...\nWARNING: reflection\n[{\"criteriaId\":\"API01\",\"checked\":false}]\n";
        let records = parse_output(out).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["criteriaId"], "API01");
    }

    #[test]
    fn parse_output_rejects_protocol_violations() {
        let cases: [&[u8]; 6] = [
            b"",
            b"   \n",
            b"no json here\n",
            b"[1, 2]",
            b"[{\"criteriaId\": \"A\"",
            b"{\"criteriaId\":\"A\"}",
        ];
        for bad in cases {
            let err = parse_output(bad).unwrap_err();
            assert!(matches!(err, EngineError::Protocol { .. }), "{err:?}");
        }
    }

    #[test]
    fn parse_output_skips_bracketed_log_lines() {
        let out = b"[main] INFO  org.neo4j.kernel - Starting\n[2026-10-17 09:00:01] loading rules\n[{\"criteriaId\":\"API01\",\"checked\":true,\"passes\":true}]\n";
        let records = parse_output(out).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["passes"], true);
    }

    #[test]
    fn parse_output_ignores_text_after_the_array() {
        let out = b"[\n  {\"criteriaId\":\"API01\",\"checked\":false}\n]\nShutting down Neo4j\n[main] INFO done\n";
        let records = parse_output(out).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["criteriaId"], "API01");
    }

    #[test]
    fn parse_output_decodes_non_utf8_lossily() {
        let out = b"[{\"criteriaId\":\"API01\",\"checked\":true,\"message\":\"caf\xe9\"}]";
        let records = parse_output(out).unwrap();
        assert_eq!(records[0]["message"], "caf\u{fffd}");
    }

    #[test]
    fn empty_array_is_valid() {
        assert!(parse_output(b"[]").unwrap().is_empty());
    }

    #[test]
    fn bootstrap_rejects_unknown_program() {
        let cfg = EngineConfig {
            program: "definitely-not-a-real-techval-engine-binary".to_string(),
            ..EngineConfig::default()
        };
        let err = CommandEngine::bootstrap(&cfg).unwrap_err();
        assert!(matches!(err, EngineError::Bootstrap { .. }));
    }
}
