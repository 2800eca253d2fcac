use super::{engine_config, load_config};
use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::exit_codes;
use serde_json::json;
use std::sync::Arc;
use techval_core::engine::CommandEngine;
use techval_core::report::console::{self, ConsoleOptions};
use techval_core::report::{json as json_report, sarif, TOOL_NAME};
use techval_core::{ErrorKind, TechnicalValidator, ValidationReport, ValidationRequest};

pub async fn run(args: ValidateArgs) -> anyhow::Result<i32> {
    // 1. Config
    let cfg = match load_config(&args.config) {
        Ok(c) => c,
        Err(e) => {
            print_error(&args, ErrorKind::Config, &e.to_string())?;
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    // 2. Inputs: flag/env first, then config
    let neo4j_url = args.neo4j_url.clone().or_else(|| cfg.neo4j_url.clone());
    let request =
        match ValidationRequest::from_optional(args.source.clone(), args.binary.clone(), neo4j_url)
        {
            Ok(r) => r,
            Err(e) => {
                print_error(&args, e.kind(), &e.to_string())?;
                return Ok(exit_codes::CONFIG_ERROR);
            }
        };

    // 3. Engine bootstrap (once)
    let engine = match CommandEngine::bootstrap(&engine_config(&cfg, &args.config)) {
        Ok(e) => e,
        Err(e) => {
            print_error(&args, e.kind(), &e.to_string())?;
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    // 4. Validate
    let validator = TechnicalValidator::new(Arc::new(engine));
    let report = match validator.run(&request).await {
        Ok(r) => r,
        Err(e) => {
            print_error(&args, e.kind(), &e.to_string())?;
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    let exit_code = decide_validate_exit(&report);
    print_report(&report, &args, exit_code)?;
    Ok(exit_code)
}

fn decide_validate_exit(report: &ValidationReport) -> i32 {
    if report.summary.gate_passed() {
        exit_codes::OK
    } else {
        exit_codes::GATE_FAILED
    }
}

fn emit(args: &ValidateArgs, body: &str, to_stderr: bool) -> anyhow::Result<()> {
    if let Some(path) = &args.output {
        std::fs::write(path, body)
            .map_err(|e| anyhow::anyhow!("failed to write {}: {}", path.display(), e))?;
        eprintln!("Report written to {}", path.display());
    } else if to_stderr {
        eprint!("{}", body);
    } else {
        println!("{}", body);
    }
    Ok(())
}

fn print_report(report: &ValidationReport, args: &ValidateArgs, exit_code: i32) -> anyhow::Result<()> {
    match args.format {
        OutputFormat::Sarif => {
            let doc = sarif::build_sarif(report, exit_code);
            emit(args, &serde_json::to_string_pretty(&doc)?, false)
        }
        OutputFormat::Json => match &args.output {
            Some(path) => {
                json_report::write_json(report, exit_code, path)?;
                eprintln!("Report written to {}", path.display());
                Ok(())
            }
            None => {
                let doc = json_report::build_json(report, exit_code);
                emit(args, &serde_json::to_string_pretty(&doc)?, false)
            }
        },
        OutputFormat::Text => {
            // Text format goes to stderr (human-readable), like the logs
            let text = console::render(
                report,
                ConsoleOptions {
                    quiet_messages: args.quiet_messages,
                },
            );
            emit(args, &text, true)
        }
    }
}

fn print_error(args: &ValidateArgs, kind: ErrorKind, message: &str) -> anyhow::Result<()> {
    eprintln!("✖ {}", message);
    if args.format != OutputFormat::Json {
        return Ok(());
    }
    let doc = json!({
        "schema_version": json_report::JSON_SCHEMA_VERSION,
        "ok": false,
        "exit_code": exit_codes::CONFIG_ERROR,
        "tool": {
            "name": TOOL_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        },
        "error": {
            "kind": kind.as_str(),
            "message": message,
        }
    });
    emit(args, &serde_json::to_string_pretty(&doc)?, false)
}
