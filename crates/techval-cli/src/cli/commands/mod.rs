use super::args::*;
use crate::exit_codes;
use std::path::PathBuf;
use techval_core::config::{self, EngineConfig, TechvalConfig, DEFAULT_CONFIG_FILE};
use techval_core::errors::ConfigError;

pub mod engine;
pub mod validate;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Validate(args) => validate::run(args).await,
        Command::Engine(args) => match args.cmd {
            EngineCmd::Check(config_args) => engine::check(config_args),
        },
        Command::Version => {
            println!("techval {}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}

/// Load the config named by `--config`, or the optional default file.
pub(crate) fn load_config(args: &ConfigArgs) -> Result<TechvalConfig, ConfigError> {
    match &args.config {
        Some(path) => config::load_config(path, true),
        None => config::load_config(&PathBuf::from(DEFAULT_CONFIG_FILE), false),
    }
}

pub(crate) fn engine_config(cfg: &TechvalConfig, args: &ConfigArgs) -> EngineConfig {
    let mut engine = cfg.engine.clone();
    if let Some(program) = &args.engine_program {
        engine.program = program.clone();
    }
    engine
}
