use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "techval",
    version,
    about = "Technical validation of extensions against the criteria catalogue"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate an extension's source and binaries
    Validate(ValidateArgs),
    /// Inspect the configured validation engine
    Engine(EngineArgs),
    Version,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Sarif,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Config file (default: techval.yaml, optional when absent)
    #[arg(long, env = "TECHVAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override engine.program from the config
    #[arg(long, env = "TECHVAL_ENGINE_PROGRAM")]
    pub engine_program: Option<String>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Path to the extension source code
    #[arg(long, short = 's', env = "TECHVAL_SOURCE")]
    pub source: Option<String>,

    /// Path to the built binaries (e.g. AMP files)
    #[arg(long, short = 'b', env = "TECHVAL_BINARY")]
    pub binary: Option<String>,

    /// URL of an empty Neo4j instance for the engine (falls back to neo4j_url in the config)
    #[arg(long, short = 'n', env = "TECHVAL_NEO4J_URL")]
    pub neo4j_url: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write the report to this file instead of the terminal
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Do not print evidence messages in text output
    #[arg(long)]
    pub quiet_messages: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct EngineArgs {
    #[command(subcommand)]
    pub cmd: EngineCmd,
}

#[derive(Subcommand, Debug, Clone)]
pub enum EngineCmd {
    /// Bootstrap the engine without running a validation
    Check(ConfigArgs),
}
