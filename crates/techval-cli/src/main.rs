use clap::Parser;
use techval_core::ErrorKind;
use tracing_subscriber::EnvFilter;

mod cli;
pub mod exit_codes;

use cli::args::Cli;
use cli::commands::dispatch;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    // Logs go to stderr; stdout is reserved for JSON/SARIF reports.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let code = match dispatch(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("fatal: [{}] {e:?}", ErrorKind::of(&e).as_str());
            exit_codes::CONFIG_ERROR
        }
    };
    std::process::exit(code);
}
