use super::{engine_config, load_config};
use crate::cli::args::ConfigArgs;
use crate::exit_codes;
use techval_core::engine::CommandEngine;

pub fn check(args: ConfigArgs) -> anyhow::Result<i32> {
    let cfg = match load_config(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("✖ {e}");
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    match CommandEngine::bootstrap(&engine_config(&cfg, &args)) {
        Ok(engine) => {
            println!("program:     {}", engine.program().display());
            println!(
                "entry point: {}",
                engine
                    .entry_point()
                    .map_or_else(|| "-".to_string(), ToString::to_string)
            );
            println!("timeout:     {}s", cfg.engine.timeout_secs);
            eprintln!("✔ Engine OK");
            Ok(exit_codes::OK)
        }
        Err(e) => {
            eprintln!("✖ {e}");
            Ok(exit_codes::CONFIG_ERROR)
        }
    }
}
