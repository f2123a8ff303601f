use anyhow::Context;
use tranche_runner::{load_config, load_default_config, run};

fn print_help() {
    eprintln!(
        r#"Tranche Runner - optimal execution trajectories

USAGE:
    tranche-runner [CONFIG]

ARGS:
    CONFIG      JSON run configuration (embedded default scenario when omitted)

ENVIRONMENT VARIABLES:
    RUST_LOG    Log level filter
"#
    );
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1).as_deref() {
        Some("--help" | "-h") => {
            print_help();
            return Ok(());
        }
        Some(path) => {
            log::info!("Loading configuration from: {}", path);
            load_config(path).with_context(|| format!("loading {path}"))?
        }
        None => {
            log::info!("Using embedded default configuration");
            load_default_config()?
        }
    };

    let report = run(&config)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
