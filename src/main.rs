use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use logscrub::cli::{self, Cli, Commands};
use logscrub::config::Config;
use logscrub::logging;
use logscrub::redact::SecretStore;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("logscrub: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = Config::resolve(cli.config.as_deref()).context("loading config")?;
    cli.apply_to(&mut config);

    // Logging starts with an empty store; secrets added below are picked up
    // by the writer on its next write.
    let store = Arc::new(SecretStore::empty());
    let log = logging::init(&config.log, store.clone())?;

    let result = dispatch(&cli.command, &config, &store);
    log.close().context("flushing diagnostics")?;
    result
}

fn dispatch(
    command: &Commands,
    config: &Config,
    store: &Arc<SecretStore>,
) -> anyhow::Result<ExitCode> {
    store.add(config.secrets.collect()?);
    tracing::info!(count = store.len(), "secrets loaded");

    match command {
        Commands::Scrub {
            input,
            output,
            chunk_size,
            ..
        } => {
            cli::scrub::run(
                input.as_deref(),
                output.as_deref(),
                *chunk_size as usize,
                store.clone(),
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Scan { paths, .. } => {
            let findings = cli::scan::run(paths, store.as_ref())?;
            Ok(if findings.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }
    }
}
