mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use inventra_core::Hub;

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("error: {err}");
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let runtime_config = build_runtime_config(&cli.global)?;

    let hub = Hub::new(runtime_config)?;
    hub.start().await;

    tracing::debug!(command = ?cli.command, "dispatching command");
    let result = commands::dispatch(cli.command, &hub, &cli.global).await;

    hub.shutdown().await;
    result
}

/// Build a `RuntimeConfig` from the config file, profile, and CLI overrides.
fn build_runtime_config(
    global: &cli::GlobalOpts,
) -> Result<inventra_core::RuntimeConfig, CliError> {
    let cfg = inventra_config::load_config_or_default();
    let (profile_name, mut profile) = cfg.select_profile(global.profile.as_deref())?;

    // CLI flags override the profile.
    if let Some(ref server) = global.server {
        profile.server = Some(server.clone());
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    if let Some(ref data_dir) = global.data_dir {
        profile.data_dir = Some(data_dir.clone());
    }

    let mut runtime =
        inventra_config::profile_to_runtime_config(&profile, &profile_name, &cfg.defaults)?;

    // One request-response cycle per process: background polling would
    // never get a chance to tick.
    runtime.polling_interval = None;

    Ok(runtime)
}
