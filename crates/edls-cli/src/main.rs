//! EDLS - Editor to LSP bridge
//!
//! This binary inspects the language registration the bridge performs and
//! replays scripted editor sessions against canned backend responses.

use anyhow::{Context, Result};
use clap::Parser;

mod args;
mod describe;
mod logging;
mod replay;

use args::{Args, Command};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init(&args.log_level, args.log_json)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting edls");

    let config = if let Some(config_path) = &args.config {
        edls_core::BridgeConfig::load_from(config_path)
            .with_context(|| format!("failed to load config from {}", config_path.display()))?
    } else {
        edls_core::BridgeConfig::load().context("failed to load configuration")?
    };

    tracing::debug!(
        language = %config.language.id,
        rules = config.grammar.rules.len(),
        "configuration loaded"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match args.command {
        Command::Describe { toml } => describe::run(&config, toml, &mut out)?,
        Command::Replay { script } => replay::run_file(&script, config, &mut out)
            .await
            .context("replay failed")?,
    }

    tracing::info!("edls finished");
    Ok(())
}
