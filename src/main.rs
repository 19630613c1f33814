//! NL2SQL bridge command-line entry point.

use anyhow::Context;
use nl2sql_bridge::app::App;
use nl2sql_bridge::cli::Cli;
use nl2sql_bridge::config::Config;
use nl2sql_bridge::logging::{self, LogTarget};
use nl2sql_bridge::{Nl2SqlService, SessionManager};
use tokio::io::BufReader;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();

    if let Some(path) = logging::init(LogTarget::from_flag(cli.log_file)) {
        info!("Logging to {}", path.display());
    }

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{e:#}");
            std::process::exit(1);
        }
    }
}

/// Runs the selected mode. Returns `Ok(false)` when a one-shot query failed.
async fn run(cli: Cli) -> anyhow::Result<bool> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;

    // Precedence for the engine: CLI flags, then environment, then config file
    config.engine.apply_env_overrides();
    cli.apply_engine_overrides(&mut config.engine);
    info!(
        executable = %config.engine.path.display(),
        timeout_secs = config.engine.timeout_secs,
        "Engine configured"
    );

    let session = SessionManager::new(config.engine.path.clone(), config.engine.timeout());
    let service = Nl2SqlService::new(session);
    let cli_settings = cli.to_connection_settings()?;
    let app = App::new(
        service,
        config,
        cli_settings,
        cli.connection_name().map(str::to_string),
    );

    if cli.status {
        let report = app.service().status();
        println!("{}", serde_json::to_string(&report)?);
        return Ok(true);
    }

    if let Some(query) = &cli.query {
        let outcome = app.run_once(query).await;
        println!("{}", serde_json::to_string(&outcome)?);
        return Ok(outcome.success);
    }

    info!("Starting interactive session");
    app.run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
        .context("Session I/O failed")?;

    Ok(true)
}
