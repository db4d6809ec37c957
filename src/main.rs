//! # pycoterm Main Entry Point

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, bail, Result};
use pycoterm::cmd_args::{AppCommand, CommandLineArgs};
use pycoterm::config::{AppConfig, LOG_LEVEL_ENV_VAR};
use pycoterm::repl::services::{EngineInstaller, ProcessEngine};
use pycoterm::{subcommands, AppController};
use tracing_subscriber::{fmt::time::ChronoLocal, EnvFilter};

const LOG_FILE: &str = "pycoterm.log";

#[tokio::main]
async fn main() -> Result<()> {
    let cmd_args = CommandLineArgs::parse();
    let config = AppConfig::load(cmd_args.config())?;

    match cmd_args.command() {
        None => {
            init_tracing_to_file(&config.engine.install_dir)?;
            run_terminal(&config).await
        }
        Some(AppCommand::Setup) => {
            init_tracing_subscriber(io::stderr)?;
            subcommands::setup(&config, &mut io::stdout()).await
        }
        Some(AppCommand::Cache { action }) => {
            init_tracing_subscriber(io::stderr)?;
            subcommands::cache(action, &config, &mut io::stdout()).await
        }
    }
}

async fn run_terminal(config: &AppConfig) -> Result<()> {
    if !atty::is(atty::Stream::Stdout) || !atty::is(atty::Stream::Stdin) {
        bail!("pycoterm needs an interactive terminal; use `pycoterm setup` or `pycoterm cache` in scripts");
    }

    let engine = ProcessEngine::new(config.engine.engine_command());
    tracing::info!("Engine command: {:?}", engine.command());
    let installer = EngineInstaller::new(&config.engine.download_url, &config.engine.install_dir)?;

    let mut app = AppController::new(Box::new(engine), installer)?;
    app.run().await
}

fn env_filter() -> Result<EnvFilter> {
    let mut filter = EnvFilter::from_env(LOG_LEVEL_ENV_VAR);
    for directive in [
        "reqwest=warn",
        "hyper=warn",
        "hyper_util=warn",
        "tokio=warn",
        "tracing=warn",
        "tracing_subscriber=warn",
        "rustls=warn",
        "tokio_rustls=warn",
    ] {
        filter = filter.add_directive(directive.parse()?);
    }
    Ok(filter)
}

fn init_tracing_subscriber<W>(writer: W) -> Result<()>
where
    W: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(env_filter()?)
        .with_writer(writer)
        .with_timer(ChronoLocal::rfc_3339())
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {e}"))
}

/// The terminal owns stdout and stderr while running, so logs go to a file
/// next to the engine
fn init_tracing_to_file(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter()?)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_timer(ChronoLocal::rfc_3339())
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {e}"))
}
